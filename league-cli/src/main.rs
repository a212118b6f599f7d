//! league-admin CLI
//!
//! Command-line interface for importing league spreadsheets into the
//! scheduling database.

mod cli_types;
mod commands;
mod error;
mod logging;
mod progress;
mod settings;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction, ExportAction, ImportAction, RecordsAction};
pub(crate) use error::CliError;
use settings::{Config, Settings};

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{e}");
        if let CliError::Workflow(w) = &e {
            commands::import::log_recovery_hint(w);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings_path = settings::settings_path();
    let settings = Settings::load(&settings_path)?;
    let config = Config::resolve(&settings, cli.db, cli.operator, |var| {
        std::env::var(var).ok()
    });
    log::debug!(
        "Using database {} ({}) as operator '{}'",
        config.db_path.value.display(),
        config.db_path.source,
        config.operator.value
    );

    match cli.command {
        Commands::Import { action } => match action {
            ImportAction::Upload {
                kind,
                file,
                delimiter,
            } => commands::import::run_upload(&config, kind, &file, delimiter),
            ImportAction::Map {
                session,
                set,
                unset,
                accept,
            } => commands::import::run_map(&config, &session, &set, unset, accept),
            ImportAction::Preview { session, all } => {
                commands::import::run_preview(&config, &session, all)
            }
            ImportAction::Commit { session, confirm } => {
                commands::import::run_commit(&config, &session, confirm, cli.quiet, cli.verbose)
            }
            ImportAction::Cancel { session } => commands::import::run_cancel(&config, &session),
            ImportAction::Sessions => commands::import::run_sessions(&config),
            ImportAction::Purge { hours } => commands::import::run_purge(&config, hours),
            ImportAction::Fields { kind } => {
                commands::import::run_fields(kind);
                Ok(())
            }
        },
        Commands::Records { action } => match action {
            RecordsAction::List { table, limit } => {
                commands::records::run_list(&config, table, limit)
            }
            RecordsAction::AddDivision { name } => {
                commands::records::run_add_division(&config, &name)
            }
            RecordsAction::Stats => commands::records::run_stats(&config),
        },
        Commands::Export { action } => match action {
            ExportAction::Dataset { start, end, out } => {
                commands::export::run_dataset(&config, start, end, out.as_deref())
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                commands::config::run_config_show(&config, &settings_path);
                Ok(())
            }
            ConfigAction::Path => {
                commands::config::run_config_path(&settings_path);
                Ok(())
            }
            ConfigAction::Set { key, value } => {
                commands::config::run_config_set(&settings_path, &key, &value)
            }
        },
    }
}
