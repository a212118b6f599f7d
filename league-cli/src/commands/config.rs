use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::settings::{self, Config, Resolved};

fn show_value<T: std::fmt::Display>(name: &str, resolved: &Resolved<T>) {
    log::info!(
        "  {} {} {}",
        format!("{}:", name).if_supports_color(Stdout, |t| t.cyan()),
        resolved.value,
        format!("({})", resolved.source).if_supports_color(Stdout, |t| t.dimmed()),
    );
}

/// Show effective settings and where each came from.
pub(crate) fn run_config_show(config: &Config, path: &Path) {
    log::info!(
        "{}",
        "league-admin Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    show_value(
        "database.path",
        &Resolved {
            value: config.db_path.value.display(),
            source: config.db_path.source,
        },
    );
    show_value("operator", &config.operator);
    show_value(
        "import.upload_dir",
        &Resolved {
            value: config.upload_dir.value.display(),
            source: config.upload_dir.source,
        },
    );
    show_value("import.max_upload_bytes", &config.max_upload_bytes);
    show_value("import.delimiter", &config.delimiter);
    show_value("import.session_max_age_hours", &config.session_max_age_hours);

    if let Some(contents) = settings::load_settings_string(path) {
        log::debug!("Settings file contents:\n{contents}");
    }
}

pub(crate) fn run_config_path(path: &Path) {
    // Raw print: scripts capture this.
    println!("{}", path.display());
}

/// Set one key in the settings file.
pub(crate) fn run_config_set(path: &Path, key: &str, value: &str) -> Result<(), CliError> {
    settings::set_value(path, key, value)?;
    log::info!(
        "  {} {} = {} ({})",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        key.if_supports_color(Stdout, |t| t.cyan()),
        value.trim(),
        path.display(),
    );
    Ok(())
}
