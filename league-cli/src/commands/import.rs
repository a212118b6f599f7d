use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use league_core::{Delimiter, ImportKind};
use league_db::Connection;
use league_import::{
    Classification, CommitProgress, ImportSession, ImportWorkflow, LogProgress, MappingEdit,
    PreviewRow, RowStatus, SqliteSessionStore, Stage, WorkflowError, field_specs, summarize,
};

use crate::CliError;
use crate::progress::CommitBar;
use crate::settings::Config;

use super::{open_db, truncate_str};

fn workflow<'c>(conn: &'c Connection, config: &Config) -> ImportWorkflow<'c, SqliteSessionStore<'c>> {
    ImportWorkflow::new(conn, SqliteSessionStore::new(conn), config.workflow_options())
}

/// Log what the operator should do after a failed import step.
pub(crate) fn log_recovery_hint(err: &WorkflowError) {
    if let WorkflowError::BlockingErrors { .. } = err {
        log::info!("Fix the rows listed in the preview, then upload the file again.");
        return;
    }
    if err.needs_new_upload() {
        log::info!("Start over with 'league-admin import upload <kind> <file>'.");
        return;
    }
    match err.return_to() {
        Stage::Uploaded => {
            log::info!("Adjust the mapping with 'league-admin import map <session> --set field=Header'.")
        }
        Stage::Mapped => log::info!("Run 'league-admin import preview <session>' next."),
        Stage::Previewed => {
            log::info!("Re-run with 'league-admin import commit <session> --confirm'.")
        }
        Stage::Committed => {}
    }
}

fn print_mapping(session: &ImportSession) {
    log::info!(
        "{}",
        "Column mapping".if_supports_color(Stdout, |t| t.bold()),
    );
    let specs = field_specs(session.kind);
    for (spec, (field, header)) in specs.iter().zip(session.mapping.entries(session.kind)) {
        let marker = if spec.required { "*" } else { " " };
        match header {
            Some(h) => log::info!(
                "  {}{:<20} {}",
                marker,
                field.if_supports_color(Stdout, |t| t.cyan()),
                h,
            ),
            None => log::info!(
                "  {}{:<20} {}",
                marker,
                field.if_supports_color(Stdout, |t| t.cyan()),
                "unmapped".if_supports_color(Stdout, |t| t.dimmed()),
            ),
        }
    }
    if session.kind == ImportKind::TeamAvailability {
        log::info!(
            "  {} availability column(s) detected",
            session.availability_columns.len()
        );
        for column in &session.availability_columns {
            log::debug!("    {} -> {} {}", column.header, column.date, column.modifier);
        }
    }
}

/// Upload a file and open a session.
pub(crate) fn run_upload(
    config: &Config,
    kind: ImportKind,
    file: &Path,
    delimiter: Option<Delimiter>,
) -> Result<(), CliError> {
    let conn = open_db(config)?;
    let workflow = workflow(&conn, config);
    let delimiter = delimiter.unwrap_or(config.delimiter.value);
    let session = workflow.upload(&config.operator.value, kind, file, delimiter)?;

    log::info!(
        "{}",
        format!("Started {} import", kind.label()).if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Session: {}",
        session.id.if_supports_color(Stdout, |t| t.green())
    );
    log::info!("  File:    {} ({})", session.source_name, delimiter);
    log::info!("  Headers: {}", session.headers.join(", "));
    crate::log_blank();
    print_mapping(&session);
    crate::log_blank();
    log::info!(
        "Review with 'league-admin import map {} --accept' or change fields with --set/--unset.",
        session.id
    );
    Ok(())
}

/// Show or edit a session's mapping.
pub(crate) fn run_map(
    config: &Config,
    id: &str,
    set: &[String],
    unset: Vec<String>,
    accept: bool,
) -> Result<(), CliError> {
    let conn = open_db(config)?;
    let workflow = workflow(&conn, config);

    let edit = MappingEdit {
        set: set
            .iter()
            .map(|s| MappingEdit::parse_assignment(s))
            .collect::<Result<_, _>>()
            .map_err(WorkflowError::from)?,
        unset,
    };

    if edit.is_empty() && !accept {
        let session = workflow
            .sessions(&config.operator.value)?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| WorkflowError::SessionNotFound { id: id.to_string() })?;
        print_mapping(&session);
        crate::log_blank();
        log::info!("Nothing changed. Pass --accept to use this mapping.");
        return Ok(());
    }

    let session = workflow.map(&config.operator.value, id, &edit)?;
    print_mapping(&session);
    crate::log_blank();
    log::info!("Mapping saved. Next: 'league-admin import preview {}'", session.id);
    Ok(())
}

fn classification_label(c: Classification) -> String {
    let text = format!("{:<9}", c.as_str());
    match c {
        Classification::Add => text.if_supports_color(Stdout, |t| t.green()).to_string(),
        Classification::Update => text.if_supports_color(Stdout, |t| t.yellow()).to_string(),
        Classification::Duplicate => text.if_supports_color(Stdout, |t| t.dimmed()).to_string(),
        Classification::Error => text.if_supports_color(Stdout, |t| t.red()).to_string(),
    }
}

fn print_preview_row(row: &PreviewRow) {
    log::info!(
        "  {:>5}  {} {}",
        row.line,
        classification_label(row.classification),
        truncate_str(&row.describe(), 60),
    );
    if let Some(issue) = &row.error {
        log::info!(
            "         {}",
            issue.to_string().if_supports_color(Stdout, |t| t.red())
        );
    }
    for change in &row.changes {
        log::info!(
            "         {}: '{}' -> '{}'",
            change.field.if_supports_color(Stdout, |t| t.cyan()),
            change.old,
            change.new,
        );
    }
    for note in &row.notes {
        log::info!(
            "         {}",
            note.if_supports_color(Stdout, |t| t.dimmed())
        );
    }
}

/// Classify a session's rows and print the result.
pub(crate) fn run_preview(config: &Config, id: &str, all: bool) -> Result<(), CliError> {
    let conn = open_db(config)?;
    let workflow = workflow(&conn, config);
    let session = workflow.preview(&config.operator.value, id)?;
    let summary = summarize(&session.preview);

    log::info!(
        "{}",
        format!("Preview of {} ({})", session.source_name, session.kind.label())
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for row in &session.preview {
        if all || row.classification != Classification::Duplicate {
            print_preview_row(row);
        }
    }
    crate::log_blank();
    log::info!(
        "  {} add, {} update, {} duplicate, {} error ({} rows)",
        summary.add,
        summary.update,
        summary.duplicate,
        summary.error,
        summary.total(),
    );

    if summary.error > 0 {
        log::warn!(
            "{} row(s) have errors and block the commit; fix the file and upload it again.",
            summary.error
        );
    } else {
        log::info!(
            "Commit with 'league-admin import commit {} --confirm'.",
            session.id
        );
    }
    Ok(())
}

/// Commit a previewed session.
pub(crate) fn run_commit(
    config: &Config,
    id: &str,
    confirm: bool,
    quiet: bool,
    verbose: bool,
) -> Result<(), CliError> {
    let conn = open_db(config)?;
    let workflow = workflow(&conn, config);

    let bar;
    let progress: &dyn CommitProgress = if verbose {
        &LogProgress
    } else {
        bar = CommitBar::new(quiet);
        &bar
    };
    let result = workflow.commit(&config.operator.value, id, confirm, Some(progress))?;

    log::info!(
        "{}",
        "Commit complete".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Added:   {:>6}", result.added);
    log::info!("  Updated: {:>6}", result.updated);
    log::info!("  Skipped: {:>6}", result.skipped);
    log::info!("  Failed:  {:>6}", result.errored);

    let failures: Vec<_> = result.failures().collect();
    if !failures.is_empty() {
        crate::log_blank();
        log::warn!("{} row(s) could not be written:", failures.len());
        for outcome in failures {
            if let RowStatus::Failed { message } = &outcome.status {
                log::warn!(
                    "  {} line {}: {} ({})",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    outcome.line,
                    outcome.description,
                    message,
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn run_cancel(config: &Config, id: &str) -> Result<(), CliError> {
    let conn = open_db(config)?;
    workflow(&conn, config).cancel(&config.operator.value, id)?;
    log::info!("Cancelled session {id}");
    Ok(())
}

/// List the operator's open sessions.
pub(crate) fn run_sessions(config: &Config) -> Result<(), CliError> {
    let conn = open_db(config)?;
    let sessions = workflow(&conn, config).sessions(&config.operator.value)?;
    if sessions.is_empty() {
        log::info!("No open sessions for '{}'.", config.operator.value);
        return Ok(());
    }
    log::info!(
        "{}",
        format!("Open sessions for '{}'", config.operator.value)
            .if_supports_color(Stdout, |t| t.bold()),
    );
    for s in &sessions {
        log::info!(
            "  {}  {:<21} {:<10} {}  {}",
            s.id.if_supports_color(Stdout, |t| t.green()),
            s.kind.as_str(),
            s.stage.as_str(),
            s.created_at.format("%Y-%m-%d %H:%M"),
            truncate_str(&s.source_name, 40),
        );
    }
    Ok(())
}

pub(crate) fn run_purge(config: &Config, hours: Option<u64>) -> Result<(), CliError> {
    let hours = hours.unwrap_or(config.session_max_age_hours.value);
    let max_age = i64::try_from(hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .ok_or_else(|| CliError::other(format!("--hours {hours} is out of range")))?;
    let conn = open_db(config)?;
    let purged = workflow(&conn, config).purge_older_than(max_age)?;
    log::info!("Purged {purged} session(s) older than {hours} hour(s).");
    Ok(())
}

/// Describe the fields of one import kind.
pub(crate) fn run_fields(kind: ImportKind) {
    log::info!(
        "{}",
        format!("{} fields", kind.label()).if_supports_color(Stdout, |t| t.bold()),
    );
    for spec in field_specs(kind) {
        log::info!(
            "  {:<20} {:<24} {}",
            spec.name.if_supports_color(Stdout, |t| t.cyan()),
            spec.label,
            if spec.required { "required" } else { "optional" },
        );
        if !spec.synonyms.is_empty() {
            log::debug!("    accepts: {}", spec.synonyms.join(", "));
        }
    }
    if kind == ImportKind::TeamAvailability {
        log::info!("  Plus one or more 'Availability [Weekday Month Day, Year - Time]' columns.");
    }
}
