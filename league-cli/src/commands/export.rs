use std::path::Path;

use chrono::NaiveDate;

use crate::CliError;
use crate::settings::Config;

use super::open_db;

/// Write the scheduling dataset for `[start, end]` as JSON.
pub(crate) fn run_dataset(
    config: &Config,
    start: NaiveDate,
    end: NaiveDate,
    out: Option<&Path>,
) -> Result<(), CliError> {
    if start > end {
        return Err(CliError::other(format!(
            "--start {start} is after --end {end}"
        )));
    }
    let conn = open_db(config)?;
    let dataset = league_db::schedule_dataset(&conn, start, end)
        .map_err(|e| CliError::database(format!("Failed to build dataset: {e}")))?;
    let json = serde_json::to_string_pretty(&dataset)
        .map_err(|e| CliError::other(format!("Failed to serialize dataset: {e}")))?;

    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!(
                "Wrote {} teams, {} time slots, {} games to {}",
                dataset.teams.len(),
                dataset.timeslots.len(),
                dataset.previous_games.len(),
                path.display()
            );
        }
        // Raw print: the JSON is the command's output.
        None => println!("{json}"),
    }
    Ok(())
}
