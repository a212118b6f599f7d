pub(crate) mod config;
pub(crate) mod export;
pub(crate) mod import;
pub(crate) mod records;

use league_db::Connection;

use crate::CliError;
use crate::settings::Config;

/// Open (or create) the configured league database.
pub(crate) fn open_db(config: &Config) -> Result<Connection, CliError> {
    let path = &config.db_path.value;
    league_db::open_database(path).map_err(|e| {
        CliError::database(format!("Failed to open {}: {}", path.display(), e))
    })
}

/// Truncate a string to a maximum width in characters, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let head: String = s.chars().take(max - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max).collect()
    }
}
