//! CLI settings: database path, operator, and import defaults.
//!
//! The settings file is `~/.config/league-admin/settings.toml`. Each value is
//! resolved by priority: command-line flag, environment variable, settings
//! file, then a built-in default.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use league_core::Delimiter;
use league_import::{DEFAULT_MAX_UPLOAD_BYTES, WorkflowOptions};
use serde::Deserialize;

use crate::CliError;

pub(crate) const DB_ENV: &str = "LEAGUE_ADMIN_DB";
pub(crate) const OPERATOR_ENV: &str = "LEAGUE_ADMIN_OPERATOR";

/// Sessions older than this are purged by default.
pub(crate) const DEFAULT_SESSION_MAX_AGE_HOURS: u64 = 24;

/// Canonical path to the settings file.
pub(crate) fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("league-admin").join("settings.toml")
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("league-admin")
        .join("league.db")
}

fn default_upload_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("league-admin")
        .join("uploads")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub operator: Option<String>,
    pub database: DatabaseSettings,
    pub import: ImportSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct DatabaseSettings {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct ImportSettings {
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<u64>,
    pub delimiter: Option<Delimiter>,
    pub session_max_age_hours: Option<u64>,
}

impl Settings {
    /// Read the settings file. A missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, CliError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&contents)
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    Flag,
    Env(&'static str),
    File,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag => f.write_str("command line"),
            Self::Env(var) => write!(f, "env: {var}"),
            Self::File => f.write_str("settings file"),
            Self::Default => f.write_str("default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

fn pick<T>(
    flag: Option<T>,
    env: Option<(T, &'static str)>,
    file: Option<T>,
    default: impl FnOnce() -> T,
) -> Resolved<T> {
    if let Some(value) = flag {
        return Resolved {
            value,
            source: Source::Flag,
        };
    }
    if let Some((value, var)) = env {
        return Resolved {
            value,
            source: Source::Env(var),
        };
    }
    if let Some(value) = file {
        return Resolved {
            value,
            source: Source::File,
        };
    }
    Resolved {
        value: default(),
        source: Source::Default,
    }
}

/// Effective configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub db_path: Resolved<PathBuf>,
    pub operator: Resolved<String>,
    pub upload_dir: Resolved<PathBuf>,
    pub max_upload_bytes: Resolved<u64>,
    pub delimiter: Resolved<Delimiter>,
    pub session_max_age_hours: Resolved<u64>,
}

impl Config {
    /// Resolve every value. `env` looks up environment variables.
    pub(crate) fn resolve(
        settings: &Settings,
        db_flag: Option<PathBuf>,
        operator_flag: Option<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let non_empty = |var: &'static str| env(var).filter(|v| !v.trim().is_empty());
        Self {
            db_path: pick(
                db_flag,
                non_empty(DB_ENV).map(|v| (PathBuf::from(v), DB_ENV)),
                settings.database.path.clone(),
                default_db_path,
            ),
            operator: pick(
                operator_flag,
                non_empty(OPERATOR_ENV).map(|v| (v, OPERATOR_ENV)),
                settings.operator.clone(),
                || {
                    non_empty("USER")
                        .or_else(|| non_empty("USERNAME"))
                        .unwrap_or_else(|| "admin".to_string())
                },
            ),
            upload_dir: pick(
                None,
                None,
                settings.import.upload_dir.clone(),
                default_upload_dir,
            ),
            max_upload_bytes: pick(None, None, settings.import.max_upload_bytes, || {
                DEFAULT_MAX_UPLOAD_BYTES
            }),
            delimiter: pick(None, None, settings.import.delimiter, Delimiter::default),
            session_max_age_hours: pick(None, None, settings.import.session_max_age_hours, || {
                DEFAULT_SESSION_MAX_AGE_HOURS
            }),
        }
    }

    pub(crate) fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            upload_dir: self.upload_dir.value.clone(),
            max_upload_bytes: self.max_upload_bytes.value,
        }
    }
}

/// How a settable key's value is checked and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Path,
    Integer,
    Delimiter,
}

/// Keys accepted by `config set`.
const KEYS: &[(&str, ValueKind)] = &[
    ("operator", ValueKind::Text),
    ("database.path", ValueKind::Path),
    ("import.upload_dir", ValueKind::Path),
    ("import.max_upload_bytes", ValueKind::Integer),
    ("import.delimiter", ValueKind::Delimiter),
    ("import.session_max_age_hours", ValueKind::Integer),
];

pub(crate) fn settable_keys() -> impl Iterator<Item = &'static str> {
    KEYS.iter().map(|(k, _)| *k)
}

fn parse_value(key: &str, kind: ValueKind, raw: &str) -> Result<toml::Value, CliError> {
    let raw = raw.trim();
    match kind {
        ValueKind::Text | ValueKind::Path => {
            if raw.is_empty() {
                return Err(CliError::config(format!("{key} cannot be empty")));
            }
            Ok(toml::Value::String(raw.to_string()))
        }
        ValueKind::Integer => raw
            .parse::<u32>()
            .map(|n| toml::Value::Integer(n.into()))
            .map_err(|_| CliError::config(format!("{key} must be a whole number, got '{raw}'"))),
        ValueKind::Delimiter => raw
            .parse::<Delimiter>()
            .map(|d| toml::Value::String(d.as_str().to_string()))
            .map_err(|e| CliError::config(e.to_string())),
    }
}

/// Set one dotted `key` in the settings file at `path`.
///
/// Edits a `toml::Value` in place so unknown keys survive, then writes
/// atomically through a temporary file.
pub(crate) fn set_value(path: &Path, key: &str, raw: &str) -> Result<(), CliError> {
    let (_, kind) = KEYS.iter().find(|(k, _)| *k == key).ok_or_else(|| {
        CliError::config(format!(
            "Unknown setting '{}' (expected one of: {})",
            key,
            settable_keys().collect::<Vec<_>>().join(", ")
        ))
    })?;
    let value = parse_value(key, *kind, raw)?;

    let mut doc: toml::Value = match std::fs::read_to_string(path) {
        Ok(contents) => contents
            .parse()
            .map_err(|e| CliError::config(format!("{}: {}", path.display(), e)))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => toml::Value::Table(Default::default()),
        Err(e) => return Err(e.into()),
    };

    let mut table = doc
        .as_table_mut()
        .ok_or_else(|| CliError::config("settings.toml root is not a table"))?;
    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = parts.pop().unwrap_or(key);
    for section in parts {
        table = table
            .entry(section)
            .or_insert_with(|| toml::Value::Table(Default::default()))
            .as_table_mut()
            .ok_or_else(|| CliError::config(format!("[{section}] is not a table")))?;
    }
    table.insert(leaf.to_string(), value);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc).map_err(io::Error::other)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// The settings file as pretty-printed TOML, if it exists and parses.
pub(crate) fn load_settings_string(path: &Path) -> Option<String> {
    let contents = std::fs::read_to_string(path).ok()?;
    let doc: toml::Value = contents.parse().ok()?;
    toml::to_string_pretty(&doc).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_priority_flag_env_file_default() {
        let settings = Settings {
            operator: Some("file-op".into()),
            database: DatabaseSettings {
                path: Some(PathBuf::from("/file.db")),
            },
            ..Default::default()
        };
        let env = |var: &str| match var {
            DB_ENV => Some("/env.db".to_string()),
            _ => None,
        };

        let config = Config::resolve(&settings, Some("/flag.db".into()), None, env);
        assert_eq!(config.db_path.value, PathBuf::from("/flag.db"));
        assert_eq!(config.db_path.source, Source::Flag);
        assert_eq!(config.operator.value, "file-op");
        assert_eq!(config.operator.source, Source::File);

        let config = Config::resolve(&settings, None, None, env);
        assert_eq!(config.db_path.value, PathBuf::from("/env.db"));
        assert_eq!(config.db_path.source, Source::Env(DB_ENV));

        let config = Config::resolve(&Settings::default(), None, None, no_env);
        assert_eq!(config.db_path.source, Source::Default);
        assert_eq!(config.operator.value, "admin");
        assert_eq!(config.max_upload_bytes.value, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.delimiter.value, Delimiter::Comma);
    }

    #[test]
    fn test_set_value_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league-admin").join("settings.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "custom = \"kept\"\n\n[import]\ndelimiter = \"tab\"\n").unwrap();

        set_value(&path, "import.max_upload_bytes", "1024").unwrap();
        set_value(&path, "database.path", "/srv/league.db").unwrap();
        set_value(&path, "import.delimiter", ";").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.import.max_upload_bytes, Some(1024));
        assert_eq!(settings.import.delimiter, Some(Delimiter::Semicolon));
        assert_eq!(settings.database.path, Some(PathBuf::from("/srv/league.db")));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("custom = \"kept\""));
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        assert!(set_value(&path, "import.colour", "red").is_err());
        assert!(set_value(&path, "import.max_upload_bytes", "lots").is_err());
        assert!(set_value(&path, "import.delimiter", "#").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_settings_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[import]\nmax_upload_bytes = \"big\"\n").unwrap();
        assert!(matches!(Settings::load(&path), Err(CliError::Config(_))));
    }
}
