//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use league_core::{Delimiter, ImportKind};

#[derive(Parser)]
#[command(name = "league-admin")]
#[command(about = "Import and reconcile league data from spreadsheets", long_about = None)]
pub(crate) struct Cli {
    /// League database file (overrides LEAGUE_ADMIN_DB and settings)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Operator name recorded on sessions and audit entries
    #[arg(long, global = true)]
    pub operator: Option<String>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Upload, map, preview, and commit spreadsheet imports
    Import {
        #[command(subcommand)]
        action: ImportAction,
    },

    /// Inspect and seed league records
    Records {
        #[command(subcommand)]
        action: RecordsAction,
    },

    /// Export data for the scheduler
    Export {
        #[command(subcommand)]
        action: ExportAction,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ImportAction {
    /// Upload a file and start an import session
    Upload {
        /// What the file contains (location, team, location-availability,
        /// team-availability, previous-game, ranking)
        kind: ImportKind,

        /// Delimited text file
        file: PathBuf,

        /// Cell separator: comma, semicolon, tab, pipe (default from settings)
        #[arg(long)]
        delimiter: Option<Delimiter>,
    },

    /// Review or edit a session's column mapping
    Map {
        /// Session id
        session: String,

        /// Map a field to a header (e.g., --set name="Team Name")
        #[arg(long = "set", value_name = "FIELD=HEADER")]
        set: Vec<String>,

        /// Leave a field unmapped
        #[arg(long, value_name = "FIELD")]
        unset: Vec<String>,

        /// Accept the mapping as shown
        #[arg(long)]
        accept: bool,
    },

    /// Classify every row against the current league data
    Preview {
        /// Session id
        session: String,

        /// Also list duplicate rows
        #[arg(long)]
        all: bool,
    },

    /// Write a previewed session to the database
    Commit {
        /// Session id
        session: String,

        /// Confirm the commit (required)
        #[arg(long)]
        confirm: bool,
    },

    /// Abandon a session and delete its uploaded file
    Cancel {
        /// Session id
        session: String,
    },

    /// List your open sessions
    Sessions,

    /// Remove stale sessions of every operator
    Purge {
        /// Maximum session age in hours (default from settings)
        #[arg(long)]
        hours: Option<u64>,
    },

    /// Show the fields a kind of import accepts
    Fields {
        kind: ImportKind,
    },
}

/// Tables `records list` can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RecordTable {
    Divisions,
    Teams,
    Locations,
    Timeslots,
    Games,
    Imports,
}

#[derive(Subcommand)]
pub(crate) enum RecordsAction {
    /// List the rows of one table
    List {
        table: RecordTable,

        /// Maximum number of rows to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },

    /// Create a division (imports never create divisions)
    AddDivision {
        name: String,
    },

    /// Show row counts for every table
    Stats,
}

#[derive(Subcommand)]
pub(crate) enum ExportAction {
    /// Write the scheduling dataset for a date range as JSON
    Dataset {
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings and their sources
    Show,

    /// Print the settings file path
    Path,

    /// Set a value in the settings file (e.g., import.delimiter tab)
    Set {
        key: String,
        value: String,
    },
}
