//! Tabular import pipeline for league data.
//!
//! Turns operator-supplied delimited files into validated, classified rows
//! and applies them to the league database. A session moves through four
//! steps: upload (buffer the file, suggest a column mapping), map (operator
//! confirms or edits the mapping), preview (every row classified as add,
//! update, duplicate, or error against the current league), and commit
//! (rows applied one transaction each).

pub mod audit;
pub mod availability;
pub mod commit;
pub mod diff;
pub mod error;
pub mod fields;
pub mod mapping;
pub mod normalize;
pub mod parser;
pub mod preview;
pub mod progress;
pub mod rows;
pub mod session;
pub mod slots;
pub mod state;
pub mod workflow;

pub use audit::AuditTrail;
pub use availability::{AvailabilityColumn, detect_availability_columns, parse_availability_header};
pub use commit::{CommitResult, RowOutcome, RowStatus, execute_commit};
pub use diff::{Reconciled, reconcile_row};
pub use error::{MappingError, ParseError, PersistenceError, RowIssue, StoreError, WorkflowError};
pub use fields::{FieldSpec, field_spec, field_specs, required_fields};
pub use mapping::{ColumnMapping, auto_map};
pub use normalize::{
    NormalizationError, normalize_count, normalize_date, normalize_modifier, normalize_text,
    parse_availability_cell,
};
pub use parser::{ParseMode, ParsedTable, RawRow, parse_table, read_headers};
pub use preview::{Classification, FieldChange, PreviewRow, PreviewSummary, build_preview, summarize};
pub use progress::{CommitProgress, LogProgress, SilentProgress};
pub use rows::{
    AvailabilityRow, GameRow, ImportRow, LocationRow, LocationSlotRow, RankingRow, SlotChange,
    TeamRow,
};
pub use session::{ImportSession, MemorySessionStore, SessionStore, SqliteSessionStore, Stage};
pub use slots::{format_clock, match_slots, parse_clock_minutes};
pub use state::LeagueState;
pub use workflow::{DEFAULT_MAX_UPLOAD_BYTES, ImportWorkflow, MappingEdit, WorkflowOptions};
