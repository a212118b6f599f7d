//! League data model types shared by the persistence layer, the import
//! pipeline, and the CLI.
//!
//! This crate has no database dependency. Consumers can use these types for
//! serialization, display, or passing to `league-db` for persistence.

pub mod kind;
pub mod types;

pub use kind::{Delimiter, ImportKind, UnknownVariant};
pub use types::*;
