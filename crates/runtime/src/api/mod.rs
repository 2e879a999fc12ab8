//! Public runtime API surface.
//!
//! Error types and record sinks exposed to consumers of the runtime crate, so
//! the engine and session layers can stay focused on resolution.

pub mod errors;
pub mod records;

pub use errors::{EngineError, Result};
pub use records::{GameSummary, InMemoryRecords, NullRecords, RecordSink};
