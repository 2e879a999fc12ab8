//! Common error infrastructure for arena-core.
//!
//! Domain-specific errors (`RosterError`, `StatusError`) live next to the
//! types they validate. Every one of them maps onto an [`ErrorSeverity`] so
//! the runtime can decide whether to drop an action, isolate a fault, or
//! abort the turn.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: bad input (unknown actor or target); the action is dropped
/// - **Recoverable**: a business rule refused the request; the turn continues
/// - **Internal**: unexpected inconsistency that deserves investigation
/// - **Fatal**: corrupted game truth; the turn aborts and only a rollback recovers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Validation,
    Recoverable,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Recoverable => "recoverable",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the current turn can keep going after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation | Self::Recoverable)
    }

    /// Returns true if this error must abort the current turn.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Trait for errors that can be classified by severity.
pub trait GameError: std::error::Error {
    fn severity(&self) -> ErrorSeverity;
}
