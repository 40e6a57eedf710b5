//! Errors reported by a lab run.
//!
//! None of these abort the process: the controller turns each one into a
//! message for the runtime error slot and returns to idle.

use thiserror::Error;

/// Message shown when a run needs the transpiler before it finished loading.
pub const NOT_READY_MESSAGE: &str =
    "TypeScript runtime is still loading. Please wait a second and try again.";

/// Failure of a single transpile call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranspileError {
    /// The source does not parse. Carries the compiler diagnostics verbatim.
    #[error("{0}")]
    Syntax(String),

    /// `compile` was called before the transpiler finished loading.
    #[error("{NOT_READY_MESSAGE}")]
    NotReady,

    /// The transpiler could not be loaded at all.
    #[error("TypeScript runtime failed to load: {0}")]
    Unavailable(String),
}

/// A run that was rejected before anything reached the execution host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabError {
    #[error("{0}")]
    Transpile(String),

    #[error("{NOT_READY_MESSAGE}")]
    TranspilerNotReady,

    #[error("TypeScript runtime failed to load: {0}")]
    TranspilerUnavailable(String),
}

impl From<TranspileError> for LabError {
    fn from(err: TranspileError) -> Self {
        match err {
            TranspileError::Syntax(msg) => Self::Transpile(msg),
            TranspileError::NotReady => Self::TranspilerNotReady,
            TranspileError::Unavailable(reason) => Self::TranspilerUnavailable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message_is_verbatim() {
        let err = LabError::from(TranspileError::Syntax("Expected `}` but found `EOF`".into()));
        assert_eq!(err.to_string(), "Expected `}` but found `EOF`");
    }

    #[test]
    fn test_not_ready_message() {
        assert_eq!(LabError::TranspilerNotReady.to_string(), NOT_READY_MESSAGE);
        assert_eq!(
            LabError::from(TranspileError::NotReady),
            LabError::TranspilerNotReady
        );
    }
}
