//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts, value coercion). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// No live ware answered for the requested id.
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. duplicate id, ambiguous responders).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested ware kind is not registered.
    #[error("unknown ware kind: {0}")]
    UnknownKind(String),

    /// The requested constructor shape does not exist for the kind.
    #[error("unknown constructor shape {index} for kind {kind}")]
    UnknownShape { kind: String, index: usize },

    /// The number of supplied values does not match the chosen shape.
    #[error("expected {expected} values, got {actual}")]
    Arity { expected: usize, actual: usize },

    /// A supplied value could not be coerced to the declared type.
    #[error("conversion failed: {0}")]
    Conversion(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownKind(kind.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    /// Whether the caller can fix the input and retry (re-prompt) the operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidId(_)
                | Self::Conflict(_)
                | Self::Arity { .. }
                | Self::Conversion(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            DomainError::unknown_kind("Gas").to_string(),
            "unknown ware kind: Gas"
        );
        assert_eq!(
            DomainError::Arity { expected: 5, actual: 3 }.to_string(),
            "expected 5 values, got 3"
        );
    }

    #[test]
    fn conversion_failures_are_recoverable() {
        assert!(DomainError::conversion("x").is_recoverable());
        assert!(!DomainError::not_found().is_recoverable());
        assert!(!DomainError::unknown_kind("Gas").is_recoverable());
    }
}
