//! Routing Error Types

/// Rejection reasons for malformed binding patterns.
///
/// Surfaced synchronously at bind time; a pattern that parses is matchable
/// forever after.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("Binding pattern is empty")]
    Empty,

    #[error("Binding pattern '{pattern}' contains an empty segment")]
    EmptySegment { pattern: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Exchange not found: {name}")]
    ExchangeNotFound { name: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

/// Result type for routing operations
pub type RouteResult<T> = Result<T, RouteError>;
