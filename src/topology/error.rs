//! Topology Error Types

use crate::routing::PatternError;

use super::types::ExchangeKind;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Exchange '{name}' already declared as {existing}")]
    ExchangeConflict { name: String, existing: ExchangeKind },

    #[error("Queue '{name}' already declared with durable={existing}")]
    QueueConflict { name: String, existing: bool },

    #[error("Exchange not found: {name}")]
    ExchangeNotFound { name: String },

    #[error("Queue not found: {name}")]
    QueueNotFound { name: String },

    #[error("Invalid binding pattern: {0}")]
    InvalidPattern(#[from] PatternError),

    #[error("Invalid topology configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },
}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;
