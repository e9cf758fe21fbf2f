//! Listener Error Types

use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Listener container is already running")]
    AlreadyRunning,

    #[error("Listener container is not running")]
    NotRunning,

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for listener operations
pub type ListenerResult<T> = Result<T, ListenerError>;
