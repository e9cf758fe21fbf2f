//! Publish Error Types

use crate::codec::CodecError;
use crate::routing::RouteError;
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Routing failed: {0}")]
    Route(#[from] RouteError),

    #[error("Payload encoding failed: {0}")]
    Encode(#[from] CodecError),

    #[error("Transport send failed: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for publish operations
pub type PublishResult<T> = Result<T, PublishError>;
