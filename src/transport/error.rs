//! Transport Error Types

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport is closed")]
    Closed,

    #[error("Send failed: {message}")]
    Send { message: String },

    #[error("Consume failed for queue '{queue}': {message}")]
    Consume { queue: String, message: String },

    #[error("Queue '{queue}' already has an attached consumer")]
    ConsumerAttached { queue: String },

    #[error("Acknowledge failed: {message}")]
    Acknowledge { message: String },
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;
