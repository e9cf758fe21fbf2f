//! Codec Error Types

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to encode payload: {message}")]
    Encode { message: String },

    #[error("Failed to decode payload: {message}")]
    Decode { message: String },
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;
