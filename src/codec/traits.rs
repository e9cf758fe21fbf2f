//! Codec capability trait

use bytes::Bytes;

use super::error::CodecResult;

/// Converts a typed payload to and from transport bytes.
///
/// Implementations must be cheap to share: a codec is cloned into every
/// consume loop and publisher that uses it.
pub trait Codec<T>: Send + Sync {
    /// Encode a payload into transport bytes.
    fn encode(&self, value: &T) -> CodecResult<Bytes>;

    /// Decode transport bytes back into a payload.
    fn decode(&self, payload: &Bytes) -> CodecResult<T>;

    /// Content-type hint attached to published messages.
    fn content_type(&self) -> &str;
}
