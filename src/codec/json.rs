//! JSON codec for structured payloads

use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{CodecError, CodecResult};
use super::traits::Codec;

/// serde_json codec for any serializable payload type.
#[derive(Debug)]
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn encode(&self, value: &T) -> CodecResult<Bytes> {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|err| CodecError::Encode {
                message: err.to_string(),
            })
    }

    fn decode(&self, payload: &Bytes) -> CodecResult<T> {
        serde_json::from_slice(payload).map_err(|err| CodecError::Decode {
            message: err.to_string(),
        })
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct OrderPaid {
        order_id: u64,
        amount_cents: i64,
    }

    #[test]
    fn test_encode_decode_struct() {
        let codec = JsonCodec::<OrderPaid>::new();
        let payload = OrderPaid {
            order_id: 123,
            amount_cents: 4999,
        };

        let bytes = codec.encode(&payload).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), payload);
    }

    #[test]
    fn test_decode_failure_reports_decode_error() {
        let codec = JsonCodec::<OrderPaid>::new();

        let result = codec.decode(&Bytes::from_static(b"not json"));
        assert!(matches!(result, Err(CodecError::Decode { .. })));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(JsonCodec::<OrderPaid>::new().content_type(), "application/json");
    }
}
