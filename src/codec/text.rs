//! Plain-text codec

use bytes::Bytes;

use super::error::{CodecError, CodecResult};
use super::traits::Codec;

/// UTF-8 text codec for `String` payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec<String> for TextCodec {
    fn encode(&self, value: &String) -> CodecResult<Bytes> {
        Ok(Bytes::copy_from_slice(value.as_bytes()))
    }

    fn decode(&self, payload: &Bytes) -> CodecResult<String> {
        std::str::from_utf8(payload)
            .map(str::to_string)
            .map_err(|err| CodecError::Decode {
                message: err.to_string(),
            })
    }

    fn content_type(&self) -> &str {
        "text/plain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_text() {
        let codec = TextCodec;

        let bytes = codec.encode(&"Hello from the broker!".to_string()).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap(), "Hello from the broker!");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let codec = TextCodec;

        let result = codec.decode(&Bytes::from_static(&[0xff, 0xfe]));
        assert!(matches!(result, Err(CodecError::Decode { .. })));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(TextCodec.content_type(), "text/plain");
    }
}
