//! Payload codecs
//!
//! A [`Codec`] converts a typed payload to and from the opaque bytes the
//! transport carries. The core ships a plain-text codec for `String`
//! payloads and a JSON codec for any serde type; message routing never
//! looks inside the payload.

mod error;
mod json;
mod text;
mod traits;

pub use error::{CodecError, CodecResult};
pub use json::JsonCodec;
pub use text::TextCodec;
pub use traits::Codec;
