//! Message publishing
//!
//! The publisher is the producer-side entry point: it validates the target
//! exchange, encodes the payload through the configured codec and hands the
//! bytes plus routing metadata to the transport. One transport send per
//! publish; retry policy, if any, lives in the transport.

mod error;
mod publisher;

pub use error::{PublishError, PublishResult};
pub use publisher::{DeliveryReceipt, Publisher};
