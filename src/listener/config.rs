//! Listener container configuration

use std::time::Duration;

/// What to do with a delivery whose payload fails to decode.
///
/// Undecodable deliveries are never requeued: redelivering bytes that do
/// not decode would fail the same way forever.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DecodeFailurePolicy {
    /// Acknowledge and drop the delivery.
    #[default]
    Drop,
    /// Forward the raw payload to an error exchange through the normal
    /// send path, then acknowledge.
    DeadLetter {
        exchange: String,
        routing_key: String,
    },
}

/// Tuning for a [`ListenerContainer`](super::ListenerContainer).
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bound on the graceful drain performed by `stop()`. Loops still
    /// running at the deadline are aborted.
    pub drain_timeout: Duration,
    /// Policy applied to deliveries whose payload fails to decode.
    pub decode_failure: DecodeFailurePolicy,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            drain_timeout: Duration::from_secs(5),
            decode_failure: DecodeFailurePolicy::Drop,
        }
    }
}
