//! Handler traits for the listener container

use std::future::Future;

use async_trait::async_trait;

use crate::codec::CodecError;
use crate::transport::TransportError;

use super::Delivery;

/// Error type surfaced by message handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Capability to consume one decoded message.
///
/// Handlers are invoked inline by their owning consume loop, so two
/// deliveries to the same queue are never handled concurrently. Returning
/// an error rejects the delivery; the transport may then redeliver it per
/// its own policy.
#[async_trait]
pub trait MessageHandler<T>: Send + Sync {
    async fn handle(&self, delivery: Delivery<T>) -> Result<(), HandlerError>;
}

/// Adapter turning an async closure into a [`MessageHandler`].
pub struct FnHandler<F> {
    inner: F,
}

/// Wrap an async closure as a [`MessageHandler`].
///
/// ```rust
/// use relaymq::listener::{handler_fn, Delivery, HandlerError};
///
/// let handler = handler_fn(|delivery: Delivery<String>| async move {
///     println!("Received <{}>", delivery.message);
///     Ok::<(), HandlerError>(())
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { inner: f }
}

#[async_trait]
impl<T, F, Fut> MessageHandler<T> for FnHandler<F>
where
    T: Send + 'static,
    F: Fn(Delivery<T>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send,
{
    async fn handle(&self, delivery: Delivery<T>) -> Result<(), HandlerError> {
        (self.inner)(delivery).await
    }
}

/// One per-delivery failure reported by a consume loop.
#[derive(Debug)]
pub enum DeliveryFault {
    /// The payload failed to decode; the delivery was dropped or
    /// dead-lettered per the container's policy.
    Decode {
        queue: String,
        sequence: u64,
        source: CodecError,
    },
    /// The handler returned an error; the delivery was nack'd for
    /// redelivery.
    Handler {
        queue: String,
        sequence: u64,
        source: HandlerError,
    },
    /// The consume stream failed or ended. Fatal for this queue's loop;
    /// the container must be restarted to resume consuming from it.
    Transport {
        queue: String,
        source: Option<TransportError>,
    },
}

/// Sink for per-delivery failures.
///
/// Called from inside the consume loops; implementations must not block.
pub trait FaultHandler: Send + Sync {
    fn on_fault(&self, fault: DeliveryFault);
}

/// Default fault handler reporting through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFaultHandler;

impl FaultHandler for LogFaultHandler {
    fn on_fault(&self, fault: DeliveryFault) {
        match fault {
            DeliveryFault::Decode {
                queue,
                sequence,
                source,
            } => log::warn!(
                "Discarding undecodable delivery {} on queue '{}': {}",
                sequence,
                queue,
                source
            ),
            DeliveryFault::Handler {
                queue,
                sequence,
                source,
            } => log::warn!(
                "Handler failed for delivery {} on queue '{}': {}",
                sequence,
                queue,
                source
            ),
            DeliveryFault::Transport { queue, source } => match source {
                Some(err) => log::error!(
                    "Consume loop for queue '{}' terminated: {}",
                    queue,
                    err
                ),
                None => log::error!(
                    "Consume stream for queue '{}' closed; loop terminated",
                    queue
                ),
            },
        }
    }
}
