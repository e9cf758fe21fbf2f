//! Listener containers and message handlers
//!
//! A [`ListenerContainer`] owns one dedicated consume loop per registered
//! queue. Each loop pulls raw deliveries from the transport, decodes them
//! through the container's codec and dispatches to the registered
//! [`MessageHandler`], acknowledging on success and rejecting on failure.
//! Handler and decode failures are isolated to their single delivery and
//! reported through a pluggable [`FaultHandler`]; the loops themselves keep
//! running.
//!
//! # Overview
//!
//! - One container per decoded payload type; any number of queues per
//!   container, one loop (and one tokio task) per queue.
//! - Deliveries to the same queue are processed strictly in receipt order;
//!   deliveries to different queues are unordered relative to each other.
//! - `stop()` drains the in-flight delivery and refuses to pull new ones,
//!   bounded by the configured drain timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use relaymq::codec::TextCodec;
//! use relaymq::listener::{handler_fn, Delivery, ListenerContainer};
//! use std::sync::Arc;
//!
//! # async fn example(channel: Arc<dyn relaymq::transport::Channel>) -> Result<(), Box<dyn std::error::Error>> {
//! let container = ListenerContainer::new(channel, TextCodec);
//! container.register(
//!     "billing",
//!     Arc::new(handler_fn(|delivery: Delivery<String>| async move {
//!         println!("Received <{}>", delivery.message);
//!         Ok(())
//!     })),
//! );
//! container.start().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod container;
mod error;
mod traits;

pub use config::{DecodeFailurePolicy, ListenerConfig};
pub use container::{ContainerState, ListenerContainer, ListenerRegistration};
pub use error::{ListenerError, ListenerResult};
pub use traits::{
    handler_fn, DeliveryFault, FaultHandler, FnHandler, HandlerError, LogFaultHandler,
    MessageHandler,
};

/// One decoded message handed to a registered handler.
#[derive(Debug, Clone)]
pub struct Delivery<T> {
    /// Queue this message was delivered to.
    pub queue: String,
    /// Routing key the message was published under.
    pub routing_key: String,
    /// Monotonic per-queue sequence number, for idempotent assertions.
    pub sequence: u64,
    /// How many times the delivery was requeued before this attempt.
    pub redelivery_count: u32,
    /// The decoded payload.
    pub message: T,
}

#[cfg(test)]
mod tests;
