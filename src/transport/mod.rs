//! Transport boundary
//!
//! The messaging core does not speak any wire protocol itself; it consumes
//! a [`Transport`] that can open channels, where a channel sends encoded
//! frames toward an exchange and consumes per-queue streams of
//! [`RawDelivery`] values that are acknowledged or rejected individually.
//!
//! [`InMemoryTransport`] is the in-process implementation: it applies the
//! [`Router`](crate::routing::Router) at send time and backs every queue
//! with a channel, so the full publish/consume pipeline runs without an
//! external broker. Connection handling, recovery and redelivery policy
//! belong to the transport, never to the core.

mod error;
mod memory;
mod traits;

pub use error::{TransportError, TransportResult};
pub use memory::{InMemoryTransport, MemoryTransportConfig};
pub use traits::{Acker, Channel, DeliveryStream, RawDelivery, Transport};
