//! Declarative messaging topology
//!
//! Exchanges, queues and the bindings that connect them. The topology is
//! pure data with a reader/writer declaration discipline: declarations are
//! idempotent, redeclaration with different parameters is a conflict, and
//! routing always observes a consistent point-in-time snapshot.
//!
//! Topology entities are normally created at startup - either
//! programmatically or from static TOML configuration via
//! [`TopologyConfig`] - and live for the process lifetime, though bindings
//! may be added and removed at any time while messages are in flight.
//!
//! # Example
//!
//! ```rust
//! use relaymq::topology::{ExchangeKind, Topology};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let topology = Topology::new();
//! topology.declare_exchange("orders", ExchangeKind::Topic)?;
//! topology.declare_queue("billing")?;
//! topology.bind("orders", "billing", "orders.*.paid")?;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod registry;
mod types;

pub use config::{BindingDecl, ExchangeDecl, QueueDecl, TopologyConfig};
pub use error::{TopologyError, TopologyResult};
pub use registry::Topology;
pub use types::{Binding, ExchangeKind, ExchangeView, QueueSpec};
