//! Static topology configuration
//!
//! Topology entities are normally created at startup from declarative TOML
//! configuration:
//!
//! ```toml
//! [[exchanges]]
//! name = "orders"
//! kind = "topic"
//!
//! [[queues]]
//! name = "billing"
//! durable = true
//!
//! [[bindings]]
//! exchange = "orders"
//! queue = "billing"
//! pattern = "orders.*.paid"
//! ```

use serde::Deserialize;

use super::error::{TopologyError, TopologyResult};
use super::registry::Topology;
use super::types::{ExchangeKind, QueueSpec};

/// Declared exchange entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeDecl {
    pub name: String,
    pub kind: ExchangeKind,
}

/// Declared queue entry.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueDecl {
    pub name: String,
    #[serde(default)]
    pub durable: bool,
}

/// Declared binding entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BindingDecl {
    pub exchange: String,
    pub queue: String,
    pub pattern: String,
}

/// Complete declarative topology, deserialized from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologyConfig {
    #[serde(default)]
    pub exchanges: Vec<ExchangeDecl>,
    #[serde(default)]
    pub queues: Vec<QueueDecl>,
    #[serde(default)]
    pub bindings: Vec<BindingDecl>,
}

impl TopologyConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(input: &str) -> TopologyResult<Self> {
        toml::from_str(input).map_err(|err| TopologyError::InvalidConfig {
            message: err.to_string(),
        })
    }

    /// Apply every declaration to a topology, exchanges and queues before
    /// bindings. Fails on the first conflicting or invalid declaration.
    pub fn apply(&self, topology: &Topology) -> TopologyResult<()> {
        for exchange in &self.exchanges {
            topology.declare_exchange(&exchange.name, exchange.kind)?;
        }
        for queue in &self.queues {
            topology.declare_queue_with(QueueSpec {
                name: queue.name.clone(),
                durable: queue.durable,
            })?;
        }
        for binding in &self.bindings {
            topology.bind(&binding.exchange, &binding.queue, &binding.pattern)?;
        }
        log::debug!(
            "Applied topology configuration: {} exchange(s), {} queue(s), {} binding(s)",
            self.exchanges.len(),
            self.queues.len(),
            self.bindings.len()
        );
        Ok(())
    }
}
