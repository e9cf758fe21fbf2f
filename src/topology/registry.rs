//! Topology registry with idempotent declaration semantics

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::routing::BindingPattern;

use super::error::{TopologyError, TopologyResult};
use super::types::{Binding, ExchangeKind, ExchangeView, QueueSpec};

#[derive(Debug, Default)]
struct TopologyInner {
    exchanges: HashMap<String, ExchangeKind>,
    queues: HashMap<String, QueueSpec>,
    bindings: Vec<Binding>,
}

/// Registry of exchanges, queues and bindings.
///
/// Declarations are idempotent: redeclaring an entity with identical
/// parameters is a no-op, redeclaring with different parameters fails with
/// a conflict. Reads take a shared lock and copy a consistent snapshot;
/// writes only block matching for the duration of their own update. Every
/// operation is synchronous, so no lock is ever held across a suspension
/// point.
///
/// # Thread Safety
///
/// The registry is fully thread-safe and is shared across publishers and
/// consume loops as `Arc<Topology>`.
#[derive(Debug, Default)]
pub struct Topology {
    inner: RwLock<TopologyInner>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an exchange. Redeclaring with the same kind is a no-op.
    pub fn declare_exchange(&self, name: &str, kind: ExchangeKind) -> TopologyResult<()> {
        let mut inner = self.write()?;
        match inner.exchanges.get(name) {
            Some(existing) if *existing == kind => Ok(()),
            Some(existing) => Err(TopologyError::ExchangeConflict {
                name: name.to_string(),
                existing: *existing,
            }),
            None => {
                log::debug!("Declared {} exchange '{}'", kind, name);
                inner.exchanges.insert(name.to_string(), kind);
                Ok(())
            }
        }
    }

    /// Declare a non-durable queue. Redeclaration with identical
    /// parameters is a no-op.
    pub fn declare_queue(&self, name: &str) -> TopologyResult<()> {
        self.declare_queue_with(QueueSpec::new(name))
    }

    /// Declare a queue from an explicit spec.
    pub fn declare_queue_with(&self, spec: QueueSpec) -> TopologyResult<()> {
        let mut inner = self.write()?;
        match inner.queues.get(&spec.name) {
            Some(existing) if *existing == spec => Ok(()),
            Some(existing) => Err(TopologyError::QueueConflict {
                name: spec.name.clone(),
                existing: existing.durable,
            }),
            None => {
                log::debug!("Declared queue '{}' (durable={})", spec.name, spec.durable);
                inner.queues.insert(spec.name.clone(), spec);
                Ok(())
            }
        }
    }

    /// Bind a queue to an exchange with a routing pattern.
    ///
    /// The pattern is validated here; both the exchange and the queue must
    /// already be declared. Binding an identical (exchange, queue, pattern)
    /// triple again is a no-op.
    pub fn bind(&self, exchange: &str, queue: &str, pattern: &str) -> TopologyResult<()> {
        let pattern = BindingPattern::parse(pattern)?;

        let mut inner = self.write()?;
        if !inner.exchanges.contains_key(exchange) {
            return Err(TopologyError::ExchangeNotFound {
                name: exchange.to_string(),
            });
        }
        if !inner.queues.contains_key(queue) {
            return Err(TopologyError::QueueNotFound {
                name: queue.to_string(),
            });
        }

        let binding = Binding {
            exchange: exchange.to_string(),
            queue: queue.to_string(),
            pattern,
        };
        if inner.bindings.contains(&binding) {
            return Ok(());
        }

        log::debug!(
            "Bound queue '{}' to exchange '{}' with pattern '{}'",
            queue,
            exchange,
            binding.pattern
        );
        inner.bindings.push(binding);
        Ok(())
    }

    /// Remove a binding. Removing an absent binding is a no-op; removal
    /// never retracts deliveries that were already dispatched.
    pub fn unbind(&self, exchange: &str, queue: &str, pattern: &str) -> TopologyResult<()> {
        let pattern = BindingPattern::parse(pattern)?;
        let mut inner = self.write()?;
        inner
            .bindings
            .retain(|b| !(b.exchange == exchange && b.queue == queue && b.pattern == pattern));
        Ok(())
    }

    /// Point-in-time snapshot of one exchange, or `None` when undeclared.
    pub fn exchange(&self, name: &str) -> TopologyResult<Option<ExchangeView>> {
        let inner = self.read()?;
        let Some(kind) = inner.exchanges.get(name) else {
            return Ok(None);
        };
        let bindings = inner
            .bindings
            .iter()
            .filter(|b| b.exchange == name)
            .cloned()
            .collect();
        Ok(Some(ExchangeView {
            kind: *kind,
            bindings,
        }))
    }

    /// Declaration parameters of one queue, or `None` when undeclared.
    pub fn queue(&self, name: &str) -> TopologyResult<Option<QueueSpec>> {
        let inner = self.read()?;
        Ok(inner.queues.get(name).cloned())
    }

    /// Number of declared exchanges.
    pub fn exchange_count(&self) -> usize {
        self.inner.read().map(|inner| inner.exchanges.len()).unwrap_or(0)
    }

    /// Number of declared queues.
    pub fn queue_count(&self) -> usize {
        self.inner.read().map(|inner| inner.queues.len()).unwrap_or(0)
    }

    /// Number of registered bindings.
    pub fn binding_count(&self) -> usize {
        self.inner.read().map(|inner| inner.bindings.len()).unwrap_or(0)
    }

    fn read(&self) -> TopologyResult<RwLockReadGuard<'_, TopologyInner>> {
        handle_rwlock_read(self.inner.read(), |message| TopologyError::OperationFailed {
            message,
        })
    }

    fn write(&self) -> TopologyResult<RwLockWriteGuard<'_, TopologyInner>> {
        handle_rwlock_write(self.inner.write(), |message| {
            TopologyError::OperationFailed { message }
        })
    }
}
