//! Exchange routing against the declared topology

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::topology::{ExchangeKind, Topology};

use super::error::{RouteError, RouteResult};

/// Resolves published routing keys to the set of bound queues.
///
/// Every `route` call works against a point-in-time snapshot of the
/// exchange's bindings: a binding added after matching began does not
/// affect the result, and a removal never retracts deliveries that were
/// already dispatched. The call is synchronous and safe to invoke
/// concurrently from any number of consume loops and publishers.
pub struct Router {
    topology: Arc<Topology>,
}

impl Router {
    pub fn new(topology: Arc<Topology>) -> Self {
        Self { topology }
    }

    /// The topology this router matches against.
    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Resolve the queues a routing key reaches on an exchange.
    ///
    /// An unknown exchange is an error; a key that matches no binding is
    /// not - it yields an empty set, and the message is simply dropped by
    /// the broker side (mirroring default broker behaviour).
    pub fn route(&self, exchange: &str, routing_key: &str) -> RouteResult<BTreeSet<String>> {
        let view = self
            .topology
            .exchange(exchange)
            .map_err(|err| RouteError::OperationFailed {
                message: err.to_string(),
            })?
            .ok_or_else(|| RouteError::ExchangeNotFound {
                name: exchange.to_string(),
            })?;

        let mut queues = BTreeSet::new();
        for binding in &view.bindings {
            let matched = match view.kind {
                // Exact text equality; a wildcard bound to a direct
                // exchange is treated as an ordinary literal.
                ExchangeKind::Direct => binding.pattern.text() == routing_key,
                ExchangeKind::Fanout => true,
                ExchangeKind::Topic => binding.pattern.matches(routing_key),
            };
            if matched {
                queues.insert(binding.queue.clone());
            }
        }

        log::trace!(
            "Routing key '{}' on exchange '{}' matched {} queue(s)",
            routing_key,
            exchange,
            queues.len()
        );
        Ok(queues)
    }
}
