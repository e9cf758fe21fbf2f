//! Topology data types

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::routing::BindingPattern;

/// Routing behaviour of an exchange.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    /// Exact routing-key equality against the bound pattern text.
    Direct,
    /// `*`/`#` wildcard matching over dot-separated segments.
    Topic,
    /// Every bound queue receives every message; patterns are ignored.
    Fanout,
}

/// Declaration parameters for a queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueSpec {
    pub name: String,
    /// Durability is transport metadata; it never influences routing.
    pub durable: bool,
}

impl QueueSpec {
    /// A non-durable queue.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            durable: false,
        }
    }

    /// A durable queue.
    pub fn durable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            durable: true,
        }
    }
}

/// One binding connecting an exchange to a queue via a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub exchange: String,
    pub queue: String,
    pub pattern: BindingPattern,
}

/// Point-in-time view of one exchange, as used for routing.
#[derive(Clone, Debug)]
pub struct ExchangeView {
    pub kind: ExchangeKind,
    pub bindings: Vec<Binding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_exchange_kind_display_and_parse() {
        assert_eq!(ExchangeKind::Topic.to_string(), "topic");
        assert_eq!(ExchangeKind::Direct.to_string(), "direct");
        assert_eq!(ExchangeKind::Fanout.to_string(), "fanout");

        assert_eq!(ExchangeKind::from_str("topic").unwrap(), ExchangeKind::Topic);
        assert!(ExchangeKind::from_str("headers").is_err());
    }

    #[test]
    fn test_queue_spec_constructors() {
        assert!(!QueueSpec::new("q").durable);
        assert!(QueueSpec::durable("q").durable);
    }
}
