//! Routing-key matching for the messaging core
//!
//! This module decides, given a published message's routing key and the
//! bindings registered on an exchange, which queue(s) receive the message.
//! Routing keys and binding patterns are `.`-separated segment sequences;
//! topic patterns may use `*` (exactly one segment) and `#` (zero or more
//! segments).
//!
//! # Overview
//!
//! - [`BindingPattern`] parses and matches one binding pattern.
//! - [`Router`] resolves (exchange, routing key) to a set of queue names
//!   against a point-in-time snapshot of the declared topology.
//!
//! Routing never mutates state and is safe to invoke concurrently from any
//! number of consume loops and publishers.

mod error;
mod pattern;
mod router;

pub use error::{PatternError, RouteError, RouteResult};
pub use pattern::BindingPattern;
pub use router::Router;
