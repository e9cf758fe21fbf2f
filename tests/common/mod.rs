//! Common test utilities and helpers
//!
//! Shared fixtures for the end-to-end messaging tests: logger setup and a
//! fully wired in-memory messaging stack.

use std::sync::{Arc, OnceLock};

use flexi_logger::LoggerHandle;
use relaymq::routing::Router;
use relaymq::topology::{Topology, TopologyConfig};
use relaymq::transport::{Channel, InMemoryTransport, Transport};

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

/// Initialize test logging once per process. Honors `RUST_LOG`.
pub fn init_test_logging() {
    let _ = LOGGER.get_or_init(|| {
        flexi_logger::Logger::try_with_env_or_str("debug")
            .expect("logger spec should parse")
            .start()
            .expect("logger should start")
    });
}

/// A fully wired in-memory messaging stack.
pub struct TestStack {
    pub topology: Arc<Topology>,
    pub router: Arc<Router>,
    pub transport: InMemoryTransport,
    pub channel: Arc<dyn Channel>,
}

/// Build a stack with the given TOML topology applied.
pub async fn stack_from_toml(config: &str) -> TestStack {
    init_test_logging();

    let topology = Arc::new(Topology::new());
    TopologyConfig::from_toml_str(config)
        .expect("test topology should parse")
        .apply(&topology)
        .expect("test topology should apply");

    let router = Arc::new(Router::new(topology.clone()));
    let transport = InMemoryTransport::new(router.clone());
    let channel: Arc<dyn Channel> = Arc::from(
        transport
            .open_channel()
            .await
            .expect("channel should open"),
    );

    TestStack {
        topology,
        router,
        transport,
        channel,
    }
}
