pub mod codec;
pub mod core;
pub mod listener;
pub mod publish;
pub mod routing;
pub mod topology;
pub mod transport;

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Crate version as recorded by the build script.
pub fn version() -> &'static str {
    PKG_VERSION
}
