//! Job-application email parsing service.
//!
//! The `parser` module is the core: it turns a raw application email into a
//! `ParseResult` with per-field and overall confidence. The remaining modules
//! wrap it in an HTTP service.

pub mod config;
pub mod errors;
pub mod parser;
pub mod routes;
pub mod state;

/// Initialize structured logging for a binary. `RUST_LOG` in the environment
/// wins; otherwise the library and the calling binary log at `default_level`.
pub fn init_tracing(binary_crate: &str, default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={default_level},{binary_crate}={default_level}",
                env!("CARGO_CRATE_NAME")
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
