//! Process lifecycle helpers.
//!
//! Handles logging setup before the audit run starts.

use tracing_subscriber::EnvFilter;

/// Initialize logging with tracing_subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `level` is used as the filter.
/// `log` records are bridged into tracing so the `log::` macros used across
/// the crate end up on the same subscriber.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive("rquest=warn".parse().expect("static directive"))
        .add_directive("hyper=warn".parse().expect("static directive"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_ansi(true)
        .try_init();

    if let Err(e) = result {
        eprintln!("logging already initialized: {}", e);
    }
}
