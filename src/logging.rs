//! Tracing setup for binaries and integration tests.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// The filter is taken from the `RUST_LOG` environment variable when set,
/// falling back to `default_directive` otherwise. Safe to call more than once:
/// later calls leave the first subscriber in place.
pub fn init(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_filter(filter))
        .try_init();
}

#[cfg(test)]
mod logging_tests {
    use super::init;

    #[test]
    fn init_is_idempotent() {
        init("info");
        init("debug");
    }
}
