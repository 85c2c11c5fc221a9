//! Logging configuration using tracing
//!
//! Structured logging to stderr, filtered through the RUST_LOG environment variable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing subscriber with the default filter
///
/// # Example RUST_LOG values
/// - `RUST_LOG=debug` - Show provisioning and hydration decisions
/// - `RUST_LOG=cms_hydrate=trace,gql_client=debug` - Per-crate levels
///
/// # Errors
/// Returns an error if a global subscriber is already installed
pub fn init() -> crate::Result<()> {
    init_with_default(DEFAULT_FILTER)
}

/// Initialize the tracing subscriber, using `default_filter` when RUST_LOG is unset
pub fn init_with_default(default_filter: &str) -> crate::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init()
        .map_err(|e| {
            crate::HydrateError::Other(format!("Failed to initialize tracing: {}", e))
        })?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init_with_default("debug");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_helper() {
        init_test();
        init_test();
    }

    #[test]
    fn test_second_init_fails() {
        init_test();
        assert!(init().is_err());
    }
}
