//! Logging setup.
//!
//! Installs a `tracing-subscriber` fmt subscriber filtered by `RUST_LOG`,
//! falling back to the given directive when `RUST_LOG` is unset or invalid.
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! custom_resource_runtime::telemetry::init_tracing("info")?;
//! # Ok(())
//! # }
//! ```

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Output carries no ANSI colouring, timestamps, or targets; the invocation
/// runtime's log collector stamps each line.
///
/// # Errors
///
/// Returns error if a global subscriber is already installed.
pub fn init_tracing(
    default_directive: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Whichever call comes first may win; the other must report an error
        let first = init_tracing("debug");
        let second = init_tracing("debug");
        assert!(first.is_err() || second.is_err());
    }
}
