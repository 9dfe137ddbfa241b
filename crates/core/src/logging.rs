use tracing_subscriber::EnvFilter;

use crate::errors::CoreError;

/// Install a formatted `tracing` subscriber for the host application.
///
/// `RUST_LOG` overrides `default_filter` (e.g. `"coin_portfolio_core=debug"`).
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> Result<bool, CoreError> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => EnvFilter::try_new(from_env),
        _ => EnvFilter::try_new(default_filter),
    }
    .map_err(|e| CoreError::Config(format!("invalid log filter: {e}")))?;

    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}
