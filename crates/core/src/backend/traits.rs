use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingId, HoldingPayload};
use crate::models::stats::PortfolioStats;

/// Contract the portfolio store needs from the remote source of truth.
///
/// The HTTP client implements it for the real API; tests plug in
/// in-memory doubles. Every call is assumed to carry the session's bearer
/// credential.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PortfolioBackend: Send + Sync {
    /// Human-readable name of this backend (for logs).
    fn name(&self) -> &str;

    /// All holdings of the logged-in user, each with its current price.
    async fn list_holdings(&self) -> Result<Vec<Holding>, CoreError>;

    /// Portfolio-wide stats as computed by the backend.
    async fn portfolio_stats(&self) -> Result<PortfolioStats, CoreError>;

    /// Record a new holding and return it as stored.
    async fn create_holding(&self, payload: &HoldingPayload) -> Result<Holding, CoreError>;

    /// Remove a holding.
    async fn delete_holding(&self, id: &HoldingId) -> Result<(), CoreError>;
}
