use serde::{Deserialize, Serialize};

/// Portfolio-wide figures derived from the whole holdings set.
///
/// Never patched in place: it is always rebuilt from a complete holdings
/// list (or taken whole from the backend), so it cannot drift from it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioStats {
    /// Σ quantity × buy_price
    pub total_invested: f64,

    /// Σ quantity × current_price
    pub total_current_value: f64,

    /// total_current_value − total_invested
    pub total_profit_loss: f64,

    /// total_profit_loss / total_invested × 100, or 0 when nothing was invested
    #[serde(default)]
    pub total_profit_loss_percentage: f64,

    /// Number of holdings (rows), not distinct coins
    pub coin_count: usize,
}

impl PortfolioStats {
    /// All-zero stats of an empty portfolio.
    pub fn empty() -> Self {
        Self::default()
    }
}
