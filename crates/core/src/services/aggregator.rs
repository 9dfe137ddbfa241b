use crate::models::holding::{DecoratedHolding, Holding, Trend};
use crate::models::stats::PortfolioStats;

/// Computes valuation figures for single holdings and for the whole set.
///
/// Only arithmetic: current prices arrive already attached to each holding.
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Attach current value and profit/loss to a holding.
    ///
    /// A holding without a market price is valued at its buy price, so it
    /// shows no gain or loss rather than a total loss.
    pub fn decorate(&self, holding: &Holding) -> DecoratedHolding {
        let total_invested = holding.invested();
        let (price, price_available) = match holding.current_price {
            Some(p) if p.is_finite() => (p, true),
            _ => (holding.buy_price, false),
        };
        let current_value = holding.quantity * price;
        let profit_loss = current_value - total_invested;

        DecoratedHolding {
            holding: holding.clone(),
            total_invested,
            current_value,
            profit_loss,
            profit_loss_percentage: percentage(profit_loss, total_invested),
            trend: trend(profit_loss),
            price_available,
        }
    }

    pub fn decorate_all(&self, holdings: &[Holding]) -> Vec<DecoratedHolding> {
        holdings.iter().map(|h| self.decorate(h)).collect()
    }

    /// Portfolio totals, rebuilt from scratch over `holdings`.
    /// An empty set yields all-zero stats.
    pub fn aggregate(&self, holdings: &[Holding]) -> PortfolioStats {
        let (total_invested, total_current_value) =
            holdings
                .iter()
                .map(|h| self.decorate(h))
                .fold((0.0, 0.0), |(invested, value), d| {
                    (invested + d.total_invested, value + d.current_value)
                });
        let total_profit_loss = total_current_value - total_invested;

        PortfolioStats {
            total_invested,
            total_current_value,
            total_profit_loss,
            total_profit_loss_percentage: percentage(total_profit_loss, total_invested),
            coin_count: holdings.len(),
        }
    }
}

impl Default for PortfolioAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// profit_loss as a percentage of what was invested; 0 when nothing was.
fn percentage(profit_loss: f64, invested: f64) -> f64 {
    if invested > 0.0 {
        (profit_loss / invested) * 100.0
    } else {
        0.0
    }
}

fn trend(profit_loss: f64) -> Trend {
    if profit_loss > f64::EPSILON {
        Trend::Gain
    } else if profit_loss < -f64::EPSILON {
        Trend::Loss
    } else {
        Trend::Flat
    }
}
