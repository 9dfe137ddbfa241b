// ═══════════════════════════════════════════════════════════════════
// Shared test helpers — in-memory backend and holding builders
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use coin_portfolio_core::backend::traits::PortfolioBackend;
use coin_portfolio_core::errors::CoreError;
use coin_portfolio_core::models::holding::{Holding, HoldingId, HoldingPayload};
use coin_portfolio_core::models::stats::PortfolioStats;

/// Backend operations a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Stats,
    Create,
    Delete,
}

/// How a failing operation fails.
#[derive(Debug, Clone)]
pub enum Failure {
    Api { status: u16, detail: Option<String> },
    Network,
}

impl Failure {
    fn to_error(&self) -> CoreError {
        match self {
            Failure::Api { status, detail } => CoreError::Api {
                status: *status,
                detail: detail.clone(),
            },
            Failure::Network => CoreError::Network("connection refused".into()),
        }
    }
}

/// In-memory stand-in for the portfolio API.
///
/// Prices come from a per-coin table; stats are computed server-side the
/// way the real backend does.
pub struct MockBackend {
    holdings: Mutex<Vec<Holding>>,
    prices: Mutex<HashMap<String, f64>>,
    failures: Mutex<HashMap<Op, Failure>>,
    delay: Mutex<Option<Duration>>,
    next_id: AtomicI64,
    pub list_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        let mut prices = HashMap::new();
        prices.insert("bitcoin".to_string(), 150.0);
        prices.insert("ethereum".to_string(), 20.0);
        prices.insert("solana".to_string(), 5.0);
        Self {
            holdings: Mutex::new(Vec::new()),
            prices: Mutex::new(prices),
            failures: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            next_id: AtomicI64::new(1),
            list_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_holdings(holdings: Vec<Holding>) -> Self {
        let backend = Self::new();
        let max_id = holdings
            .iter()
            .filter_map(|h| h.id.as_str().parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        backend.next_id.store(max_id + 1, Ordering::SeqCst);
        *backend.holdings.lock().unwrap() = holdings;
        backend
    }

    pub fn fail(&self, op: Op, failure: Failure) {
        self.failures.lock().unwrap().insert(op, failure);
    }

    pub fn recover(&self, op: Op) {
        self.failures.lock().unwrap().remove(&op);
    }

    pub fn set_price(&self, coin: &str, price: f64) {
        self.prices.lock().unwrap().insert(coin.to_string(), price);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn stored(&self) -> Vec<Holding> {
        self.holdings.lock().unwrap().clone()
    }

    fn check(&self, op: Op) -> Result<(), CoreError> {
        match self.failures.lock().unwrap().get(&op) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn priced(&self) -> Vec<Holding> {
        let prices = self.prices.lock().unwrap();
        self.holdings
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|mut h| {
                h.current_price = prices.get(&h.coin).copied();
                h
            })
            .collect()
    }
}

#[async_trait]
impl PortfolioBackend for MockBackend {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn list_holdings(&self) -> Result<Vec<Holding>, CoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check(Op::List)?;
        Ok(self.priced())
    }

    async fn portfolio_stats(&self) -> Result<PortfolioStats, CoreError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.check(Op::Stats)?;
        let holdings = self.priced();
        let invested: f64 = holdings.iter().map(|h| h.quantity * h.buy_price).sum();
        let value: f64 = holdings
            .iter()
            .map(|h| h.quantity * h.current_price.unwrap_or(h.buy_price))
            .sum();
        Ok(PortfolioStats {
            total_invested: invested,
            total_current_value: value,
            total_profit_loss: value - invested,
            total_profit_loss_percentage: if invested > 0.0 {
                (value - invested) / invested * 100.0
            } else {
                0.0
            },
            coin_count: holdings.len(),
        })
    }

    async fn create_holding(&self, payload: &HoldingPayload) -> Result<Holding, CoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Op::Create)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let holding = Holding {
            id: HoldingId::from(id),
            coin: payload.coin.clone(),
            coin_symbol: payload.coin_symbol.clone(),
            quantity: payload.quantity,
            buy_price: payload.buy_price,
            currency: payload.currency.clone(),
            current_price: None,
            icon_url: None,
            notes: payload.notes.clone(),
            created_at: Utc::now(),
        };
        self.holdings.lock().unwrap().push(holding.clone());
        Ok(holding)
    }

    async fn delete_holding(&self, id: &HoldingId) -> Result<(), CoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check(Op::Delete)?;
        let mut holdings = self.holdings.lock().unwrap();
        let before = holdings.len();
        holdings.retain(|h| &h.id != id);
        if holdings.len() == before {
            return Err(CoreError::Api {
                status: 404,
                detail: Some("Holding not found".into()),
            });
        }
        Ok(())
    }
}

/// A stored holding (no current price attached).
pub fn holding(id: i64, coin: &str, symbol: &str, quantity: f64, buy_price: f64) -> Holding {
    Holding {
        id: HoldingId::from(id),
        coin: coin.to_string(),
        coin_symbol: symbol.to_string(),
        quantity,
        buy_price,
        currency: "php".to_string(),
        current_price: None,
        icon_url: None,
        notes: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap(),
    }
}

/// A holding as the backend returns it, with a market price.
pub fn priced(id: i64, coin: &str, quantity: f64, buy_price: f64, current: f64) -> Holding {
    Holding {
        current_price: Some(current),
        ..holding(id, coin, &coin[..3].to_uppercase(), quantity, buy_price)
    }
}

pub fn payload(coin: &str, symbol: &str, quantity: f64, buy_price: f64) -> HoldingPayload {
    HoldingPayload {
        coin: coin.to_string(),
        coin_symbol: symbol.to_string(),
        quantity,
        buy_price,
        currency: "php".to_string(),
        notes: None,
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * b.abs().max(1.0)
}

