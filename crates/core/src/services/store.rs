use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::traits::PortfolioBackend;
use crate::errors::CoreError;
use crate::models::holding::{DecoratedHolding, Holding, HoldingId, HoldingPayload};
use crate::models::settings::StatsSource;
use crate::models::stats::PortfolioStats;
use crate::services::aggregator::PortfolioAggregator;

const FETCH_HOLDINGS_FAILED: &str = "Failed to fetch holdings";
const FETCH_STATS_FAILED: &str = "Failed to fetch portfolio stats";
const FETCH_PORTFOLIO_FAILED: &str = "Failed to fetch portfolio data";
const ADD_FAILED: &str = "Failed to add holding";
const DELETE_FAILED: &str = "Failed to delete holding";

/// Lifecycle of the cached portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Nothing requested yet
    Idle,
    /// A fetch or mutation is in flight
    Loading,
    /// Holdings and stats reflect the last successful fetch
    Ready,
    /// The last operation failed; previously loaded data is still there
    Error,
}

/// Point-in-time copy of everything the store holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub status: LoadStatus,
    pub holdings: Vec<Holding>,
    /// `None` until the first successful fetch
    pub stats: Option<PortfolioStats>,
    pub error: Option<String>,
}

impl StoreSnapshot {
    fn initial() -> Self {
        Self {
            status: LoadStatus::Idle,
            holdings: Vec::new(),
            stats: None,
            error: None,
        }
    }

    /// Resting status for the data held: `Ready` once anything was loaded.
    fn settled_status(&self) -> LoadStatus {
        if self.stats.is_some() {
            LoadStatus::Ready
        } else {
            LoadStatus::Idle
        }
    }
}

/// `{success, error}` view of an operation result, for UI callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl<T> From<&Result<T, CoreError>> for OperationOutcome {
    fn from(result: &Result<T, CoreError>) -> Self {
        match result {
            Ok(_) => Self {
                success: true,
                error: None,
            },
            Err(e) => Self {
                success: false,
                error: Some(e.user_message(&e.to_string())),
            },
        }
    }
}

/// In-memory cache of the user's holdings and portfolio stats.
///
/// Holdings and stats are only ever replaced together, from one complete
/// fetch, so they cannot disagree. Mutations are never patched in locally:
/// each one is followed by a full re-fetch. A failure keeps the previous
/// data and records a user-facing message instead.
///
/// Operations are serialized: a fetch and a mutation never interleave.
pub struct PortfolioStore {
    backend: Arc<dyn PortfolioBackend>,
    stats_source: StatsSource,
    aggregator: PortfolioAggregator,
    state: RwLock<StoreSnapshot>,
    op_lock: Mutex<()>,
}

impl PortfolioStore {
    pub fn new(backend: Arc<dyn PortfolioBackend>, stats_source: StatsSource) -> Self {
        Self {
            backend,
            stats_source,
            aggregator: PortfolioAggregator::new(),
            state: RwLock::new(StoreSnapshot::initial()),
            op_lock: Mutex::new(()),
        }
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Fetch holdings and stats concurrently and replace both at once.
    /// Fails if either request fails.
    pub async fn fetch_all(&self) -> Result<(), CoreError> {
        let _op = self.op_lock.lock().await;
        let loading = self.begin("fetch_all");
        match self.load().await {
            Ok((holdings, stats)) => {
                self.finish(loading, holdings, stats);
                Ok(())
            }
            Err(e) => Err(self.fail(loading, e)),
        }
    }

    /// Create a holding, then re-fetch the whole portfolio.
    ///
    /// Returns the created holding. If creation succeeded but the follow-up
    /// refresh failed, the call still succeeds (the holding exists on the
    /// server) while the store enters `Error` with the refresh message.
    pub async fn add(&self, payload: &HoldingPayload) -> Result<Holding, CoreError> {
        let _op = self.op_lock.lock().await;
        let loading = self.begin("add");
        let created = match self.backend.create_holding(payload).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail(loading, CoreError::transport(e, ADD_FAILED))),
        };
        info!(id = %created.id, coin = %created.coin, "holding created");
        self.refresh_after_mutation(loading).await;
        Ok(created)
    }

    /// Delete a holding, then re-fetch the whole portfolio.
    /// Refresh failures are handled as in [`PortfolioStore::add`].
    pub async fn delete(&self, id: &HoldingId) -> Result<(), CoreError> {
        let _op = self.op_lock.lock().await;
        let loading = self.begin("delete");
        if let Err(e) = self.backend.delete_holding(id).await {
            return Err(self.fail(loading, CoreError::transport(e, DELETE_FAILED)));
        }
        info!(%id, "holding deleted");
        self.refresh_after_mutation(loading).await;
        Ok(())
    }

    /// Forget the last error message.
    pub fn clear_error(&self) {
        let mut state = self.write();
        state.error = None;
        if state.status == LoadStatus::Error {
            state.status = state.settled_status();
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub fn snapshot(&self) -> StoreSnapshot {
        self.read().clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.read().status
    }

    pub fn is_loading(&self) -> bool {
        self.status() == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn holdings(&self) -> Vec<Holding> {
        self.read().holdings.clone()
    }

    pub fn stats(&self) -> Option<PortfolioStats> {
        self.read().stats
    }

    /// Holdings with current value and profit/loss attached.
    pub fn decorated_holdings(&self) -> Vec<DecoratedHolding> {
        self.aggregator.decorate_all(&self.read().holdings)
    }

    /// One holding with its valuation, for the detail view.
    pub fn holding(&self, id: &HoldingId) -> Result<DecoratedHolding, CoreError> {
        self.read()
            .holdings
            .iter()
            .find(|h| &h.id == id)
            .map(|h| self.aggregator.decorate(h))
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn load(&self) -> Result<(Vec<Holding>, PortfolioStats), CoreError> {
        match self.stats_source {
            StatsSource::Backend => {
                let (holdings, stats) =
                    tokio::join!(self.backend.list_holdings(), self.backend.portfolio_stats());
                match (holdings, stats) {
                    (Ok(holdings), Ok(stats)) => Ok((holdings, stats)),
                    (Err(e), Ok(_)) => Err(CoreError::transport(e, FETCH_HOLDINGS_FAILED)),
                    (Ok(_), Err(e)) => Err(CoreError::transport(e, FETCH_STATS_FAILED)),
                    (Err(e), Err(_)) => Err(CoreError::transport(e, FETCH_PORTFOLIO_FAILED)),
                }
            }
            StatsSource::Local => {
                let holdings = self
                    .backend
                    .list_holdings()
                    .await
                    .map_err(|e| CoreError::transport(e, FETCH_HOLDINGS_FAILED))?;
                let stats = self.aggregator.aggregate(&holdings);
                Ok((holdings, stats))
            }
        }
    }

    async fn refresh_after_mutation(&self, loading: Loading<'_>) {
        match self.load().await {
            Ok((holdings, stats)) => self.finish(loading, holdings, stats),
            Err(e) => {
                self.fail(loading, e);
            }
        }
    }

    /// Enter `Loading`. The returned guard must be handed to `finish` or
    /// `fail`; if the operation is dropped first, the guard settles the
    /// status back to `Ready` (or `Idle` without data).
    fn begin(&self, operation: &'static str) -> Loading<'_> {
        debug!(operation, backend = self.backend.name(), "portfolio store loading");
        let mut state = self.write();
        state.status = LoadStatus::Loading;
        state.error = None;
        Loading {
            state: &self.state,
            operation,
            armed: true,
        }
    }

    fn finish(&self, mut loading: Loading<'_>, holdings: Vec<Holding>, stats: PortfolioStats) {
        loading.armed = false;
        debug!(holdings = holdings.len(), "portfolio store ready");
        let mut state = self.write();
        state.holdings = holdings;
        state.stats = Some(stats);
        state.status = LoadStatus::Ready;
        state.error = None;
    }

    fn fail(&self, mut loading: Loading<'_>, error: CoreError) -> CoreError {
        loading.armed = false;
        let message = error.user_message(FETCH_PORTFOLIO_FAILED);
        warn!(%message, "portfolio store operation failed");
        let mut state = self.write();
        state.status = LoadStatus::Error;
        state.error = Some(message);
        error
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreSnapshot> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreSnapshot> {
        write_state(&self.state)
    }
}

fn write_state(state: &RwLock<StoreSnapshot>) -> RwLockWriteGuard<'_, StoreSnapshot> {
    state.write().unwrap_or_else(|e| e.into_inner())
}

/// Marks an operation in flight. Dropped while still armed (the operation
/// future was cancelled), it takes the store out of `Loading`.
struct Loading<'a> {
    state: &'a RwLock<StoreSnapshot>,
    operation: &'static str,
    armed: bool,
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = write_state(self.state);
        if state.status == LoadStatus::Loading {
            state.status = state.settled_status();
            debug!(operation = self.operation, status = ?state.status, "portfolio store operation cancelled");
        }
    }
}
