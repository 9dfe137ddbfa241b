pub mod backend;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;

use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use tracing::warn;

use backend::http::HttpBackend;
use backend::traits::PortfolioBackend;
use errors::{CoreError, InputRejected};
use models::{
    coin::{CoinCatalog, CoinInfo, CoinSelection},
    draft::{AmountField, EntryDraft, EntryMode},
    holding::{DecoratedHolding, Holding, HoldingId},
    session::Session,
    settings::Settings,
    stats::PortfolioStats,
};
#[cfg(not(target_arch = "wasm32"))]
use services::scheduler::RefreshScheduler;
use services::{
    normalizer::HoldingNormalizer,
    reconciler::EntryReconciler,
    store::{PortfolioStore, StoreSnapshot},
};

/// Main entry point of the portfolio client core.
///
/// Ties the add-holding form logic (reconciliation, normalization, coin
/// catalog) to the portfolio store and its background refresh.
#[must_use]
pub struct CoinPortfolio {
    settings: Settings,
    catalog: CoinCatalog,
    store: Arc<PortfolioStore>,
    reconciler: EntryReconciler,
    normalizer: HoldingNormalizer,
    #[cfg(not(target_arch = "wasm32"))]
    scheduler: RefreshScheduler,
}

impl std::fmt::Debug for CoinPortfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.store.snapshot();
        f.debug_struct("CoinPortfolio")
            .field("api_base_url", &self.settings.api_base_url)
            .field("status", &snapshot.status)
            .field("holdings", &snapshot.holdings.len())
            .field("catalog_coins", &self.catalog.len())
            .finish()
    }
}

impl CoinPortfolio {
    /// Connect to the portfolio API as the user owning `session`.
    pub fn connect(settings: Settings, session: Session) -> Result<Self, CoreError> {
        let settings = settings.validated()?;
        let backend = HttpBackend::new(&settings, session)?;
        Self::with_backend(settings, Arc::new(backend))
    }

    /// Build on any backend implementation.
    pub fn with_backend(
        settings: Settings,
        backend: Arc<dyn PortfolioBackend>,
    ) -> Result<Self, CoreError> {
        let settings = settings.validated()?;
        Ok(Self {
            store: Arc::new(PortfolioStore::new(backend, settings.stats_source)),
            catalog: CoinCatalog::default(),
            reconciler: EntryReconciler::new(),
            normalizer: HoldingNormalizer::new(),
            #[cfg(not(target_arch = "wasm32"))]
            scheduler: RefreshScheduler::new(settings.poll_interval()),
            settings,
        })
    }

    /// Replace the built-in coin catalog.
    pub fn with_catalog(mut self, catalog: CoinCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &CoinCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<PortfolioStore> {
        &self.store
    }

    // ── Add-holding form ────────────────────────────────────────────

    /// A blank draft in the default currency, per-unit mode.
    pub fn open_draft(&self) -> EntryDraft {
        EntryDraft::new(self.settings.default_currency.as_str())
    }

    #[must_use]
    pub fn search_coins(&self, query: &str) -> Vec<&CoinInfo> {
        self.catalog.search(query)
    }

    /// Pick a catalog coin for the draft.
    pub fn select_coin(&self, draft: &mut EntryDraft, coin_id: &str) -> Result<(), CoreError> {
        let coin = self
            .catalog
            .get(coin_id)
            .ok_or_else(|| CoreError::NotFound(format!("coin {coin_id}")))?;
        draft.select_coin(CoinSelection::from(coin));
        Ok(())
    }

    /// Apply typed text to an amount field and refresh the derived figure.
    pub fn set_amount(
        &self,
        draft: &mut EntryDraft,
        field: AmountField,
        raw: &str,
    ) -> Result<(), InputRejected> {
        self.reconciler.set_amount(draft, field, raw)
    }

    pub fn switch_mode(&self, draft: &mut EntryDraft, mode: EntryMode) {
        *draft = self.reconciler.switch_mode(std::mem::take(draft), mode);
    }

    /// Validate the draft and, if it passes, record the holding.
    ///
    /// Validation failures stay on the draft (and come back as
    /// `CoreError::Validation`) without touching the backend. On success
    /// the draft is reset for the next entry.
    pub async fn submit_draft(&self, draft: &mut EntryDraft) -> Result<Holding, CoreError> {
        let payload = self.normalizer.submit(draft, &self.catalog)?;
        let created = self.store.add(&payload).await?;
        draft.reset();
        Ok(created)
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Re-fetch holdings and stats.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.store.fetch_all().await
    }

    pub async fn delete_holding(&self, id: &HoldingId) -> Result<(), CoreError> {
        self.store.delete(id).await
    }

    #[must_use]
    pub fn holdings(&self) -> Vec<DecoratedHolding> {
        self.store.decorated_holdings()
    }

    pub fn holding(&self, id: &HoldingId) -> Result<DecoratedHolding, CoreError> {
        self.store.holding(id)
    }

    #[must_use]
    pub fn stats(&self) -> Option<PortfolioStats> {
        self.store.stats()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    // ── Background refresh (native only) ────────────────────────────

    /// Initial fetch plus periodic refresh, as when the dashboard opens.
    /// Polling starts even if the first fetch fails.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn open_dashboard(&mut self) -> Result<(), CoreError> {
        let initial = self.refresh().await;
        self.start_polling()?;
        initial
    }

    /// Refresh the store every `poll_interval_secs`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start_polling(&mut self) -> Result<(), CoreError> {
        let store = Arc::clone(&self.store);
        self.scheduler.mount(move || {
            let store = Arc::clone(&store);
            async move {
                if let Err(e) = store.fetch_all().await {
                    warn!(error = %e, "background portfolio refresh failed");
                }
            }
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn stop_polling(&mut self) {
        self.scheduler.unmount().await;
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_mounted()
    }

    /// End the session: stop polling and drop the backend with its credential.
    #[cfg_attr(target_arch = "wasm32", allow(unused_mut))]
    pub async fn logout(mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        self.stop_polling().await;
        tracing::info!("portfolio session closed");
    }
}
