use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::errors::CoreError;

/// Work run on every tick.
pub type RefreshCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

type CallbackSlot = Arc<RwLock<Option<RefreshCallback>>>;

/// Runs a refresh callback on a fixed period while the dashboard is mounted.
///
/// One interval timer per mount: swapping the callback replaces what the
/// next tick runs, it never recreates the timer. Each tick awaits its
/// callback before the next one is taken, and ticks that come due in the
/// meantime are skipped, so refreshes never overlap.
pub struct RefreshScheduler {
    period: Duration,
    callback: CallbackSlot,
    task: Option<JoinHandle<()>>,
    timers_created: Arc<AtomicUsize>,
    ticks: Arc<AtomicU64>,
}

impl RefreshScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            callback: Arc::new(RwLock::new(None)),
            task: None,
            timers_created: Arc::new(AtomicUsize::new(0)),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Replace the callback the next tick will run.
    pub fn set_callback<F, Fut>(&self, callback: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: RefreshCallback = Arc::new(move || callback().boxed());
        *self.callback.write().unwrap_or_else(|e| e.into_inner()) = Some(callback);
    }

    /// Start ticking with `callback`. The first tick fires one period from now.
    ///
    /// Mounting an already mounted scheduler only swaps the callback.
    /// Must be called from within a Tokio runtime.
    pub fn mount<F, Fut>(&mut self, callback: F) -> Result<(), CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.period.is_zero() {
            return Err(CoreError::Config("refresh period must be positive".into()));
        }
        self.set_callback(callback);
        if self.is_mounted() {
            return Ok(());
        }
        tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Config(format!("refresh scheduler needs a Tokio runtime: {e}")))?;

        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.timers_created.fetch_add(1, Ordering::SeqCst);

        let slot = Arc::clone(&self.callback);
        let ticks = Arc::clone(&self.ticks);
        self.task = Some(tokio::spawn(async move {
            loop {
                interval.tick().await;
                let callback = slot.read().unwrap_or_else(|e| e.into_inner()).clone();
                let n = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(tick = n, "portfolio refresh tick");
                if let Some(callback) = callback {
                    callback().await;
                }
            }
        }));
        info!(period_secs = self.period.as_secs_f64(), "refresh scheduler mounted");
        Ok(())
    }

    /// Stop ticking. Once this returns no further tick runs and no timer
    /// is left behind; a refresh in progress is cancelled.
    pub async fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            info!("refresh scheduler unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Interval timers created over this scheduler's lifetime.
    pub fn timers_created(&self) -> usize {
        self.timers_created.load(Ordering::SeqCst)
    }

    /// Ticks fired over this scheduler's lifetime.
    pub fn ticks_fired(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
