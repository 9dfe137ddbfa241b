// ═══════════════════════════════════════════════════════════════════
// Scheduler Tests — one timer per mount, no overlap, clean unmount
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use coin_portfolio_core::errors::CoreError;
use coin_portfolio_core::services::scheduler::RefreshScheduler;

const PERIOD: Duration = Duration::from_secs(10);

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// A callback that bumps `hits` once per run.
fn bump(hits: &Arc<AtomicUsize>) -> impl Fn() -> futures::future::Ready<()> + Send + Sync + 'static {
    let hits = Arc::clone(hits);
    move || {
        hits.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(())
    }
}

async fn wait(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

// ── Ticking ─────────────────────────────────────────────────────────

mod ticking {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let hits = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);
        scheduler.mount(bump(&hits)).unwrap();

        wait(9).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        wait(2).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let hits = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);
        scheduler.mount(bump(&hits)).unwrap();

        wait(35).await;
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.ticks_fired(), 3);
        assert!(scheduler.is_mounted());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_refreshes_never_overlap() {
        let running = counter();
        let peak = counter();
        let runs = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);
        scheduler
            .mount({
                let (running, peak, runs) = (running.clone(), peak.clone(), runs.clone());
                move || {
                    let (running, peak, runs) = (running.clone(), peak.clone(), runs.clone());
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(25)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            })
            .unwrap();

        wait(100).await;
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        // missed ticks are skipped rather than queued up
        assert!(runs.load(Ordering::SeqCst) <= 4);
        assert!(runs.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_set_before_mount_does_not_run() {
        let hits = counter();
        let scheduler = RefreshScheduler::new(PERIOD);
        scheduler.set_callback(bump(&hits));

        wait(50).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!scheduler.is_mounted());
    }
}

// ── Callback swaps & remounts ───────────────────────────────────────

mod swapping {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn swapped_callback_reuses_the_timer() {
        let first = counter();
        let second = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);

        scheduler.mount(bump(&first)).unwrap();
        wait(15).await;
        scheduler.mount(bump(&second)).unwrap();
        wait(10).await;

        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.timers_created(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn set_callback_while_mounted() {
        let first = counter();
        let second = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);
        scheduler.mount(bump(&first)).unwrap();

        for _ in 0..5 {
            scheduler.set_callback(bump(&second));
        }
        wait(21).await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.timers_created(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remount_after_unmount_starts_a_fresh_timer() {
        let hits = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);

        scheduler.mount(bump(&hits)).unwrap();
        scheduler.unmount().await;
        scheduler.mount(bump(&hits)).unwrap();
        wait(11).await;

        assert_eq!(scheduler.timers_created(), 2);
        // only the live timer ticks
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}

// ── Unmount ─────────────────────────────────────────────────────────

mod unmount {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn no_ticks_after_unmount() {
        let hits = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);
        scheduler.mount(bump(&hits)).unwrap();
        wait(15).await;

        scheduler.unmount().await;
        assert!(!scheduler.is_mounted());
        let fired = scheduler.ticks_fired();

        wait(100).await;
        assert_eq!(scheduler.ticks_fired(), fired);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_when_not_mounted_is_a_no_op() {
        let mut scheduler = RefreshScheduler::new(PERIOD);
        scheduler.unmount().await;
        scheduler.unmount().await;
        assert!(!scheduler.is_mounted());
        assert_eq!(scheduler.timers_created(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_stops_it() {
        let hits = counter();
        {
            let mut scheduler = RefreshScheduler::new(PERIOD);
            scheduler.mount(bump(&hits)).unwrap();
        }
        wait(50).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}

// ── Mount errors ────────────────────────────────────────────────────

mod errors {
    use super::*;

    #[test]
    fn mount_outside_a_runtime_fails() {
        let hits = counter();
        let mut scheduler = RefreshScheduler::new(PERIOD);
        let result = scheduler.mount(bump(&hits));
        assert!(matches!(result, Err(CoreError::Config(_))));
        assert_eq!(scheduler.timers_created(), 0);
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let hits = counter();
        let mut scheduler = RefreshScheduler::new(Duration::ZERO);
        assert!(matches!(
            scheduler.mount(bump(&hits)),
            Err(CoreError::Config(_))
        ));
        assert!(!scheduler.is_mounted());
    }
}
