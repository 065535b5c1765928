//! Periodic background refresh of a collection view.
//!
//! The scheduler runs a single task that reloads the collection on a fixed
//! interval. At most one scheduled fetch is in flight at a time; ticks that
//! fire while a fetch is still running (or while paused) are skipped, never
//! queued. Disposing the scheduler stops the timer and abandons any fetch in
//! flight, so its result never reaches the controller.

use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use super::controller::{LoadOutcome, LoadTicket};
use super::field::Record;
use super::handle::ControllerHandle;
use super::source::CollectionSource;
use crate::error::{FetchError, ViewError};

/// Default period between refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// Not started
    Idle,
    /// Waiting for the next tick
    Scheduled,
    /// A scheduled fetch is in flight
    Fetching,
    /// Ticks are skipped until resumed
    Paused,
    Disposed,
}

/// Counters describing what the scheduler has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub fetches_started: u64,
    pub fetches_applied: u64,
    pub fetches_failed: u64,
    pub ticks_skipped: u64,
    pub results_discarded: u64,
}

#[derive(Default)]
struct Shared {
    stats: Mutex<RefreshStats>,
    paused: AtomicBool,
    fetching: AtomicBool,
    disposed: AtomicBool,
    stop: Notify,
}

type FetchFuture<R> = Pin<Box<dyn Future<Output = Result<Vec<R>, FetchError>> + Send>>;

struct InFlight<R> {
    ticket: LoadTicket,
    fetch: FetchFuture<R>,
}

/// Resolves when the in-flight fetch does; never resolves without one.
async fn in_flight_result<R>(
    in_flight: &mut Option<InFlight<R>>,
) -> (LoadTicket, Result<Vec<R>, FetchError>) {
    match in_flight {
        Some(flight) => {
            let result = flight.fetch.as_mut().await;
            (flight.ticket, result)
        }
        None => std::future::pending().await,
    }
}

/// Reloads a controller every `interval` until disposed.
pub struct RefreshScheduler {
    interval: Duration,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    /// Intervals under one second are raised to one second.
    pub fn new(interval: Duration) -> Self {
        let interval = if interval < MIN_REFRESH_INTERVAL {
            debug!(?interval, "refresh interval raised to minimum");
            MIN_REFRESH_INTERVAL
        } else {
            interval
        };
        Self {
            interval,
            shared: Arc::new(Shared::default()),
            task: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start refreshing `handle`. The first refresh happens one interval
    /// from now. Must be called inside a tokio runtime.
    ///
    /// Starting an already started or disposed scheduler does nothing.
    pub fn start<R, S>(&mut self, handle: ControllerHandle<R, S>)
    where
        R: Record,
        S: CollectionSource<R> + ?Sized + 'static,
    {
        if self.task.is_some() || self.shared.disposed.load(Ordering::SeqCst) {
            return;
        }
        let first_tick = Instant::now() + self.interval;
        debug!(interval = ?self.interval, "refresh scheduler started");
        self.task = Some(tokio::spawn(run(
            handle,
            Arc::clone(&self.shared),
            first_tick,
            self.interval,
        )));
    }

    /// Skip ticks until [`resume`](Self::resume). A fetch already in flight
    /// still completes.
    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
    }

    pub fn state(&self) -> RefreshState {
        let shared = &self.shared;
        if shared.disposed.load(Ordering::SeqCst) {
            RefreshState::Disposed
        } else if self.task.is_none() {
            RefreshState::Idle
        } else if shared.fetching.load(Ordering::SeqCst) {
            RefreshState::Fetching
        } else if shared.paused.load(Ordering::SeqCst) {
            RefreshState::Paused
        } else {
            RefreshState::Scheduled
        }
    }

    pub fn stats(&self) -> RefreshStats {
        *self.shared.stats.lock()
    }

    /// Stop refreshing. Idempotent.
    pub fn dispose(&self) {
        if !self.shared.disposed.swap(true, Ordering::SeqCst) {
            self.shared.stop.notify_one();
            debug!("refresh scheduler disposed");
        }
    }

    /// Dispose and wait for the background task to exit.
    pub async fn shutdown(&mut self) {
        self.dispose();
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                warn!(%error, "refresh task ended abnormally");
            }
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run<R, S>(
    handle: ControllerHandle<R, S>,
    shared: Arc<Shared>,
    first_tick: Instant,
    period: Duration,
) where
    R: Record,
    S: CollectionSource<R> + ?Sized + 'static,
{
    let mut ticks = time::interval_at(first_tick, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut in_flight: Option<InFlight<R>> = None;

    loop {
        tokio::select! {
            biased;

            _ = shared.stop.notified() => break,

            (ticket, result) = in_flight_result(&mut in_flight) => {
                in_flight = None;
                shared.fetching.store(false, Ordering::SeqCst);
                let mut stats = shared.stats.lock();
                match handle.complete_load(ticket, result) {
                    Ok(LoadOutcome::Applied { item_count }) => {
                        stats.fetches_applied += 1;
                        trace!(item_count, "scheduled refresh applied");
                    }
                    Ok(LoadOutcome::Discarded { sequence }) => {
                        stats.results_discarded += 1;
                        debug!(sequence, "scheduled refresh superseded");
                    }
                    Err(error) => {
                        stats.fetches_failed += 1;
                        warn!(%error, "scheduled refresh failed");
                    }
                }
            }

            _ = ticks.tick() => {
                if shared.paused.load(Ordering::SeqCst) || in_flight.is_some() {
                    shared.stats.lock().ticks_skipped += 1;
                    trace!(fetching = in_flight.is_some(), "refresh tick skipped");
                    continue;
                }
                match handle.begin_load() {
                    Ok(ticket) => {
                        let source = Arc::clone(handle.source());
                        in_flight = Some(InFlight {
                            ticket,
                            fetch: Box::pin(async move { source.fetch_collection().await }),
                        });
                        shared.fetching.store(true, Ordering::SeqCst);
                        shared.stats.lock().fetches_started += 1;
                    }
                    Err(ViewError::Disposed) => {
                        debug!("controller disposed, stopping refresh");
                        shared.disposed.store(true, Ordering::SeqCst);
                        break;
                    }
                    Err(error) => warn!(%error, "could not start scheduled refresh"),
                }
            }
        }
    }

    if let Some(flight) = in_flight.take() {
        handle.abandon_load(flight.ticket);
        shared.stats.lock().results_discarded += 1;
        debug!(sequence = flight.ticket.sequence(), "in-flight refresh abandoned");
    }
    shared.fetching.store(false, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{ticket_schema, tickets, ScriptedSource, Ticket};
    use crate::view::CollectionController;

    type Handle = ControllerHandle<Ticket, ScriptedSource<Ticket>>;

    fn handle(items: Vec<Ticket>) -> Handle {
        ControllerHandle::new(
            CollectionController::new(ticket_schema()),
            Arc::new(ScriptedSource::new(items)),
        )
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    async fn tick() {
        time::advance(DEFAULT_REFRESH_INTERVAL).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_refresh_per_interval() {
        let handle = handle(tickets(7));
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());
        settle().await;
        assert_eq!(handle.source().calls(), 0);
        assert_eq!(scheduler.state(), RefreshState::Scheduled);

        tick().await;
        assert_eq!(handle.source().calls(), 1);
        assert_eq!(handle.view().total_count, 7);

        tick().await;
        assert_eq!(handle.source().calls(), 2);
        assert_eq!(scheduler.stats().fetches_applied, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_before_first_tick() {
        let handle = handle(tickets(7));
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());
        scheduler.dispose();

        tick().await;
        tick().await;

        assert_eq!(handle.source().calls(), 0);
        assert_eq!(scheduler.state(), RefreshState::Disposed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_during_slow_fetch_is_skipped() {
        let handle = handle(tickets(4));
        let reply = handle.source().push_pending();
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());

        tick().await;
        assert_eq!(scheduler.state(), RefreshState::Fetching);
        assert!(handle.view().loading);

        tick().await;
        assert_eq!(handle.source().calls(), 1);
        assert_eq!(scheduler.stats().ticks_skipped, 1);

        reply.send(Ok(tickets(9))).unwrap();
        settle().await;
        assert_eq!(handle.view().total_count, 9);
        assert_eq!(scheduler.state(), RefreshState::Scheduled);

        tick().await;
        assert_eq!(handle.source().calls(), 2);
        assert_eq!(handle.view().total_count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_after_dispose_is_dropped() {
        let handle = handle(vec![]);
        let reply = handle.source().push_pending();
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());
        tick().await;
        assert!(handle.view().loading);

        scheduler.shutdown().await;
        // receiver is gone with the abandoned fetch
        assert!(reply.send(Ok(tickets(5))).is_err());
        settle().await;

        let view = handle.view();
        assert_eq!(view.total_count, 0);
        assert!(!view.loading);
        assert_eq!(scheduler.stats().results_discarded, 1);
        assert_eq!(scheduler.state(), RefreshState::Disposed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume() {
        let handle = handle(tickets(3));
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());
        scheduler.pause();
        assert_eq!(scheduler.state(), RefreshState::Paused);

        tick().await;
        assert_eq!(handle.source().calls(), 0);
        assert_eq!(scheduler.stats().ticks_skipped, 1);

        scheduler.resume();
        tick().await;
        assert_eq!(handle.source().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_data() {
        let handle = handle(tickets(6));
        handle.load().await.unwrap();
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());

        handle.source().set_fallback(Err(FetchError::new("unavailable").with_status(503)));
        tick().await;

        let view = handle.view();
        assert_eq!(view.total_count, 6);
        assert!(view.error.is_some());
        assert_eq!(scheduler.stats().fetches_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_controller_stops_scheduler() {
        let handle = handle(tickets(3));
        let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
        scheduler.start(handle.clone());
        handle.dispose();

        tick().await;

        assert_eq!(handle.source().calls(), 0);
        assert_eq!(scheduler.state(), RefreshState::Disposed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_refresh() {
        let handle = handle(tickets(3));
        {
            let mut scheduler = RefreshScheduler::new(DEFAULT_REFRESH_INTERVAL);
            scheduler.start(handle.clone());
        }
        tick().await;
        assert_eq!(handle.source().calls(), 0);
    }

    #[test]
    fn test_interval_floor() {
        let scheduler = RefreshScheduler::new(Duration::ZERO);
        assert_eq!(scheduler.interval(), Duration::from_secs(1));
        assert_eq!(scheduler.state(), RefreshState::Idle);
    }
}
