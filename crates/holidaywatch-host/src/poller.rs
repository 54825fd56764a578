//! The polling actor: one check cycle at a time, on a schedule or on demand.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use holidaywatch_core::{
    Clock, Evaluation, HolidayCatalog, HolidayRecord, HolidaySource, Notification,
    NotificationPolicy, normalize_rows,
};
use holidaywatch_store::NotifiedStore;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, Span, debug, info, warn};

/// Message used for the cycle-level warning when nothing could be fetched.
pub const NO_HOLIDAYS_MESSAGE: &str = "No holidays found or error occurred";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between scheduled cycles.
    pub interval: Duration,
    /// Delay before the one-shot cycle after startup.
    pub startup_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            startup_delay: Duration::from_secs(2),
        }
    }
}

/// What the presentation layer may read after a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSnapshot {
    /// The "today" the cycle ran against.
    pub checked_on: NaiveDate,
    pub catalog: HolidayCatalog,
    /// First holiday on or after `checked_on`.
    pub next: Option<HolidayRecord>,
}

/// Why a cycle started. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Scheduled,
    Manual,
}

/// Counts from one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub holidays: usize,
    pub evaluation: Evaluation,
}

/// Owns the notified store and drives fetch, normalise, classify, persist.
pub struct Poller {
    source: Arc<dyn HolidaySource>,
    store: NotifiedStore,
    clock: Arc<dyn Clock>,
    policy: NotificationPolicy,
    config: PollerConfig,
    snapshot: watch::Sender<Option<Arc<CycleSnapshot>>>,
    span: Span,
}

impl Poller {
    pub fn new(
        source: Arc<dyn HolidaySource>,
        store: NotifiedStore,
        clock: Arc<dyn Clock>,
        policy: NotificationPolicy,
        config: PollerConfig,
    ) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            source,
            store,
            clock,
            policy,
            config,
            snapshot,
            span: tracing::info_span!("poller"),
        }
    }

    /// Log under `span` instead of the default `poller` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn store(&self) -> &NotifiedStore {
        &self.store
    }

    /// Latest published snapshot; `None` until the first cycle completes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<CycleSnapshot>>> {
        self.snapshot.subscribe()
    }

    /// Run one full cycle, sending notifications to `events` as they are decided.
    pub async fn run_cycle(&mut self, events: &mpsc::UnboundedSender<Notification>) -> CycleReport {
        let span = self.span.clone();
        self.cycle(events).instrument(span).await
    }

    async fn cycle(&mut self, events: &mpsc::UnboundedSender<Notification>) -> CycleReport {
        let today = self.clock.today();
        info!(%today, "checking for holidays");

        let catalog = fetch_catalog(self.source.as_ref(), today).await;

        if catalog.is_empty() {
            warn!("{NO_HOLIDAYS_MESSAGE}");
            send(events, Notification::warning(NO_HOLIDAYS_MESSAGE));
        }

        let evaluation = self
            .policy
            .evaluate(&catalog, today, &mut self.store, |n| send(events, n));
        debug!(?evaluation, "notification policy evaluated");

        let report = CycleReport {
            holidays: catalog.len(),
            evaluation,
        };
        let next = catalog.upcoming(today).cloned();
        self.snapshot.send_replace(Some(Arc::new(CycleSnapshot {
            checked_on: today,
            catalog,
            next,
        })));
        report
    }

    /// Move the poller onto its own task.
    ///
    /// Cycles run on the configured interval, once shortly after startup,
    /// and whenever [`PollerHandle::check_now`] is called. The task ends
    /// when every handle has been dropped.
    pub fn spawn(self) -> (PollerHandle, mpsc::UnboundedReceiver<Notification>, JoinHandle<()>) {
        // Capacity 1: a request made while one is already pending is coalesced.
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = PollerHandle {
            trigger: trigger_tx,
            snapshot: self.subscribe(),
        };
        let span = self.span.clone();
        let task = tokio::spawn(self.run_loop(trigger_rx, events_tx).instrument(span));
        (handle, events_rx, task)
    }

    async fn run_loop(
        mut self,
        mut triggers: mpsc::Receiver<()>,
        events: mpsc::UnboundedSender<Notification>,
    ) {
        let startup = tokio::time::sleep(self.config.startup_delay);
        tokio::pin!(startup);
        let mut startup_pending = true;

        let period = self.config.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let trigger = tokio::select! {
                _ = &mut startup, if startup_pending => {
                    startup_pending = false;
                    Trigger::Startup
                }
                _ = ticker.tick() => Trigger::Scheduled,
                request = triggers.recv() => match request {
                    Some(()) => Trigger::Manual,
                    None => break,
                },
            };
            debug!(?trigger, "starting check cycle");
            let report = self.cycle(&events).await;
            info!(
                ?trigger,
                holidays = report.holidays,
                emitted = report.evaluation.emitted,
                "check cycle finished"
            );
        }
        info!("poller stopped");
    }
}

/// Fetch the current and next year for `today` and build the catalog.
///
/// The two fetches run concurrently; both must finish before the merge.
pub async fn fetch_catalog(source: &dyn HolidaySource, today: NaiveDate) -> HolidayCatalog {
    let current_year = today.year();
    let next_year = current_year + 1;

    let (current, next) = tokio::join!(
        source.fetch_year(current_year, current_year),
        source.fetch_year(next_year, current_year),
    );
    let catalog =
        HolidayCatalog::merge(normalize_rows(&current, today), normalize_rows(&next, today));
    info!(
        count = catalog.len(),
        current_year, next_year, "holiday catalog rebuilt"
    );
    catalog
}

fn send(events: &mpsc::UnboundedSender<Notification>, notification: Notification) {
    if events.send(notification).is_err() {
        debug!("notification receiver dropped");
    }
}

/// Collaborator-facing side of a spawned [`Poller`].
#[derive(Clone)]
pub struct PollerHandle {
    trigger: mpsc::Sender<()>,
    snapshot: watch::Receiver<Option<Arc<CycleSnapshot>>>,
}

impl PollerHandle {
    /// Request a cycle. Returns `false` if the poller has stopped.
    ///
    /// Requests made while one is already queued are merged into it.
    pub fn check_now(&self) -> bool {
        match self.trigger.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => true,
            Err(mpsc::error::TrySendError::Closed(())) => false,
        }
    }

    /// Latest snapshot, `None` before the first cycle completes.
    pub fn snapshot(&self) -> Option<Arc<CycleSnapshot>> {
        self.snapshot.borrow().clone()
    }

    /// Watch receiver that sees every published snapshot.
    pub fn snapshots(&self) -> watch::Receiver<Option<Arc<CycleSnapshot>>> {
        self.snapshot.clone()
    }
}
