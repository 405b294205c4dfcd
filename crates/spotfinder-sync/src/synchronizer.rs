//! The per-view synchronizer task.
//!
//! [`mount`] spawns one task that owns the ranked list, the subscription
//! handle, and the [`MapProvider`]. Everything reaches it as a message: change
//! notifications from the feed callback, refresh results from the fetch task,
//! and [`ViewEvent`]s from the map layer. Nothing is shared, so nothing is
//! locked.
//!
//! Overlap policy: at most one refresh is in flight. Change notifications that
//! arrive while one is running start no fetch of their own; they mark the list
//! dirty, and a single trailing refresh runs once the current one completes.
//! The running fetch may have read the backend before the change landed.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use spotfinder_backend::{
    BackendError, ChangeCallback, ChangeFeed, LocationSource, PositionProvider, Subscription,
};
use spotfinder_core::{
    filter_by_query, rank_locations, sort_by_distance, AppConfig, Coordinate, LocationRecord,
    RankedLocation,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::guard::RefreshGuard;
use crate::position::{acquire_position, PositionSource};
use crate::state::SyncState;
use crate::view::{MapProvider, Notice, ViewEvent};
use crate::SyncError;

/// How a mounted view ranks and presents its list.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub position_timeout: Duration,
    pub fallback_origin: Coordinate,
    /// Free-text filter on name or address. Blank shows everything.
    pub query: Option<String>,
    pub sort_by_distance: bool,
}

impl SyncConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            position_timeout: Duration::from_millis(config.position_timeout_ms),
            fallback_origin: config.default_origin,
            query: None,
            sort_by_distance: true,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            position_timeout: Duration::from_secs(5),
            fallback_origin: Coordinate::new(19.076, 72.877),
            query: None,
            sort_by_distance: true,
        }
    }
}

/// Owner-side handle to a mounted view.
pub struct SyncHandle {
    events: mpsc::UnboundedSender<ViewEvent>,
    state: watch::Receiver<SyncState>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    #[must_use]
    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// A receiver that observes every state transition.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.clone()
    }

    /// Sender for the map layer to push [`ViewEvent`]s (marker clicks).
    #[must_use]
    pub fn event_sender(&self) -> mpsc::UnboundedSender<ViewEvent> {
        self.events.clone()
    }

    pub fn select(&self, id: impl Into<String>) {
        // A send error means the task already ended; selection is moot.
        let _ = self.events.send(ViewEvent::LocationSelected(id.into()));
    }

    /// Tear the view down and wait for the task to finish. In-flight work is
    /// discarded and the feed listener is detached before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TaskFailed`] if the view task panicked.
    pub async fn unmount(self) -> Result<(), SyncError> {
        let _ = self.events.send(ViewEvent::Unmount);
        self.task.await?;
        Ok(())
    }
}

/// Mount a view: spawn its synchronizer task and return the handle.
///
/// The task acquires a position first (falling back per `config`), centres
/// the map, attaches to `feed`, and runs the initial load. Must be called
/// from within a tokio runtime.
pub fn mount<S, F, P, M>(config: SyncConfig, source: S, feed: F, position: P, map: M) -> SyncHandle
where
    S: LocationSource,
    F: ChangeFeed,
    P: PositionProvider,
    M: MapProvider,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(SyncState::Idle);

    let view = ViewTask {
        source: Arc::new(source),
        map,
        state: state_tx,
        guard: RefreshGuard::new(),
        in_flight: None,
        dirty: false,
        origin: config.fallback_origin,
        list: None,
        selected: None,
        query: config.query.clone().unwrap_or_default(),
        sort_by_distance: config.sort_by_distance,
    };
    let task = tokio::spawn(view.run(config, feed, position, events_rx));

    SyncHandle {
        events: events_tx,
        state: state_rx,
        task,
    }
}

type RefreshResult = (u64, Result<Vec<LocationRecord>, BackendError>);

struct InFlight {
    seq: u64,
    task: JoinHandle<()>,
}

struct ViewTask<S, M> {
    source: Arc<S>,
    map: M,
    state: watch::Sender<SyncState>,
    guard: RefreshGuard,
    in_flight: Option<InFlight>,
    /// A change arrived while a refresh was in flight.
    dirty: bool,
    origin: Coordinate,
    list: Option<Vec<RankedLocation>>,
    selected: Option<String>,
    query: String,
    sort_by_distance: bool,
}

impl<S, M> ViewTask<S, M>
where
    S: LocationSource,
    M: MapProvider,
{
    async fn run<F, P>(
        mut self,
        config: SyncConfig,
        feed: F,
        position: P,
        mut events: mpsc::UnboundedReceiver<ViewEvent>,
    ) where
        F: ChangeFeed,
        P: PositionProvider,
    {
        let acquire = acquire_position(&position, config.position_timeout, config.fallback_origin);
        let Some(fix) = until_unmounted(&mut events, &mut self.selected, acquire).await else {
            self.tear_down(None::<F::Subscription>);
            return;
        };
        if let PositionSource::Fallback { reason } = fix.source {
            self.map.notify(&Notice::PositionUnavailable { reason });
        }
        self.origin = fix.coordinate;
        self.map.center_on(self.origin);

        let (changes_tx, mut changes) = mpsc::unbounded_channel::<()>();
        let on_change: ChangeCallback = Arc::new(move || {
            let _ = changes_tx.send(());
        });

        self.set_state(SyncState::Subscribing);
        let attach = feed.subscribe(on_change);
        let Some(attached) = until_unmounted(&mut events, &mut self.selected, attach).await else {
            self.tear_down(None::<F::Subscription>);
            return;
        };

        let subscription = match attached {
            Ok(subscription) => {
                tracing::info!(origin = %self.origin, "live availability attached");
                self.set_state(SyncState::Active);
                Some(subscription)
            }
            Err(e) => {
                tracing::warn!(error = %e, "change feed attach failed; loading once without live updates");
                self.map.notify(&Notice::SubscriptionFailed {
                    reason: e.to_string(),
                });
                self.set_state(SyncState::Idle);
                None
            }
        };
        let live = subscription.is_some();

        let (results_tx, mut results) = mpsc::unbounded_channel::<RefreshResult>();
        self.start_refresh(&results_tx, live);

        loop {
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(ViewEvent::LocationSelected(id)) => self.select(id),
                    Some(ViewEvent::Unmount) | None => break,
                },
                Some((seq, result)) = results.recv() => {
                    self.apply(seq, result, live);
                    if self.in_flight.is_none() && std::mem::take(&mut self.dirty) {
                        tracing::debug!("changes arrived mid-refresh; running trailing refresh");
                        self.start_refresh(&results_tx, live);
                    }
                }
                Some(()) = changes.recv(), if live => {
                    if let Some(in_flight) = &self.in_flight {
                        tracing::debug!(seq = in_flight.seq, "change notification coalesced; refresh already in flight");
                        self.dirty = true;
                    } else {
                        self.start_refresh(&results_tx, live);
                    }
                }
            }
        }

        self.tear_down(subscription);
    }

    fn set_state(&self, next: SyncState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "synchronizer state changed");
        }
    }

    fn start_refresh(&mut self, results: &mpsc::UnboundedSender<RefreshResult>, live: bool) {
        let seq = self.guard.issue();
        let source = Arc::clone(&self.source);
        let results = results.clone();
        let task = tokio::spawn(async move {
            let result = source.fetch_all_locations().await;
            // Receiver gone means the view tore down; the result is dropped.
            let _ = results.send((seq, result));
        });
        self.in_flight = Some(InFlight { seq, task });
        if live {
            self.set_state(SyncState::Refreshing);
        }
        tracing::debug!(seq, "refresh started");
    }

    fn apply(&mut self, seq: u64, result: Result<Vec<LocationRecord>, BackendError>, live: bool) {
        if self.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
            self.in_flight = None;
        }
        self.set_state(if live { SyncState::Active } else { SyncState::Idle });

        if !self.guard.accept(seq) {
            tracing::debug!(seq, last_applied = self.guard.last_applied(), "stale refresh discarded");
            return;
        }

        match result {
            Ok(records) => {
                let mut ranked = rank_locations(self.origin, &records);
                ranked = filter_by_query(ranked, &self.query);
                if self.sort_by_distance {
                    ranked = sort_by_distance(ranked);
                }
                tracing::debug!(seq, fetched = records.len(), shown = ranked.len(), "refresh applied");
                self.list = Some(ranked);
                self.render();
            }
            Err(e) => {
                let showing_stale = self.list.is_some();
                tracing::warn!(seq, error = %e, showing_stale, "location refresh failed");
                self.map.notify(&Notice::FetchFailed {
                    reason: e.to_string(),
                    showing_stale,
                });
                if !showing_stale {
                    self.list = Some(Vec::new());
                    self.render();
                }
            }
        }
    }

    fn select(&mut self, id: String) {
        tracing::debug!(location_id = %id, "location selected");
        self.selected = Some(id);
        self.render();
    }

    fn render(&mut self) {
        if let Some(list) = &self.list {
            self.map.render_markers(list, self.selected.as_deref());
        }
    }

    fn tear_down<Sub: Subscription>(&mut self, subscription: Option<Sub>) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
            tracing::debug!(seq = in_flight.seq, "in-flight refresh discarded");
        }
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        self.set_state(SyncState::TornDown);
        tracing::info!("view unmounted");
    }
}

/// Drive `work` to completion while still honouring view events. Returns
/// `None` if the view was unmounted first. Selections made meanwhile are
/// remembered for the first render.
async fn until_unmounted<T>(
    events: &mut mpsc::UnboundedReceiver<ViewEvent>,
    selected: &mut Option<String>,
    work: impl Future<Output = T>,
) -> Option<T> {
    tokio::pin!(work);
    loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(ViewEvent::LocationSelected(id)) => *selected = Some(id),
                Some(ViewEvent::Unmount) | None => return None,
            },
            output = &mut work => return Some(output),
        }
    }
}
