use pageload_core::{NavigationKind, PAGE_READY, PageEvent, RequestConfig};
use pageload_scheduler::Deferrer;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::events::EventBus;
use crate::navigation::NavigationHub;

#[derive(Debug, Default)]
struct ProgressState {
    pending_requests: Vec<String>,
    ready: bool,
    initialized: bool,
}

/// Point-in-time copy of the tracker state, for loading indicators and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub pending_requests: Vec<String>,
    pub ready: bool,
    pub initialized: bool,
}

struct Inner {
    state: Mutex<ProgressState>,
    navigation: Arc<NavigationHub>,
    events: EventBus,
    ticks: Arc<dyn Deferrer>,
    ready_event: String,
    listening: AtomicBool,
}

/// Monitors the loading progress of HTTP GET requests within a navigation cycle.
///
/// Every GET is queued by URL when it leaves and dequeued when it completes, whether it
/// succeeded or not. Once the queue drains the tracker broadcasts the ready event, at most
/// once per cycle. A navigation starts a new cycle.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct LoadingProgress {
    inner: Arc<Inner>,
}

impl LoadingProgress {
    pub fn new(navigation: Arc<NavigationHub>, events: EventBus, ticks: Arc<dyn Deferrer>) -> Self {
        Self::with_ready_event(navigation, events, ticks, PAGE_READY)
    }

    pub fn with_ready_event(
        navigation: Arc<NavigationHub>,
        events: EventBus,
        ticks: Arc<dyn Deferrer>,
        ready_event: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ProgressState::default()),
                navigation,
                events,
                ticks,
                ready_event: ready_event.into(),
                listening: AtomicBool::new(false),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ProgressState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears the queue, marks the tracker initialized and starts listening for navigation.
    ///
    /// Navigation handlers are bound the first time only, so calling this again never
    /// makes a single navigation reset the tracker twice.
    pub fn init(&self) -> &Self {
        {
            let mut state = self.state();
            state.pending_requests.clear();
            state.ready = false;
            state.initialized = true;
        }

        if !self.inner.listening.swap(true, Ordering::SeqCst) {
            for kind in NavigationKind::ALL {
                let progress = Arc::downgrade(&self.inner);
                self.inner.navigation.on(kind, move |_| {
                    if let Some(inner) = Weak::upgrade(&progress) {
                        LoadingProgress { inner }.reset();
                    }
                });
            }
        }

        tracing::debug!("loading progress initialized");
        self
    }

    /// Empties the queue and starts a new cycle. Never notifies.
    pub fn reset(&self) -> &Self {
        let mut state = self.state();
        let dropped = state.pending_requests.len();
        state.pending_requests.clear();
        state.ready = false;
        tracing::debug!(dropped, "loading progress reset");
        self
    }

    /// Adds a GET request to the queue. Anything else is ignored, ready flag included.
    pub fn queue(&self, request: Option<&RequestConfig>) -> &Self {
        let Some(request) = request.filter(|r| r.is_tracked()) else {
            return self;
        };

        let mut state = self.state();
        state.pending_requests.push(request.url.clone());
        state.ready = false;
        tracing::debug!(url = %request.url, pending = state.pending_requests.len(), "queued");
        self
    }

    /// Removes the first queued entry for the request's URL, then checks on the next tick
    /// whether the queue has drained.
    ///
    /// The check is deferred so that several requests completing in the same batch
    /// produce a single notification after the last of them. A request that was never
    /// queued removes nothing but still schedules the check.
    pub fn dequeue(&self, request: Option<&RequestConfig>) -> &Self {
        {
            let mut state = self.state();
            let position = request.and_then(|r| {
                state
                    .pending_requests
                    .iter()
                    .position(|url| *url == r.url)
            });
            if let Some(index) = position {
                let url = state.pending_requests.remove(index);
                tracing::debug!(%url, pending = state.pending_requests.len(), "dequeued");
            }
        }

        let progress = Arc::downgrade(&self.inner);
        self.inner.ticks.defer(Box::new(move || {
            if let Some(inner) = Weak::upgrade(&progress) {
                LoadingProgress { inner }.settle();
            }
        }));
        self
    }

    fn settle(&self) {
        let settled = {
            let mut state = self.state();
            if state.pending_requests.is_empty() && !state.ready {
                state.ready = true;
                true
            } else {
                false
            }
        };

        if settled {
            let reached = self.notify(&self.inner.ready_event, Vec::new());
            tracing::info!(event = %self.inner.ready_event, subscribers = reached, "page ready");
        }
    }

    /// Broadcasts an event to every subscriber and returns how many it reached.
    pub fn notify(&self, name: &str, args: Vec<Value>) -> usize {
        self.inner
            .events
            .broadcast(PageEvent::new(name).with_args(args))
    }

    pub fn pending_requests(&self) -> Vec<String> {
        self.state().pending_requests.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state().ready
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn ready_event(&self) -> &str {
        &self.inner.ready_event
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let state = self.state();
        ProgressSnapshot {
            pending_requests: state.pending_requests.clone(),
            ready: state.ready,
            initialized: state.initialized,
        }
    }
}
