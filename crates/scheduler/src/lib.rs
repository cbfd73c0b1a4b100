use pageload_core::PageLoadError;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;

/// Work deferred until the current synchronous batch has finished.
pub type Tick = Box<dyn FnOnce() + Send + 'static>;

pub type TickReceiver = mpsc::UnboundedReceiver<Tick>;

/// Posts zero-delay callbacks onto an event loop.
pub trait Deferrer: Send + Sync {
    fn defer(&self, tick: Tick);
}

/// Event-loop backed deferrer. Ticks posted here run on the task driving [`TickScheduler::run`],
/// in the order they were posted.
#[derive(Clone)]
pub struct TickScheduler {
    sender: mpsc::UnboundedSender<Tick>,
}

impl TickScheduler {
    pub fn new() -> (Self, TickReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }

    pub fn try_defer(&self, tick: Tick) -> Result<(), PageLoadError> {
        self.sender
            .send(tick)
            .map_err(|_| PageLoadError::SchedulerClosed)
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Drives deferred ticks until every scheduler handle is dropped.
    pub async fn run(mut receiver: TickReceiver) {
        while let Some(tick) = receiver.recv().await {
            // Let the task that posted the tick finish its current batch first.
            tokio::task::yield_now().await;

            tick();
            let mut ran = 1usize;
            while let Ok(next) = receiver.try_recv() {
                next();
                ran += 1;
            }
            tracing::trace!(ran, "tick batch complete");
        }
    }
}

impl Deferrer for TickScheduler {
    fn defer(&self, tick: Tick) {
        if let Err(err) = self.try_defer(tick) {
            tracing::warn!(error = %err, "dropping deferred tick");
        }
    }
}

/// Deferrer that only runs ticks when told to.
///
/// Embedders without an async runtime flush it from their own loop; tests use it to
/// step through ticks deterministically.
#[derive(Default)]
pub struct ManualTicks {
    queue: Mutex<VecDeque<Tick>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Runs queued ticks, including any posted while flushing. Returns how many ran.
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match next {
                Some(tick) => {
                    tick();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl Deferrer for ManualTicks {
    fn defer(&self, tick: Tick) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(tick);
    }
}
