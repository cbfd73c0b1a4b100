pub mod events;
pub mod interceptor;
pub mod navigation;
pub mod progress;

pub use events::{EventBus, PageEventReceiver, next_event};
pub use interceptor::LoadingInterceptor;
pub use navigation::NavigationHub;
pub use progress::{LoadingProgress, ProgressSnapshot};

use pageload_core::{NavigationKind, PageEvent, PageLoadConfig};
use pageload_scheduler::Deferrer;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Page-load tracking wired together: navigation feeds the tracker, the interceptor feeds
/// it from the HTTP pipeline, and ready events go out on the bus.
#[derive(Clone)]
pub struct PageLoad {
    progress: LoadingProgress,
    interceptor: LoadingInterceptor,
    navigation: Arc<NavigationHub>,
    events: EventBus,
}

impl PageLoad {
    pub fn new(config: &PageLoadConfig, ticks: Arc<dyn Deferrer>) -> Self {
        let navigation = Arc::new(NavigationHub::new());
        let events = EventBus::new(config.channel_capacity());
        let progress = LoadingProgress::with_ready_event(
            Arc::clone(&navigation),
            events.clone(),
            ticks,
            config.ready_event.clone(),
        );

        if config.eager_init {
            progress.init();
        }

        Self {
            interceptor: LoadingInterceptor::new(progress.clone()),
            progress,
            navigation,
            events,
        }
    }

    pub fn progress(&self) -> &LoadingProgress {
        &self.progress
    }

    pub fn interceptor(&self) -> LoadingInterceptor {
        self.interceptor.clone()
    }

    pub fn navigation(&self) -> &Arc<NavigationHub> {
        &self.navigation
    }

    /// Forwards a host navigation. Returns how many handlers ran.
    pub fn navigate(&self, kind: NavigationKind) -> usize {
        self.navigation.emit(kind)
    }

    pub fn subscribe(&self) -> PageEventReceiver {
        self.events.subscribe()
    }

    /// Waits for the next ready event on `receiver`.
    pub async fn wait_ready(&self, receiver: &mut PageEventReceiver) -> Result<PageEvent, RecvError> {
        next_event(receiver, self.progress.ready_event()).await
    }
}
