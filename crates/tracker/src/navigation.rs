use pageload_core::NavigationKind;
use std::sync::{Arc, Mutex, PoisonError};

pub type NavigationHandler = Arc<dyn Fn(NavigationKind) + Send + Sync>;

/// Route-change notifications from the host router.
#[derive(Default)]
pub struct NavigationHub {
    handlers: Mutex<Vec<(NavigationKind, NavigationHandler)>>,
}

impl NavigationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, kind: NavigationKind, handler: F)
    where
        F: Fn(NavigationKind) + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, Arc::new(handler)));
    }

    /// Calls every handler bound to `kind` and returns how many ran.
    pub fn emit(&self, kind: NavigationKind) -> usize {
        // Handlers may register more handlers, so don't hold the lock while calling them.
        let matching: Vec<NavigationHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(bound, _)| *bound == kind)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::debug!(?kind, handlers = matching.len(), "navigation");
        for handler in &matching {
            handler(kind);
        }
        matching.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
