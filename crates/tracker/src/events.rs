use pageload_core::PageEvent;
use tokio::sync::broadcast;

pub type PageEventReceiver = broadcast::Receiver<PageEvent>;

/// Fan-out channel for page events. Every subscriber sees every event sent after it
/// subscribed.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PageEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> PageEventReceiver {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Returns how many subscribers the event reached. Zero is not an error.
    pub fn broadcast(&self, event: PageEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

/// Waits for the next event called `name`, skipping others.
///
/// Lagging only means older events were overwritten, so it keeps listening.
pub async fn next_event(
    receiver: &mut PageEventReceiver,
    name: &str,
) -> Result<PageEvent, broadcast::error::RecvError> {
    loop {
        match receiver.recv().await {
            Ok(event) if event.is(name) => return Ok(event),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "page event subscriber lagged");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn broadcast_without_subscribers_reaches_nobody() {
        let bus = EventBus::new(4);
        assert_eq!(bus.broadcast(PageEvent::new("event")), 0);
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_event() {
        let bus = EventBus::new(4);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = PageEvent::new("event").with_args(vec![json!({ "route": "/home" })]);
        assert_eq!(bus.broadcast(event.clone()), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn next_event_skips_other_names() {
        let bus = EventBus::new(4);
        let mut receiver = bus.subscribe();
        bus.broadcast(PageEvent::new("route:start"));
        bus.broadcast(PageEvent::new("pageload:ready"));

        let event = next_event(&mut receiver, "pageload:ready").await.unwrap();
        assert!(event.is("pageload:ready"));
    }

    #[tokio::test]
    async fn next_event_survives_lag() {
        let bus = EventBus::new(1);
        let mut receiver = bus.subscribe();
        bus.broadcast(PageEvent::new("noise"));
        bus.broadcast(PageEvent::new("noise"));
        bus.broadcast(PageEvent::new("pageload:ready"));

        let event = next_event(&mut receiver, "pageload:ready").await.unwrap();
        assert!(event.is("pageload:ready"));
    }
}
