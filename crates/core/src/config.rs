use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{PAGE_READY, PageLoadError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLoadConfig {
    /// Name of the event broadcast when a cycle settles
    pub ready_event: String,
    /// Buffer of the page event channel; slow subscribers lag past this
    pub event_capacity: usize,
    #[serde(rename = "request_timeout_ms", with = "millis")]
    pub request_timeout: Duration,
    /// Initialise the tracker while composing instead of on the first request
    pub eager_init: bool,
}

impl Default for PageLoadConfig {
    fn default() -> Self {
        Self {
            ready_event: PAGE_READY.to_string(),
            event_capacity: 16,
            request_timeout: Duration::from_millis(30000),
            eager_init: true,
        }
    }
}

impl PageLoadConfig {
    pub fn from_json(json: &str) -> Result<Self, PageLoadError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn with_ready_event(mut self, name: impl Into<String>) -> Self {
        self.ready_event = name.into();
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn with_request_timeout(mut self, ms: u64) -> Self {
        self.request_timeout = Duration::from_millis(ms);
        self
    }

    pub fn lazy(mut self) -> Self {
        self.eager_init = false;
        self
    }

    /// Broadcast channels reject a zero capacity.
    pub fn channel_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }

    pub fn fast() -> Self {
        Self {
            request_timeout: Duration::from_millis(10000),
            ..Self::default()
        }
    }

    pub fn patient() -> Self {
        Self {
            event_capacity: 64,
            request_timeout: Duration::from_millis(120000),
            ..Self::default()
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
