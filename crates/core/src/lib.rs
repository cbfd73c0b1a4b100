use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::PageLoadConfig;

/// Event broadcast once every tracked GET request of a navigation cycle has completed.
pub const PAGE_READY: &str = "pageload:ready";

/// The only method the progress tracker counts. Matched case-sensitively.
pub const TRACKED_METHOD: &str = "GET";

/// Outgoing request descriptor as seen by the interceptor pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Option<String>,
}

impl RequestConfig {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(TRACKED_METHOD, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Exact match, so `"get"` is not tracked.
    pub fn is_tracked(&self) -> bool {
        self.method == TRACKED_METHOD
    }
}

/// A completed response together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub config: RequestConfig,
    pub status: u16,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: String,
}

impl HttpResponse {
    pub fn new(config: RequestConfig, status: u16, body: impl Into<String>) -> Self {
        Self {
            config,
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Why a request failed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RejectionKind {
    /// Connection refused, DNS failure, broken stream
    Network,
    /// Transport gave up waiting
    Timeout,
    /// Server answered with an error status
    Status,
    /// An interceptor refused to let the request through
    Aborted,
    Unknown,
}

/// A failed request travelling through the interceptor chain.
///
/// `config` is the original outgoing descriptor when one exists. A rejection raised
/// before any descriptor was built carries `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{kind:?}] {message}")]
pub struct HttpRejection {
    pub kind: RejectionKind,
    pub config: Option<RequestConfig>,
    pub status: Option<u16>,
    pub message: String,
}

impl HttpRejection {
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            config: None,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    // Convenience constructors
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(RejectionKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(RejectionKind::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(RejectionKind::Status, message).with_status(code)
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(RejectionKind::Aborted, message)
    }
}

#[derive(Debug, Error)]
pub enum PageLoadError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("tick scheduler is no longer running")]
    SchedulerClosed,
}

/// Host navigation notifications that start a new loading cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// The active route was replaced
    RouteChange,
    /// Same route, new parameters or search string
    RouteUpdate,
}

impl NavigationKind {
    pub const ALL: [NavigationKind; 2] = [NavigationKind::RouteChange, NavigationKind::RouteUpdate];
}

/// A named event with an arbitrary payload, delivered to every subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEvent {
    pub name: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl PageEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<serde_json::Value>) -> Self {
        self.args = args;
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Hooks invoked by an HTTP pipeline around every transport operation.
///
/// Every hook defaults to passing its input through untouched, so implementors only
/// override what they observe. Returning `Err` from `request` or `response` turns the
/// call into a failure for the hooks that follow.
pub trait HttpInterceptor: Send + Sync {
    fn request(&self, config: RequestConfig) -> Result<RequestConfig, HttpRejection> {
        Ok(config)
    }

    fn request_error(&self, rejection: HttpRejection) -> Result<RequestConfig, HttpRejection> {
        Err(rejection)
    }

    fn response(&self, response: HttpResponse) -> Result<HttpResponse, HttpRejection> {
        Ok(response)
    }

    fn response_error(&self, rejection: HttpRejection) -> Result<HttpResponse, HttpRejection> {
        Err(rejection)
    }
}
