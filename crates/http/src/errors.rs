use pageload_core::{HttpRejection, RejectionKind, RequestConfig};

/// Message-based fallback for errors that carry no typed cause. Prefer [`from_reqwest`]
/// for transport errors.
pub fn to_rejection(e: impl std::fmt::Display, config: &RequestConfig, action: &str) -> HttpRejection {
    let s = e.to_string();
    let rejection = if s.contains("timeout") || s.contains("timed out") {
        HttpRejection::timeout(format!("{} timed out: {}", action, s))
    } else if s.contains("connect") || s.contains("dns") || s.contains("connection") {
        HttpRejection::network(format!("{} could not reach {}: {}", action, config.url, s))
    } else {
        HttpRejection::new(RejectionKind::Unknown, format!("{} failed: {}", action, s))
    };
    rejection.with_config(config.clone())
}

/// Classifies with reqwest's own predicates, falling back to the message.
pub fn from_reqwest(e: reqwest::Error, config: &RequestConfig, action: &str) -> HttpRejection {
    if e.is_timeout() {
        HttpRejection::timeout(format!("{} timed out: {}", action, e)).with_config(config.clone())
    } else if let Some(status) = e.status() {
        HttpRejection::status(status.as_u16(), format!("{} failed: {}", action, e))
            .with_config(config.clone())
    } else if e.is_connect() || e.is_request() || e.is_body() {
        HttpRejection::network(format!("{} failed: {}", action, e)).with_config(config.clone())
    } else {
        to_rejection(e, config, action)
    }
}
