use async_trait::async_trait;
use pageload_core::{HttpRejection, HttpResponse, PageLoadConfig, RequestConfig};
use reqwest::{Client, Method};

use crate::errors::from_reqwest;

/// Sends one request over the wire. Non-2xx answers are rejections.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, config: &RequestConfig) -> Result<HttpResponse, HttpRejection>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &PageLoadConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, config: &RequestConfig) -> Result<HttpResponse, HttpRejection> {
        let method = Method::from_bytes(config.method.as_bytes()).map_err(|e| {
            HttpRejection::aborted(format!("invalid method {:?}: {}", config.method, e))
                .with_config(config.clone())
        })?;

        let mut builder = self.client.request(method, &config.url);
        for (name, value) in &config.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &config.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| from_reqwest(e, config, &config.method))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| from_reqwest(e, config, "read body"))?;

        if !status.is_success() {
            return Err(HttpRejection::status(
                status.as_u16(),
                format!("{} {} answered {}", config.method, config.url, status),
            )
            .with_config(config.clone()));
        }

        Ok(HttpResponse {
            config: config.clone(),
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
