pub mod chain;
pub mod errors;
pub mod transport;

pub use chain::{Dispatch, InterceptorChain};
pub use errors::{from_reqwest, to_rejection};
pub use transport::{ReqwestTransport, Transport};

use futures::future::join_all;
use pageload_core::{HttpRejection, HttpResponse, PageLoadConfig, RequestConfig};

/// HTTP client whose every call passes through an interceptor chain.
pub struct TrackedClient<T: Transport = ReqwestTransport> {
    transport: T,
    chain: InterceptorChain,
}

impl TrackedClient<ReqwestTransport> {
    pub fn from_config(config: &PageLoadConfig, chain: InterceptorChain) -> reqwest::Result<Self> {
        Ok(Self::new(ReqwestTransport::new(config)?, chain))
    }
}

impl<T: Transport> TrackedClient<T> {
    pub fn new(transport: T, chain: InterceptorChain) -> Self {
        Self { transport, chain }
    }

    pub fn chain(&self) -> &InterceptorChain {
        &self.chain
    }

    /// A request refused during the request phase never reaches the transport. The
    /// interceptors that had already let it through still see it fail.
    pub async fn execute(&self, config: RequestConfig) -> Result<HttpResponse, HttpRejection> {
        let dispatch = self.chain.apply_request(config);
        let result = match &dispatch.outcome {
            Ok(config) => {
                tracing::trace!(method = %config.method, url = %config.url, "sending");
                self.transport.send(config).await
            }
            Err(rejection) => Err(rejection.clone()),
        };

        self.chain.apply_response(&dispatch, result)
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpRejection> {
        self.execute(RequestConfig::get(url)).await
    }

    /// Fetches every URL concurrently. Results keep the order of `urls`.
    pub async fn get_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<Result<HttpResponse, HttpRejection>> {
        join_all(urls.iter().map(|url| self.get(url.as_ref()))).await
    }
}
