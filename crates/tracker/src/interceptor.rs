use pageload_core::{HttpInterceptor, HttpRejection, HttpResponse, RequestConfig};

use crate::progress::LoadingProgress;

/// Feeds the loading progress from an HTTP pipeline.
///
/// Outgoing requests are queued; responses and failures release their slot. Requests,
/// responses and rejections all pass through unchanged.
#[derive(Clone)]
pub struct LoadingInterceptor {
    progress: LoadingProgress,
}

impl LoadingInterceptor {
    pub fn new(progress: LoadingProgress) -> Self {
        Self { progress }
    }

    pub fn progress(&self) -> &LoadingProgress {
        &self.progress
    }
}

impl HttpInterceptor for LoadingInterceptor {
    fn request(&self, config: RequestConfig) -> Result<RequestConfig, HttpRejection> {
        if !self.progress.is_initialized() {
            self.progress.init();
        }

        self.progress.queue(Some(&config));
        Ok(config)
    }

    fn request_error(&self, rejection: HttpRejection) -> Result<RequestConfig, HttpRejection> {
        self.response_error(rejection).map(|response| response.config)
    }

    fn response(&self, response: HttpResponse) -> Result<HttpResponse, HttpRejection> {
        self.progress.dequeue(Some(&response.config));
        Ok(response)
    }

    fn response_error(&self, rejection: HttpRejection) -> Result<HttpResponse, HttpRejection> {
        self.progress.dequeue(rejection.config.as_ref());
        Err(rejection)
    }
}
