use pageload_core::{HttpInterceptor, HttpRejection, HttpResponse, RequestConfig};
use std::sync::Arc;

/// Result of the request phase.
///
/// Keeps the interceptors that let the request through, so the response phase unwinds
/// only those.
#[derive(Debug)]
pub struct Dispatch {
    pub outcome: Result<RequestConfig, HttpRejection>,
    accepted: Vec<usize>,
}

impl Dispatch {
    pub fn accepted(&self) -> usize {
        self.accepted.len()
    }
}

/// Ordered interceptors around a transport.
///
/// Request hooks run in registration order and response hooks in reverse, so the first
/// interceptor registered is the outermost layer. A request refused by one interceptor
/// reaches the `request_error` hook of every interceptor after it, and the response phase
/// then unwinds only the interceptors whose request phase succeeded. No interceptor sees
/// both `request_error` and `response_error` for the same failure.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: Arc<dyn HttpInterceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn with<I: HttpInterceptor + 'static>(mut self, interceptor: I) -> Self {
        self.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn apply_request(&self, config: RequestConfig) -> Dispatch {
        let mut outcome = Ok(config);
        let mut accepted = Vec::new();
        let mut entered = None;

        for (index, interceptor) in self.interceptors.iter().enumerate() {
            outcome = match outcome {
                Ok(config) => {
                    entered = Some(config.clone());
                    interceptor.request(config)
                }
                Err(rejection) => interceptor.request_error(rejection),
            };
            if outcome.is_ok() {
                accepted.push(index);
            }
        }

        // Later request_error hooks see the rejection as raised; the caller and the
        // response phase get the descriptor that was refused.
        if let (Err(rejection), Some(entered)) = (&mut outcome, entered) {
            rejection.config.get_or_insert(entered);
        }

        Dispatch { outcome, accepted }
    }

    pub fn apply_response(
        &self,
        dispatch: &Dispatch,
        result: Result<HttpResponse, HttpRejection>,
    ) -> Result<HttpResponse, HttpRejection> {
        let mut result = result;
        if let (Err(rejection), Ok(config)) = (&mut result, &dispatch.outcome) {
            rejection.config.get_or_insert_with(|| config.clone());
        }

        for &index in dispatch.accepted.iter().rev() {
            let interceptor = &self.interceptors[index];
            result = match result {
                Ok(response) => interceptor.response(response),
                Err(rejection) => interceptor.response_error(rejection),
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl HttpInterceptor for Recording {
        fn request(&self, config: RequestConfig) -> Result<RequestConfig, HttpRejection> {
            self.log.lock().unwrap().push(format!("{}:request", self.name));
            Ok(config)
        }

        fn request_error(&self, rejection: HttpRejection) -> Result<RequestConfig, HttpRejection> {
            self.log.lock().unwrap().push(format!("{}:request_error", self.name));
            Err(rejection)
        }

        fn response(&self, response: HttpResponse) -> Result<HttpResponse, HttpRejection> {
            self.log.lock().unwrap().push(format!("{}:response", self.name));
            Ok(response)
        }

        fn response_error(&self, rejection: HttpRejection) -> Result<HttpResponse, HttpRejection> {
            self.log.lock().unwrap().push(format!("{}:response_error", self.name));
            Err(rejection)
        }
    }

    struct Refuse;

    impl HttpInterceptor for Refuse {
        fn request(&self, _config: RequestConfig) -> Result<RequestConfig, HttpRejection> {
            Err(HttpRejection::aborted("refused"))
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Recording {
        Recording {
            name,
            log: Arc::clone(log),
        }
    }

    #[test]
    fn responses_unwind_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptorChain::new()
            .with(recording("outer", &log))
            .with(recording("inner", &log));

        let dispatch = chain.apply_request(RequestConfig::get("api/hello"));
        let config = dispatch.outcome.clone().unwrap();
        chain
            .apply_response(&dispatch, Ok(HttpResponse::new(config, 200, "")))
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["outer:request", "inner:request", "inner:response", "outer:response"]
        );
    }

    #[test]
    fn request_failure_reaches_later_error_hooks_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = InterceptorChain::new()
            .with(recording("before", &log))
            .with(Refuse)
            .with(recording("after", &log));

        let dispatch = chain.apply_request(RequestConfig::get("api/hello"));
        assert_eq!(dispatch.accepted(), 1);
        let rejection = dispatch.outcome.clone().unwrap_err();
        assert_eq!(rejection.config, Some(RequestConfig::get("api/hello")));

        let result = chain.apply_response(&dispatch, Err(rejection));
        assert!(result.is_err());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["before:request", "after:request_error", "before:response_error"]
        );
    }

    #[test]
    fn later_error_hooks_see_the_rejection_as_raised() {
        struct Inspect(Arc<Mutex<Option<Option<RequestConfig>>>>);

        impl HttpInterceptor for Inspect {
            fn request_error(&self, rejection: HttpRejection) -> Result<RequestConfig, HttpRejection> {
                *self.0.lock().unwrap() = Some(rejection.config.clone());
                Err(rejection)
            }
        }

        let seen = Arc::new(Mutex::new(None));
        let chain = InterceptorChain::new()
            .with(Refuse)
            .with(Inspect(Arc::clone(&seen)));

        chain.apply_request(RequestConfig::get("api/hello"));
        assert_eq!(*seen.lock().unwrap(), Some(None));
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = InterceptorChain::new();
        assert!(chain.is_empty());

        let config = RequestConfig::get("api/hello");
        let dispatch = chain.apply_request(config.clone());
        assert_eq!(dispatch.outcome, Ok(config.clone()));
        let rejection = HttpRejection::network("offline").with_config(config);
        assert_eq!(chain.apply_response(&dispatch, Err(rejection.clone())), Err(rejection));
    }
}
