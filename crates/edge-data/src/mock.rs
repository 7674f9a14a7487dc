//! In-memory transport for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edge_core::{RequestContext, ResponseContext};
use http::StatusCode;

use crate::client::FetchError;
use crate::transport::HttpTransport;

type Responder = dyn Fn(&RequestContext) -> Result<ResponseContext, FetchError> + Send + Sync;

/// Transport that records every request and answers from a closure.
pub struct MockTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<RequestContext>>,
}

impl MockTransport {
    /// Answer every request with the closure's result.
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&RequestContext) -> Result<ResponseContext, FetchError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer every request with an empty response of the given status.
    pub fn status(status: StatusCode) -> Arc<Self> {
        Self::new(move |_| Ok(ResponseContext::new(status, Vec::new())))
    }

    /// Answer every request with a JSON body.
    pub fn json(status: StatusCode, value: serde_json::Value) -> Arc<Self> {
        Self::new(move |_| Ok(ResponseContext::json(status, &value)))
    }

    /// Fail every request with a connection error.
    pub fn failing(reason: &str) -> Arc<Self> {
        let reason = reason.to_string();
        Self::new(move |_| Err(FetchError::Connection(reason.clone())))
    }

    /// Answer requests in order; once exhausted, requests fail.
    pub fn sequence(responses: Vec<Result<ResponseContext, FetchError>>) -> Arc<Self> {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |_| {
            queue
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .unwrap_or_else(|| Err(FetchError::Connection("no scripted response".into())))
        })
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RequestContext> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<RequestContext> {
        self.requests.lock().ok().and_then(|r| r.last().cloned())
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: RequestContext) -> Result<ResponseContext, FetchError> {
        let result = (self.responder)(&request);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        result
    }
}
