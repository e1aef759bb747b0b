//! HTTP client for the compliance-tracking service.

use std::future::Future;
use std::pin::Pin;

use crate::clients::http::JsonEndpoint;
use crate::clients::EvaluationSink;
use crate::models::submission::{SubmissionRequest, SubmissionResponse};
use crate::{AppError, Result};

/// [`EvaluationSink`] backed by the tracking service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTrackingClient {
    inner: JsonEndpoint,
}

impl HttpTrackingClient {
    /// Create a client for the service at `endpoint`.
    ///
    /// An empty `token` is treated as no token.
    #[must_use]
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            inner: JsonEndpoint::new(endpoint, token),
        }
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

impl EvaluationSink for HttpTrackingClient {
    fn put_evaluations(
        &self,
        request: SubmissionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SubmissionResponse>> + Send + '_>> {
        Box::pin(async move {
            self.inner
                .post("evaluations", &request)
                .await
                .map_err(AppError::Submission)
        })
    }
}
