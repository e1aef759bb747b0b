//! HTTP client for the resource-history service.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use crate::clients::http::JsonEndpoint;
use crate::clients::{HistoryLookup, HistoryRequest};
use crate::models::snapshot::HistoricalConfigurationItem;
use crate::{AppError, Result};

/// Body returned by `POST /resource-history`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    #[serde(default)]
    configuration_items: Vec<HistoricalConfigurationItem>,
}

/// [`HistoryLookup`] backed by the history service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpHistoryClient {
    inner: JsonEndpoint,
}

impl HttpHistoryClient {
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

impl HistoryLookup for HttpHistoryClient {
    fn lookup(
        &self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoricalConfigurationItem>>> + Send + '_>> {
        Box::pin(async move {
            let response: HistoryResponse = self
                .inner
                .post("resource-history", &request)
                .await
                .map_err(AppError::Lookup)?;
            Ok(response.configuration_items)
        })
    }
}
