//! Minimal JSON-over-HTTP plumbing shared by the service clients.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// POSTs JSON documents to paths below a fixed endpoint.
#[derive(Debug, Clone)]
pub(crate) struct JsonEndpoint {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl JsonEndpoint {
    pub(crate) fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `body` to `{endpoint}/{path}` and decode the JSON reply.
    ///
    /// Errors are returned as plain strings so each client can wrap them in
    /// its own `AppError` variant.
    pub(crate) async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, String>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{path}", self.endpoint);
        debug!(%url, "posting service request");

        let mut request = self.http.post(&url).json(body);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| format!("request to {url} failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("{url} returned {status}: {detail}"));
        }

        response
            .json::<R>()
            .await
            .map_err(|err| format!("invalid response from {url}: {err}"))
    }
}
