//! Submits normalized records to the tracking service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::EvaluationSink;
use crate::models::submission::{SubmissionRequest, SubmissionResponse};
use crate::models::verdict::ReportRecord;
use crate::{AppError, Result};

/// Sends one batch per invocation and classifies the outcome.
#[derive(Clone)]
pub struct ReportSubmitter {
    sink: Arc<dyn EvaluationSink>,
}

impl ReportSubmitter {
    /// Create a submitter that writes to `sink`.
    #[must_use]
    pub fn new(sink: Arc<dyn EvaluationSink>) -> Self {
        Self { sink }
    }

    /// Submit `records` with `result_token` in a single call.
    ///
    /// Partial acceptance is reported as failure: the caller cannot retry
    /// only the rejected subset, so the whole invocation is failed.
    ///
    /// # Errors
    ///
    /// - `AppError::EmptyBatch` if `records` is empty; nothing is sent.
    /// - `AppError::Submission` if the service call fails.
    /// - `AppError::PartialAcceptance` if any record was rejected.
    pub async fn submit(
        &self,
        records: Vec<ReportRecord>,
        result_token: &str,
    ) -> Result<SubmissionResponse> {
        if records.is_empty() {
            return Err(AppError::EmptyBatch);
        }

        let submitted = records.len();
        let request = SubmissionRequest {
            evaluations: records,
            result_token: result_token.to_owned(),
        };

        let response = self
            .sink
            .put_evaluations(request)
            .await
            .map_err(|err| match err {
                AppError::Submission(_) => err,
                other => AppError::Submission(other.to_string()),
            })?;

        if !response.failed_evaluations.is_empty() {
            warn!(
                submitted,
                failed = response.failed_evaluations.len(),
                "tracking service rejected evaluations"
            );
            return Err(AppError::PartialAcceptance(response.failed_evaluations));
        }

        info!(submitted, "evaluations submitted");
        Ok(response)
    }
}
