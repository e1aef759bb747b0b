//! Single-invocation pipeline driver.
//!
//! Runs the stages strictly in order: resolve the snapshot, check
//! applicability, evaluate (only when applicable), normalize, submit.
//! The first fatal error ends the invocation and is returned as-is.

use std::sync::Arc;

use tracing::field::Empty;
use tracing::{info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::applicability::is_applicable;
use crate::clients::{EvaluationSink, HistoryLookup};
use crate::evaluator::{Evaluator, EvaluatorAdapter};
use crate::models::notification::InvocationEvent;
use crate::models::submission::SubmissionResponse;
use crate::models::verdict::{ComplianceType, Verdict};
use crate::normalizer::normalize;
use crate::resolver::SnapshotResolver;
use crate::submitter::ReportSubmitter;
use crate::{AppError, Result};

/// Compliance-check handler wired to its three collaborators.
#[derive(Clone)]
pub struct ComplianceHandler {
    resolver: SnapshotResolver,
    evaluator: EvaluatorAdapter,
    submitter: ReportSubmitter,
}

impl ComplianceHandler {
    /// Wire a handler from its collaborators.
    #[must_use]
    pub fn new(
        history: Arc<dyn HistoryLookup>,
        evaluator: Arc<dyn Evaluator>,
        sink: Arc<dyn EvaluationSink>,
    ) -> Self {
        Self {
            resolver: SnapshotResolver::new(history),
            evaluator: EvaluatorAdapter::new(evaluator),
            submitter: ReportSubmitter::new(sink),
        }
    }

    /// Handle one invocation end to end.
    ///
    /// # Errors
    ///
    /// - `AppError::MissingField` / `AppError::Parse` for a malformed payload.
    /// - `AppError::Lookup` if an oversized item cannot be fetched.
    /// - `AppError::UnsupportedNotification` for scheduled notifications.
    /// - Any error raised by the evaluator, unmodified.
    /// - `AppError::EmptyBatch`, `AppError::Submission` or
    ///   `AppError::PartialAcceptance` from the submission stage.
    pub async fn handle(&self, event: &InvocationEvent) -> Result<SubmissionResponse> {
        let span = info_span!(
            "compliance_invocation",
            invocation_id = %Uuid::new_v4(),
            rule = event.config_rule_name.as_deref().unwrap_or(""),
            message_type = Empty,
            resource_type = Empty,
            resource_id = Empty,
        );

        async move {
            let result_token = event.result_token()?;
            let notification = event.notification()?;
            let parameters = event.parameters()?;

            let message_type = notification.message_type.clone();
            let event_left_scope = notification.event_left_scope;
            Span::current().record("message_type", message_type.as_str());

            let snapshot = self.resolver.resolve(notification).await?.ok_or_else(|| {
                AppError::UnsupportedNotification(format!(
                    "{} is not supported by this handler",
                    message_type.as_str()
                ))
            })?;

            Span::current()
                .record("resource_type", snapshot.resource_type.as_str())
                .record("resource_id", snapshot.resource_id.as_str());
            info!(status = %snapshot.status, "snapshot resolved");

            let verdict = if is_applicable(&snapshot, event_left_scope) {
                self.evaluator.invoke(&snapshot, &parameters).await?
            } else {
                info!(?event_left_scope, "resource not applicable, skipping evaluator");
                Verdict::Label(ComplianceType::NotApplicable)
            };

            let normalized = normalize(verdict, Some(&snapshot));
            if !normalized.warnings.is_empty() {
                info!(
                    dropped = normalized.warnings.len(),
                    kept = normalized.records.len(),
                    "malformed evaluations dropped"
                );
            }

            self.submitter.submit(normalized.records, result_token).await
        }
        .instrument(span)
        .await
    }
}
