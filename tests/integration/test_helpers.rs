//! Shared fakes and payload builders for integration tests.
//!
//! Provides in-process implementations of the history, tracking and
//! evaluator seams that record every call, so tests can assert both on
//! outcomes and on what the pipeline sent.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use compliance_handler::clients::{EvaluationSink, HistoryLookup, HistoryRequest};
use compliance_handler::evaluator::Evaluator;
use compliance_handler::models::notification::{InvocationEvent, PolicyParameters};
use compliance_handler::models::snapshot::{
    HistoricalConfigurationItem, HistoricalRelationship, ResourceSnapshot, ResourceStatus,
};
use compliance_handler::models::submission::{
    FailedEvaluation, SubmissionRequest, SubmissionResponse,
};
use compliance_handler::models::verdict::Verdict;
use compliance_handler::{AppError, ComplianceHandler, Result};

/// Capture time used by every fixture.
pub fn captured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

// ── History fake ─────────────────────────────────────────────

/// History service fake returning a fixed reply.
pub struct FakeHistory {
    reply: Mutex<Option<Result<Vec<HistoricalConfigurationItem>>>>,
    pub requests: Mutex<Vec<HistoryRequest>>,
}

impl FakeHistory {
    pub fn returning(items: Vec<HistoricalConfigurationItem>) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Ok(items))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: AppError) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(Err(err))),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HistoryLookup for FakeHistory {
    fn lookup(
        &self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoricalConfigurationItem>>> + Send + '_>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(AppError::Lookup("fake history called twice".into())));
        Box::pin(async move { reply })
    }
}

// ── Tracking fake ────────────────────────────────────────────

/// Tracking service fake that records every submission.
pub struct RecordingSink {
    reply: Mutex<Option<Result<SubmissionResponse>>>,
    pub requests: Mutex<Vec<SubmissionRequest>>,
}

impl RecordingSink {
    pub fn accepting() -> Arc<Self> {
        Self::with_reply(Ok(SubmissionResponse::default()))
    }

    pub fn rejecting(failures: Vec<FailedEvaluation>) -> Arc<Self> {
        Self::with_reply(Ok(SubmissionResponse {
            failed_evaluations: failures,
        }))
    }

    pub fn failing(err: AppError) -> Arc<Self> {
        Self::with_reply(Err(err))
    }

    fn with_reply(reply: Result<SubmissionResponse>) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Some(reply)),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn only_request(&self) -> SubmissionRequest {
        let requests = self.requests.lock().unwrap();
        assert_eq!(requests.len(), 1, "expected exactly one submission");
        requests[0].clone()
    }
}

impl EvaluationSink for RecordingSink {
    fn put_evaluations(
        &self,
        request: SubmissionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SubmissionResponse>> + Send + '_>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .reply
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(AppError::Submission("fake sink called twice".into())));
        Box::pin(async move { reply })
    }
}

// ── Evaluator fake ───────────────────────────────────────────

/// Evaluator fake that counts calls and returns a fixed verdict.
pub struct CountingEvaluator {
    verdict: std::result::Result<Verdict, String>,
    calls: AtomicUsize,
    pub seen: Mutex<Vec<(ResourceSnapshot, PolicyParameters)>>,
}

impl CountingEvaluator {
    pub fn returning(verdict: impl Into<Verdict>) -> Arc<Self> {
        Arc::new(Self {
            verdict: Ok(verdict.into()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self {
            verdict: Err(msg.to_owned()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Evaluator for CountingEvaluator {
    fn evaluate<'a>(
        &'a self,
        snapshot: &'a ResourceSnapshot,
        parameters: &'a PolicyParameters,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((snapshot.clone(), parameters.clone()));
        let verdict = self.verdict.clone().map_err(AppError::Evaluator);
        Box::pin(async move { verdict })
    }
}

// ── Wiring ───────────────────────────────────────────────────

/// Build a handler from the three fakes.
pub fn handler(
    history: &Arc<FakeHistory>,
    evaluator: &Arc<CountingEvaluator>,
    sink: &Arc<RecordingSink>,
) -> ComplianceHandler {
    ComplianceHandler::new(
        Arc::clone(history) as Arc<dyn HistoryLookup>,
        Arc::clone(evaluator) as Arc<dyn Evaluator>,
        Arc::clone(sink) as Arc<dyn EvaluationSink>,
    )
}

// ── Payload builders ─────────────────────────────────────────

/// Wrap an invoking-event document into a full invocation payload.
pub fn invocation(invoking_event: &serde_json::Value) -> InvocationEvent {
    InvocationEvent {
        invoking_event: Some(invoking_event.to_string()),
        rule_parameters: Some(r#"{"requiredTag":"team"}"#.into()),
        result_token: Some("result-token-123".into()),
        config_rule_name: Some("required-tags".into()),
        ..InvocationEvent::default()
    }
}

/// A change notification for `vol-1` with the given status and scope flag.
pub fn change_event(status: &str, event_left_scope: bool) -> InvocationEvent {
    invocation(&serde_json::json!({
        "messageType": "ConfigurationItemChangeNotification",
        "configurationItem": {
            "resourceType": "AWS::EC2::Volume",
            "resourceId": "vol-1",
            "configurationItemStatus": status,
            "configurationItemCaptureTime": "2024-05-01T12:00:00.000Z",
            "configuration": { "encrypted": true },
            "relationships": [{ "name": "Is attached to Instance" }],
            "tags": { "team": "storage" }
        },
        "eventLeftScope": event_left_scope
    }))
}

/// An oversized notification summarizing `vol-1`.
pub fn oversized_event() -> InvocationEvent {
    invocation(&serde_json::json!({
        "messageType": "OversizedConfigurationItemChangeNotification",
        "configurationItemSummary": {
            "resourceType": "AWS::EC2::Volume",
            "resourceId": "vol-1",
            "configurationItemCaptureTime": "2024-05-01T12:00:00.000Z"
        },
        "eventLeftScope": false
    }))
}

/// A scheduled notification.
pub fn scheduled_event() -> InvocationEvent {
    invocation(&serde_json::json!({
        "messageType": "ScheduledNotification",
        "notificationCreationTime": "2024-05-01T12:00:00.000Z"
    }))
}

/// The history record matching [`change_event`]`("OK", false)`.
pub fn history_record() -> HistoricalConfigurationItem {
    HistoricalConfigurationItem {
        resource_type: Some("AWS::EC2::Volume".into()),
        resource_id: Some("vol-1".into()),
        configuration_item_status: Some(ResourceStatus::Ok),
        configuration_item_capture_time: Some(captured_at()),
        configuration: Some(r#"{"encrypted":true}"#.into()),
        relationships: vec![HistoricalRelationship {
            relationship_name: Some("Is attached to Instance".into()),
            ..HistoricalRelationship::default()
        }],
        tags: [("team".to_owned(), "storage".to_owned())].into_iter().collect(),
        ..HistoricalConfigurationItem::default()
    }
}
