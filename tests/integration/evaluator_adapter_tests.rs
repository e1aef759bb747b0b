//! Integration tests for `EvaluatorAdapter` and `FnEvaluator`.

use std::sync::Arc;

use compliance_handler::evaluator::{Evaluator, EvaluatorAdapter, FnEvaluator};
use compliance_handler::models::notification::PolicyParameters;
use compliance_handler::models::snapshot::{ResourceSnapshot, ResourceStatus};
use compliance_handler::models::verdict::{ComplianceType, Verdict};
use compliance_handler::AppError;

use super::test_helpers::captured_at;

fn snapshot(encrypted: bool) -> ResourceSnapshot {
    ResourceSnapshot {
        resource_type: "AWS::EC2::Volume".into(),
        resource_id: "vol-1".into(),
        status: ResourceStatus::Ok,
        capture_time: captured_at(),
        configuration: serde_json::json!({ "encrypted": encrypted }),
        relationships: Vec::new(),
        resource_name: None,
        arn: None,
        account_id: None,
        region: None,
        tags: Default::default(),
    }
}

fn encryption_rule() -> Arc<dyn Evaluator> {
    Arc::new(FnEvaluator::new(
        |snap: &ResourceSnapshot, _params: &PolicyParameters| {
            let encrypted = snap.configuration["encrypted"]
                .as_bool()
                .ok_or_else(|| AppError::Evaluator("configuration.encrypted missing".into()))?;
            Ok(Verdict::Label(if encrypted {
                ComplianceType::Compliant
            } else {
                ComplianceType::NonCompliant
            }))
        },
    ))
}

#[tokio::test]
async fn adapter_returns_the_evaluator_verdict() {
    let adapter = EvaluatorAdapter::new(encryption_rule());
    let params = PolicyParameters::default();

    assert_eq!(
        adapter.invoke(&snapshot(true), &params).await.unwrap(),
        Verdict::Label(ComplianceType::Compliant)
    );
    assert_eq!(
        adapter.invoke(&snapshot(false), &params).await.unwrap(),
        Verdict::Label(ComplianceType::NonCompliant)
    );
}

#[tokio::test]
async fn repeated_invocations_yield_identical_verdicts() {
    let adapter = EvaluatorAdapter::new(encryption_rule());
    let params: PolicyParameters = [("strict".to_owned(), serde_json::json!(true))]
        .into_iter()
        .collect();
    let snap = snapshot(false);

    let first = adapter.invoke(&snap, &params).await.unwrap();
    let second = adapter.invoke(&snap, &params).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn parameters_reach_the_evaluator() {
    let adapter = EvaluatorAdapter::new(Arc::new(FnEvaluator::new(
        |_snap: &ResourceSnapshot, params: &PolicyParameters| match params.get("forceLabel") {
            Some(serde_json::Value::String(label)) => Ok(Verdict::Label(label.parse()?)),
            _ => Ok(Verdict::Label(ComplianceType::NotApplicable)),
        },
    )));
    let params: PolicyParameters = [(
        "forceLabel".to_owned(),
        serde_json::json!("NON_COMPLIANT"),
    )]
    .into_iter()
    .collect();

    assert_eq!(
        adapter.invoke(&snapshot(true), &params).await.unwrap(),
        Verdict::Label(ComplianceType::NonCompliant)
    );
}

#[tokio::test]
async fn evaluator_error_is_not_wrapped() {
    let adapter = EvaluatorAdapter::new(encryption_rule());
    let mut snap = snapshot(true);
    snap.configuration = serde_json::Value::Null;

    let err = adapter
        .invoke(&snap, &PolicyParameters::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::Evaluator(ref msg) if msg == "configuration.encrypted missing")
    );
}
