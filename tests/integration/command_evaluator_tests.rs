//! Integration tests for `CommandEvaluator` using `/bin/sh` scripts.
//!
//! Unix-only: every test spawns a real child process.

#![cfg(unix)]

use compliance_handler::config::{EvaluatorConfig, SERVICE_TOKEN_ENV};
use compliance_handler::evaluator::command::CommandEvaluator;
use compliance_handler::evaluator::Evaluator;
use compliance_handler::models::notification::PolicyParameters;
use compliance_handler::models::snapshot::{ResourceSnapshot, ResourceStatus};
use compliance_handler::models::verdict::{ComplianceType, Verdict};
use compliance_handler::AppError;

use super::test_helpers::captured_at;

fn snapshot() -> ResourceSnapshot {
    ResourceSnapshot {
        resource_type: "AWS::S3::Bucket".into(),
        resource_id: "logs-bucket".into(),
        status: ResourceStatus::Ok,
        capture_time: captured_at(),
        configuration: serde_json::json!({ "versioning": "Enabled" }),
        relationships: Vec::new(),
        resource_name: Some("logs-bucket".into()),
        arn: None,
        account_id: None,
        region: Some("eu-west-1".into()),
        tags: Default::default(),
    }
}

fn params() -> PolicyParameters {
    PolicyParameters::from_json_str(Some(r#"{"mode":"strict"}"#)).expect("valid params")
}

fn script(body: &str) -> CommandEvaluator {
    CommandEvaluator::new("sh", vec!["-c".to_owned(), body.to_owned()])
}

#[tokio::test]
async fn label_printed_by_process_becomes_label_verdict() {
    let evaluator = script(r#"cat >/dev/null; printf '"NON_COMPLIANT"'"#);

    let verdict = evaluator.evaluate(&snapshot(), &params()).await.unwrap();
    assert_eq!(verdict, Verdict::Label(ComplianceType::NonCompliant));
}

#[tokio::test]
async fn process_receives_snapshot_and_parameters_on_stdin() {
    let evaluator = CommandEvaluator::new("cat", Vec::new());

    let verdict = evaluator.evaluate(&snapshot(), &params()).await.unwrap();
    let echoed = match verdict {
        Verdict::Unrecognized(value) => value,
        other => panic!("an echoed input object is not a verdict shape, got {other:?}"),
    };
    assert_eq!(echoed["configurationItem"]["resourceId"], "logs-bucket");
    assert_eq!(echoed["configurationItem"]["configurationItemStatus"], "OK");
    assert_eq!(echoed["ruleParameters"]["mode"], "strict");
}

#[tokio::test]
async fn evaluation_list_printed_by_process_becomes_records_verdict() {
    let evaluator = script(
        r#"cat >/dev/null; printf '[{"complianceResourceType":"AWS::S3::Bucket","complianceResourceId":"logs-bucket","complianceType":"COMPLIANT","orderingTimestamp":"2024-05-01T12:00:00Z"}]'"#,
    );

    let verdict = evaluator.evaluate(&snapshot(), &params()).await.unwrap();
    let records = match verdict {
        Verdict::Records(records) => records,
        other => panic!("expected records, got {other:?}"),
    };
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].resource_id.as_deref(), Some("logs-bucket"));
    assert_eq!(records[0].compliance_type, Some(ComplianceType::Compliant));
    assert_eq!(records[0].ordering_timestamp, Some(captured_at()));
}

#[tokio::test]
async fn non_zero_exit_is_an_evaluator_error() {
    let evaluator = script("cat >/dev/null; echo 'policy crashed' >&2; exit 3");

    let err = evaluator.evaluate(&snapshot(), &params()).await.unwrap_err();
    assert!(
        matches!(err, AppError::Evaluator(ref msg) if msg.contains("policy crashed")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn non_json_output_is_an_evaluator_error() {
    let evaluator = script("cat >/dev/null; echo 'looks fine to me'");

    let err = evaluator.evaluate(&snapshot(), &params()).await.unwrap_err();
    assert!(
        matches!(err, AppError::Evaluator(ref msg) if msg.contains("invalid JSON")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn missing_program_is_an_evaluator_error() {
    let evaluator = CommandEvaluator::new("definitely-not-a-real-policy-binary", Vec::new());

    let err = evaluator.evaluate(&snapshot(), &params()).await.unwrap_err();
    assert!(
        matches!(err, AppError::Evaluator(ref msg) if msg.contains("failed to spawn")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn process_that_ignores_stdin_is_judged_by_exit_status() {
    let evaluator = script(r#"printf '"COMPLIANT"'"#);

    let verdict = evaluator.evaluate(&snapshot(), &params()).await.unwrap();
    assert_eq!(verdict, Verdict::Label(ComplianceType::Compliant));
}

#[tokio::test]
async fn from_config_uses_command_and_args() {
    let config = EvaluatorConfig {
        command: "sh".into(),
        args: vec!["-c".into(), r#"cat >/dev/null; printf '"COMPLIANT"'"#.into()],
    };

    let verdict = CommandEvaluator::from_config(&config)
        .evaluate(&snapshot(), &params())
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Label(ComplianceType::Compliant));
}

#[tokio::test]
#[serial_test::serial]
#[allow(unsafe_code)]
async fn service_token_is_not_exposed_to_the_process() {
    unsafe {
        std::env::set_var(SERVICE_TOKEN_ENV, "leaked");
    }

    let evaluator = script(&format!(
        r#"cat >/dev/null; if [ -n "${{{SERVICE_TOKEN_ENV}:-}}" ]; then printf '"COMPLIANT"'; else printf '"NOT_APPLICABLE"'; fi"#
    ));
    let verdict = evaluator.evaluate(&snapshot(), &params()).await;

    unsafe {
        std::env::remove_var(SERVICE_TOKEN_ENV);
    }

    assert_eq!(verdict.unwrap(), Verdict::Label(ComplianceType::NotApplicable));
}
