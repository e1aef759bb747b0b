//! Tracking-service submission request and response shapes.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::models::verdict::ReportRecord;

/// One batched call to the tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    /// Validated records, in evaluator order.
    pub evaluations: Vec<ReportRecord>,
    /// Opaque token from the inbound payload.
    pub result_token: String,
}

/// A record the tracking service refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEvaluation {
    /// Type of the rejected record's resource.
    #[serde(rename = "complianceResourceType", default)]
    pub resource_type: Option<String>,
    /// Identifier of the rejected record's resource.
    #[serde(rename = "complianceResourceId", default)]
    pub resource_id: Option<String>,
    /// Label the rejected record carried.
    #[serde(default)]
    pub compliance_type: Option<String>,
    /// Reason given by the service, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Display for FailedEvaluation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}",
            self.resource_type.as_deref().unwrap_or("?"),
            self.resource_id.as_deref().unwrap_or("?"),
        )?;
        if let Some(ref compliance) = self.compliance_type {
            write!(f, " ({compliance})")?;
        }
        if let Some(ref msg) = self.error_message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// Response of a submission call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    /// Records the service did not accept; empty on full success.
    #[serde(default)]
    pub failed_evaluations: Vec<FailedEvaluation>,
}
