//! Evaluator verdicts and the report records they normalize into.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::snapshot::ResourceSnapshot;
use crate::AppError;

/// Compliance label attached to a report record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceType {
    /// Resource satisfies the rule.
    Compliant,
    /// Resource violates the rule.
    NonCompliant,
    /// Rule does not apply to the resource.
    NotApplicable,
}

impl ComplianceType {
    /// Wire representation of the label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compliant => "COMPLIANT",
            Self::NonCompliant => "NON_COMPLIANT",
            Self::NotApplicable => "NOT_APPLICABLE",
        }
    }
}

impl FromStr for ComplianceType {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "COMPLIANT" => Ok(Self::Compliant),
            "NON_COMPLIANT" => Ok(Self::NonCompliant),
            "NOT_APPLICABLE" => Ok(Self::NotApplicable),
            other => Err(AppError::Evaluator(format!(
                "unknown compliance type: {other}"
            ))),
        }
    }
}

impl Display for ComplianceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate report record produced by an evaluator.
///
/// Every field is optional so that evaluators assessing several
/// sub-resources can hand back partially filled entries; the normalizer
/// drops the incomplete ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecordCandidate {
    /// Type of the assessed resource.
    #[serde(rename = "complianceResourceType")]
    pub resource_type: Option<String>,
    /// Identifier of the assessed resource.
    #[serde(rename = "complianceResourceId")]
    pub resource_id: Option<String>,
    /// Compliance label.
    pub compliance_type: Option<ComplianceType>,
    /// Ordering timestamp.
    pub ordering_timestamp: Option<DateTime<Utc>>,
    /// Free-text explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// Wire names of required fields that were present but unparseable.
    #[serde(skip)]
    pub invalid: Vec<&'static str>,
}

impl ReportRecordCandidate {
    /// Build a fully populated candidate.
    #[must_use]
    pub fn new(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        compliance_type: ComplianceType,
        ordering_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            resource_id: Some(resource_id.into()),
            compliance_type: Some(compliance_type),
            ordering_timestamp: Some(ordering_timestamp),
            annotation: None,
            invalid: Vec::new(),
        }
    }

    /// Build a candidate for the snapshot's own resource.
    #[must_use]
    pub fn for_snapshot(snapshot: &ResourceSnapshot, compliance_type: ComplianceType) -> Self {
        Self::new(
            snapshot.resource_type.clone(),
            snapshot.resource_id.clone(),
            compliance_type,
            snapshot.capture_time,
        )
    }

    /// Attach an annotation.
    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    /// Leniently read a candidate from an arbitrary JSON value.
    ///
    /// Fields that are absent or `null` are left as `None`. Required fields
    /// that are present but of the wrong type or unparseable are also left
    /// as `None` and their wire names recorded in [`Self::invalid`], so the
    /// normalizer can report them by name instead of the whole list failing
    /// to decode.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let mut invalid = Vec::new();
        let resource_type =
            required_field(value, "complianceResourceType", &mut invalid, |raw| {
                Some(raw.to_owned())
            });
        let resource_id = required_field(value, "complianceResourceId", &mut invalid, |raw| {
            Some(raw.to_owned())
        });
        let compliance_type = required_field(value, "complianceType", &mut invalid, |raw| {
            raw.parse().ok()
        });
        let ordering_timestamp =
            required_field(value, "orderingTimestamp", &mut invalid, |raw| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|ts| ts.with_timezone(&Utc))
            });

        Self {
            resource_type,
            resource_id,
            compliance_type,
            ordering_timestamp,
            annotation: value
                .get("annotation")
                .and_then(Value::as_str)
                .map(str::to_owned),
            invalid,
        }
    }
}

fn required_field<T>(
    value: &Value,
    key: &'static str,
    invalid: &mut Vec<&'static str>,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = value.get(key).filter(|raw| !raw.is_null())?;
    let parsed = raw.as_str().and_then(parse);
    if parsed.is_none() {
        invalid.push(key);
    }
    parsed
}

/// Raw output of an evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A single label for the snapshot's own resource.
    Label(ComplianceType),
    /// One candidate per assessed sub-resource, in order.
    Records(Vec<ReportRecordCandidate>),
    /// Output of any other shape.
    Unrecognized(Value),
}

impl Verdict {
    /// Classify evaluator output received as JSON.
    ///
    /// A recognized label string becomes [`Verdict::Label`], an array
    /// becomes [`Verdict::Records`], anything else is kept as
    /// [`Verdict::Unrecognized`].
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(raw) => match raw.trim().parse() {
                Ok(label) => Self::Label(label),
                Err(_) => Self::Unrecognized(Value::String(raw)),
            },
            Value::Array(items) => {
                Self::Records(items.iter().map(ReportRecordCandidate::from_json).collect())
            }
            other => Self::Unrecognized(other),
        }
    }
}

impl From<ComplianceType> for Verdict {
    fn from(label: ComplianceType) -> Self {
        Self::Label(label)
    }
}

impl From<Vec<ReportRecordCandidate>> for Verdict {
    fn from(records: Vec<ReportRecordCandidate>) -> Self {
        Self::Records(records)
    }
}

/// A validated report line ready for the tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    /// Type of the assessed resource.
    #[serde(rename = "complianceResourceType")]
    pub resource_type: String,
    /// Identifier of the assessed resource.
    #[serde(rename = "complianceResourceId")]
    pub resource_id: String,
    /// Compliance label.
    pub compliance_type: ComplianceType,
    /// Ordering timestamp.
    pub ordering_timestamp: DateTime<Utc>,
    /// Free-text explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl ReportRecord {
    /// Build a record for the snapshot's own resource.
    #[must_use]
    pub fn for_snapshot(snapshot: &ResourceSnapshot, compliance_type: ComplianceType) -> Self {
        Self {
            resource_type: snapshot.resource_type.clone(),
            resource_id: snapshot.resource_id.clone(),
            compliance_type,
            ordering_timestamp: snapshot.capture_time,
            annotation: None,
        }
    }
}
