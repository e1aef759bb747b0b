//! Converts evaluator verdicts into validated report records.
//!
//! Whatever shape the evaluator returned, the output is a flat, ordered
//! list of [`ReportRecord`]s. Candidates that lack a required field are
//! dropped one by one; a bad candidate never sinks the rest of the batch.

use std::fmt::{Display, Formatter};

use tracing::warn;

use crate::models::snapshot::ResourceSnapshot;
use crate::models::verdict::{ComplianceType, ReportRecord, ReportRecordCandidate, Verdict};

/// Maximum annotation length accepted by the tracking service, in characters.
pub const MAX_ANNOTATION_LEN: usize = 256;

/// A candidate dropped because required fields were missing or invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecordWarning {
    /// Position of the candidate in the evaluator's list.
    pub index: usize,
    /// Wire names of the absent required fields.
    pub missing: Vec<&'static str>,
    /// Wire names of required fields present with an unusable value.
    pub invalid: Vec<&'static str>,
}

impl Display for MalformedRecordWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "evaluation {} dropped", self.index)?;
        if !self.missing.is_empty() {
            write!(f, ", missing {}", self.missing.join(", "))?;
        }
        if !self.invalid.is_empty() {
            write!(f, ", invalid {}", self.invalid.join(", "))?;
        }
        Ok(())
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    /// Valid records, in evaluator order.
    pub records: Vec<ReportRecord>,
    /// One entry per dropped candidate.
    pub warnings: Vec<MalformedRecordWarning>,
}

/// Normalize `verdict` into report records.
///
/// - A label yields one record for the snapshot's resource.
/// - A list yields one record per complete candidate.
/// - Any other shape yields one `NOT_APPLICABLE` record for the snapshot.
///
/// Without a snapshot, labels and unrecognized shapes produce nothing.
#[must_use]
pub fn normalize(verdict: Verdict, snapshot: Option<&ResourceSnapshot>) -> Normalized {
    match verdict {
        Verdict::Label(label) => Normalized {
            records: snapshot
                .map(|snap| ReportRecord::for_snapshot(snap, label))
                .into_iter()
                .collect(),
            warnings: Vec::new(),
        },
        Verdict::Records(candidates) => normalize_candidates(candidates),
        Verdict::Unrecognized(value) => {
            warn!(%value, "unrecognized evaluator output, reporting NOT_APPLICABLE");
            Normalized {
                records: snapshot
                    .map(|snap| ReportRecord::for_snapshot(snap, ComplianceType::NotApplicable))
                    .into_iter()
                    .collect(),
                warnings: Vec::new(),
            }
        }
    }
}

fn normalize_candidates(candidates: Vec<ReportRecordCandidate>) -> Normalized {
    let mut out = Normalized::default();

    for (index, candidate) in candidates.into_iter().enumerate() {
        match validate(candidate) {
            Ok(record) => out.records.push(record),
            Err((missing, invalid)) => {
                let warning = MalformedRecordWarning {
                    index,
                    missing,
                    invalid,
                };
                warn!(
                    index = warning.index,
                    missing = ?warning.missing,
                    invalid = ?warning.invalid,
                    "dropping malformed evaluation"
                );
                out.warnings.push(warning);
            }
        }
    }

    out
}

type FieldProblems = (Vec<&'static str>, Vec<&'static str>);

fn validate(candidate: ReportRecordCandidate) -> Result<ReportRecord, FieldProblems> {
    let ReportRecordCandidate {
        resource_type,
        resource_id,
        compliance_type,
        ordering_timestamp,
        annotation,
        invalid,
    } = candidate;

    match (resource_type, resource_id, compliance_type, ordering_timestamp) {
        (Some(resource_type), Some(resource_id), Some(compliance_type), Some(ordering_timestamp)) => {
            Ok(ReportRecord {
                resource_type,
                resource_id,
                compliance_type,
                ordering_timestamp,
                annotation: annotation.map(|text| truncate_annotation(&text)),
            })
        }
        (resource_type, resource_id, compliance_type, ordering_timestamp) => {
            let absent = [
                ("complianceResourceType", resource_type.is_none()),
                ("complianceResourceId", resource_id.is_none()),
                ("complianceType", compliance_type.is_none()),
                ("orderingTimestamp", ordering_timestamp.is_none()),
            ];
            let missing = absent
                .into_iter()
                .filter(|&(name, is_absent)| is_absent && !invalid.contains(&name))
                .map(|(name, _)| name)
                .collect();
            Err((missing, invalid))
        }
    }
}

/// Truncate `text` to at most [`MAX_ANNOTATION_LEN`] characters.
///
/// Appends `"..."` when truncation occurs.
#[must_use]
pub fn truncate_annotation(text: &str) -> String {
    if text.chars().count() <= MAX_ANNOTATION_LEN {
        return text.to_owned();
    }

    let kept: String = text.chars().take(MAX_ANNOTATION_LEN - 3).collect();
    format!("{kept}...")
}
