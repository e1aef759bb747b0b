//! Error types shared across the handler pipeline.

use std::fmt::{Display, Formatter};

use crate::models::submission::FailedEvaluation;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering every fatal pipeline failure.
///
/// Non-fatal diagnostics (dropped report candidates) are modeled by
/// [`MalformedRecordWarning`](crate::normalizer::MalformedRecordWarning)
/// and never appear here.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Inbound payload could not be parsed as JSON of the expected shape.
    Parse(String),
    /// A required field is absent from a notification or summary.
    MissingField(String),
    /// The resource-history service call failed or returned nothing usable.
    Lookup(String),
    /// The notification type is recognized but not handled.
    UnsupportedNotification(String),
    /// The pluggable evaluator raised or rejected.
    Evaluator(String),
    /// Normalization produced zero valid records.
    EmptyBatch,
    /// The tracking-service call itself failed.
    Submission(String),
    /// The tracking service accepted the call but rejected some records.
    PartialAcceptance(Vec<FailedEvaluation>),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Parse(msg) => write!(f, "parse: {msg}"),
            Self::MissingField(field) => write!(f, "missing field: {field}"),
            Self::Lookup(msg) => write!(f, "lookup: {msg}"),
            Self::UnsupportedNotification(msg) => write!(f, "unsupported notification: {msg}"),
            Self::Evaluator(msg) => write!(f, "evaluator: {msg}"),
            Self::EmptyBatch => write!(f, "empty batch: no valid evaluations to report"),
            Self::Submission(msg) => write!(f, "submission: {msg}"),
            Self::PartialAcceptance(failures) => {
                write!(
                    f,
                    "partial acceptance: {} evaluation(s) rejected",
                    failures.len()
                )?;
                for failure in failures {
                    write!(f, "; {failure}")?;
                }
                Ok(())
            }
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
