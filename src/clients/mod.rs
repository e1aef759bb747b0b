//! External service seams used by the pipeline.
//!
//! The resolver depends on [`HistoryLookup`] and the submitter on
//! [`EvaluationSink`]; both are injected as trait objects so the HTTP
//! clients in [`history`] and [`tracking`] can be swapped for in-process
//! fakes.

pub mod history;
mod http;
pub mod tracking;

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::snapshot::HistoricalConfigurationItem;
use crate::models::submission::{SubmissionRequest, SubmissionResponse};
use crate::Result;

/// Point-in-time query against the resource-history service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    /// Resource type to look up.
    pub resource_type: String,
    /// Resource identifier to look up.
    pub resource_id: String,
    /// Only records captured at or before this instant are returned.
    pub later_time: DateTime<Utc>,
    /// Maximum number of records to return.
    pub limit: u32,
}

/// Read access to historical configuration items.
pub trait HistoryLookup: Send + Sync {
    /// Fetch historical records matching `request`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Lookup`](crate::AppError::Lookup) if the service
    /// call fails.
    fn lookup(
        &self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoricalConfigurationItem>>> + Send + '_>>;
}

/// Write access to the compliance-tracking service.
pub trait EvaluationSink: Send + Sync {
    /// Submit one batch of evaluations with its result token.
    ///
    /// A successful return may still carry per-record failures.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Submission`](crate::AppError::Submission) if the
    /// service call itself fails.
    fn put_evaluations(
        &self,
        request: SubmissionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SubmissionResponse>> + Send + '_>>;
}
