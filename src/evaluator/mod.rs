//! Pluggable compliance decision functions.
//!
//! The [`Evaluator`] trait is the only seam between the reporting pipeline
//! and the policy logic. [`EvaluatorAdapter`] is what the handler calls;
//! it forwards to the injected evaluator and adds nothing but a log line.

pub mod command;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::models::notification::PolicyParameters;
use crate::models::snapshot::ResourceSnapshot;
use crate::models::verdict::Verdict;
use crate::Result;

/// Maps a snapshot and rule parameters to a compliance verdict.
pub trait Evaluator: Send + Sync {
    /// Evaluate `snapshot` under `parameters`.
    ///
    /// # Errors
    ///
    /// Implementations return [`AppError::Evaluator`](crate::AppError::Evaluator)
    /// when the decision cannot be made.
    fn evaluate<'a>(
        &'a self,
        snapshot: &'a ResourceSnapshot,
        parameters: &'a PolicyParameters,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict>> + Send + 'a>>;
}

/// Wraps a synchronous closure as an [`Evaluator`].
pub struct FnEvaluator<F> {
    func: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&ResourceSnapshot, &PolicyParameters) -> Result<Verdict> + Send + Sync,
{
    /// Wrap `func`.
    #[must_use]
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&ResourceSnapshot, &PolicyParameters) -> Result<Verdict> + Send + Sync,
{
    fn evaluate<'a>(
        &'a self,
        snapshot: &'a ResourceSnapshot,
        parameters: &'a PolicyParameters,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict>> + Send + 'a>> {
        let verdict = (self.func)(snapshot, parameters);
        Box::pin(std::future::ready(verdict))
    }
}

/// Stateless bridge from the pipeline to the injected evaluator.
#[derive(Clone)]
pub struct EvaluatorAdapter {
    evaluator: Arc<dyn Evaluator>,
}

impl EvaluatorAdapter {
    /// Create an adapter around `evaluator`.
    #[must_use]
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self { evaluator }
    }

    /// Invoke the evaluator with the snapshot and parameters unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the evaluator's error untouched.
    pub async fn invoke(
        &self,
        snapshot: &ResourceSnapshot,
        parameters: &PolicyParameters,
    ) -> Result<Verdict> {
        debug!(
            resource_type = %snapshot.resource_type,
            resource_id = %snapshot.resource_id,
            parameters = parameters.len(),
            "invoking evaluator"
        );
        self.evaluator.evaluate(snapshot, parameters).await
    }
}
