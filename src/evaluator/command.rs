//! Evaluator that delegates each decision to an external process.
//!
//! The process receives one JSON document on stdin:
//!
//! ```json
//! { "configurationItem": { ... }, "ruleParameters": { ... } }
//! ```
//!
//! and must print its verdict as JSON on stdout: either a label string
//! such as `"COMPLIANT"` or an array of evaluation objects. The child runs
//! with a cleared environment plus [`ALLOWED_ENV_VARS`] so service tokens
//! never reach policy code.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::EvaluatorConfig;
use crate::evaluator::Evaluator;
use crate::models::notification::PolicyParameters;
use crate::models::snapshot::ResourceSnapshot;
use crate::models::verdict::Verdict;
use crate::{AppError, Result};

/// Environment variables inherited by the evaluator process.
pub const ALLOWED_ENV_VARS: &[&str] = &[
    "PATH",
    "HOME",
    "LANG",
    "TZ",
    "RUST_LOG",
    // Windows-specific variables.
    "SystemRoot",
    "TEMP",
    "TMP",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluatorInput<'a> {
    configuration_item: &'a ResourceSnapshot,
    rule_parameters: &'a PolicyParameters,
}

/// Runs a configured command once per evaluation.
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
}

impl CommandEvaluator {
    /// Create an evaluator that runs `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create an evaluator from the `[evaluator]` config table.
    #[must_use]
    pub fn from_config(config: &EvaluatorConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    async fn run(
        &self,
        snapshot: &ResourceSnapshot,
        parameters: &PolicyParameters,
    ) -> Result<Verdict> {
        let input = serde_json::to_vec(&EvaluatorInput {
            configuration_item: snapshot,
            rule_parameters: parameters,
        })
        .map_err(|err| AppError::Evaluator(format!("failed to encode evaluator input: {err}")))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        cmd.env_clear();
        for &key in ALLOWED_ENV_VARS {
            if let Ok(val) = std::env::var(key) {
                cmd.env(key, val);
            }
        }

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|err| {
            AppError::Evaluator(format!("failed to spawn {}: {err}", self.program))
        })?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Evaluator("failed to capture evaluator stdin".into()))?;

        // Feed stdin while collecting output so a chatty child cannot block on a full pipe.
        let feed = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|err| {
            AppError::Evaluator(format!("failed to wait for {}: {err}", self.program))
        })?;
        if let Err(err) = fed {
            // A child that exits without reading its input is judged by its exit status.
            warn!(program = %self.program, %err, "evaluator did not consume its input");
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Evaluator(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let value: Value = serde_json::from_slice(&output.stdout).map_err(|err| {
            AppError::Evaluator(format!("{} printed invalid JSON: {err}", self.program))
        })?;

        info!(program = %self.program, "evaluator process completed");
        Ok(Verdict::from_value(value))
    }
}

impl Evaluator for CommandEvaluator {
    fn evaluate<'a>(
        &'a self,
        snapshot: &'a ResourceSnapshot,
        parameters: &'a PolicyParameters,
    ) -> Pin<Box<dyn Future<Output = Result<Verdict>> + Send + 'a>> {
        Box::pin(self.run(snapshot, parameters))
    }
}
