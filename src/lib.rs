#![forbid(unsafe_code)]

//! Event-driven compliance-check handler.
//!
//! One invocation payload in, one batch of evaluations out: the snapshot
//! is resolved from whichever notification shape arrived, evaluated by a
//! pluggable [`evaluator::Evaluator`] when applicable, normalized into
//! [`models::verdict::ReportRecord`]s and submitted to the tracking service.

pub mod applicability;
pub mod cli;
pub mod clients;
pub mod config;
pub mod errors;
pub mod evaluator;
pub mod handler;
pub mod models;
pub mod normalizer;
pub mod resolver;
pub mod submitter;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use handler::ComplianceHandler;
