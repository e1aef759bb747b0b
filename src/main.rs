#![forbid(unsafe_code)]

//! `compliance-handler`: runs one compliance-check invocation.
//!
//! Reads an invocation payload (file or stdin), resolves and evaluates the
//! resource, submits the verdict, and prints the tracking service's
//! response as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use compliance_handler::cli::{load_invocation, LogFormat};
use compliance_handler::clients::history::HttpHistoryClient;
use compliance_handler::clients::tracking::HttpTrackingClient;
use compliance_handler::config::GlobalConfig;
use compliance_handler::evaluator::command::CommandEvaluator;
use compliance_handler::{AppError, ComplianceHandler, Result};

#[derive(Debug, Parser)]
#[command(name = "compliance-handler", about = "Event-driven compliance-check handler", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Invocation payload file; `-` or omitted reads stdin.
    #[arg(long)]
    event: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> std::process::ExitCode {
    let args = Cli::parse();
    if let Err(err) = init_tracing(args.log_format) {
        eprintln!("{err}");
        return std::process::ExitCode::FAILURE;
    }

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))
        .and_then(|runtime| runtime.block_on(run(args)));

    match outcome {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "invocation failed");
            eprintln!("{err}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials();
    info!("configuration loaded");

    // ── Read invocation payload ─────────────────────────
    let event = load_invocation(args.event.as_deref(), &mut std::io::stdin())?;

    // ── Wire collaborators ──────────────────────────────
    let history = Arc::new(HttpHistoryClient::new(
        &config.history.endpoint,
        config.service_token.clone(),
    ));
    let tracking = Arc::new(HttpTrackingClient::new(
        &config.tracking.endpoint,
        config.service_token.clone(),
    ));
    let evaluator = Arc::new(CommandEvaluator::from_config(&config.evaluator));
    let handler = ComplianceHandler::new(history, evaluator, tracking);

    // ── Run the invocation ──────────────────────────────
    let response = handler.handle(&event).await?;
    let rendered = serde_json::to_string(&response)?;
    println!("{rendered}");
    info!("invocation complete");

    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
