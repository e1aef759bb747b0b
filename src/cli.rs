//! Command-line plumbing shared by the binary: log format selection and
//! invocation payload loading.

use std::io::Read;
use std::path::Path;

use clap::ValueEnum;

use crate::models::notification::InvocationEvent;
use crate::{AppError, Result};

/// Log output format, passed as `--log-format`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines. Default.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Read the raw invocation payload.
///
/// `path` names a file; `None` or `-` reads all of `stdin` instead.
///
/// # Errors
///
/// Returns `AppError::Io` if the file or `stdin` cannot be read.
pub fn read_payload(path: Option<&Path>, stdin: &mut impl Read) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .map_err(|err| AppError::Io(format!("cannot read {}: {err}", path.display()))),
        _ => {
            let mut buf = String::new();
            stdin
                .read_to_string(&mut buf)
                .map_err(|err| AppError::Io(format!("cannot read stdin: {err}")))?;
            Ok(buf)
        }
    }
}

/// Read and decode the invocation payload.
///
/// # Errors
///
/// Returns `AppError::Io` if the payload cannot be read, or
/// `AppError::Parse` if it is not an invocation JSON document.
pub fn load_invocation(path: Option<&Path>, stdin: &mut impl Read) -> Result<InvocationEvent> {
    let payload = read_payload(path, stdin)?;
    serde_json::from_str(&payload)
        .map_err(|err| AppError::Parse(format!("invocation payload: {err}")))
}
