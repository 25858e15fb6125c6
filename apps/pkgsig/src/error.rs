//! CLI error handling

use std::fmt;

use pkgsig_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Error from a pkgsig crate
    Pkgsig(pkgsig_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error while rendering output
    Io(std::io::Error),
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Pkgsig(e) if e.is_cancelled() => 130,
            CliError::InvalidArguments(_) => 64,
            _ => 1,
        }
    }

    /// Machine-readable rendering for `--json`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CliError::Pkgsig(e) => serde_json::json!({
                "error": {
                    "message": e.user_message(),
                    "code": e.user_code(),
                    "hint": e.user_hint(),
                    "retryable": e.is_retryable(),
                }
            }),
            other => serde_json::json!({
                "error": { "message": other.to_string() }
            }),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Pkgsig(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pkgsig(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<pkgsig_errors::Error> for CliError {
    fn from(e: pkgsig_errors::Error) -> Self {
        CliError::Pkgsig(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
