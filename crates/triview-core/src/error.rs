use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriviewError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TriviewError>;

/// Message shown when a transport failure carries no description.
pub const GENERIC_FAILURE: &str = "Something went wrong.";

/// Why a feedback submission failed.
///
/// The `Display` output is exactly what the user sees in the error region.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The service answered with a non-success status. The body is not inspected.
    #[error("Backend error: {0}")]
    Http(u16),

    /// No usable response: unreachable service, bad request, or unparsable body.
    #[error("{}", transport_message(.0))]
    Transport(Option<String>),
}

impl SubmitError {
    pub fn transport(description: impl Into<String>) -> Self {
        SubmitError::Transport(Some(description.into()))
    }
}

fn transport_message(description: &Option<String>) -> &str {
    match description.as_deref() {
        Some(d) if !d.trim().is_empty() => d,
        _ => GENERIC_FAILURE,
    }
}
