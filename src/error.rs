use serde::Deserialize;
use thiserror::Error;

/// Explicit error reported by the backend in an `{ "error": ... }` body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Error)]
#[error("{error}")]
pub struct RemoteError {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
            solution: None,
        }
    }

    /// Extra server context shown under the message.
    pub fn hint(&self) -> Option<String> {
        match (self.details.as_deref(), self.solution.as_deref()) {
            (Some(d), Some(s)) => Some(format!("{d} ({s})")),
            (Some(d), None) => Some(d.to_string()),
            (None, Some(s)) => Some(s.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeatingError {
    /// Local precondition failed; nothing was sent.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    /// Network or decode failure with no structured server message.
    #[error("{0}")]
    Transport(String),
}

impl SeatingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SeatingError::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        SeatingError::Transport(msg.into())
    }

    pub fn hint(&self) -> Option<String> {
        match self {
            SeatingError::Remote(r) => r.hint(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SeatingError::Validation(_) => "validation",
            SeatingError::Remote(_) => "remote",
            SeatingError::Transport(_) => "transport",
        }
    }
}
