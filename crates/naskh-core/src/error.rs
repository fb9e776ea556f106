//! Error types for naskh

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Payload errors
    #[error("Malformed event payload: {0}")]
    MalformedPayload(String),

    #[error("Unexpected event type: expected {expected}, got {got}")]
    UnexpectedEventType { expected: String, got: String },

    // Outbound storage errors
    #[error("Transfer failed with status {status}: {message}")]
    TransferFailed { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    // Configuration errors
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// HTTP status the boundary adapter answers with. Payload problems are
    /// the sender's fault; failed transfers surface as a bad gateway so the
    /// delivery platform's retry policy engages.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::MalformedPayload(_) | Error::UnexpectedEventType { .. } => 400,

            Error::TransferFailed { .. } | Error::Transport(_) => 502,

            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(Error::MalformedPayload("no url".into()).http_status(), 400);
        assert_eq!(
            Error::TransferFailed {
                status: 403,
                message: "AuthorizationFailure".into()
            }
            .http_status(),
            502
        );
        assert_eq!(Error::Transport("connect timeout".into()).http_status(), 502);
        assert_eq!(Error::InvalidConfig("missing account".into()).http_status(), 500);
    }
}
