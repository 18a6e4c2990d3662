//! Remote interaction errors, one kind per failure mode.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Http(e.to_string())
        }
    }
}

impl From<RemoteError> for unatherm_core::Error {
    fn from(e: RemoteError) -> Self {
        unatherm_core::Error::Remote(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_failure_lifts_into_core_error() {
        let err = unatherm_core::Error::from(RemoteError::Session("form page unavailable".into()));
        match err {
            unatherm_core::Error::Remote(msg) => {
                assert_eq!(msg, "Session error: form page unavailable")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
