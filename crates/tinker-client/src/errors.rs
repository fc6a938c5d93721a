//! Error taxonomy for playground runs.
//!
//! Failures are terminal per run: there are no automatic retries, and a failed
//! instance never rolls back other instances' in-flight runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error for backend calls and run orchestration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PlaygroundError {
    /// The backend rejected or failed the request.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },
    /// The stream broke after it was established.
    #[error("stream error: {message}")]
    Stream { message: String },
    /// The caller aborted the run.
    #[error("run aborted")]
    Aborted,
    /// The snapshot could not be turned into a request.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl PlaygroundError {
    pub fn backend(message: impl Into<String>) -> Self {
        PlaygroundError::Backend {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        PlaygroundError::Stream {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        PlaygroundError::InvalidRequest {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_message() {
        let err = PlaygroundError::backend("model overloaded");
        assert_eq!(err.to_string(), "backend error: model overloaded");
        assert_eq!(PlaygroundError::Aborted.to_string(), "run aborted");
    }

    #[test]
    fn error_serializes_with_discriminant() {
        let err = PlaygroundError::stream("connection reset");
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["type"], "stream");
        assert_eq!(json["data"]["message"], "connection reset");
    }
}
