use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error envelope returned by the DEV API for non-success responses.
///
/// Upstream sends `{"error": "...", "status": 422}`. Some validation failures
/// carry extra per-field detail, which is kept verbatim in [`Self::errors`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human readable message from the server.
    pub error: String,
    /// Status code echoed in the body, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Field-level validation detail, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// API token is empty or cannot be sent as a header value.
    #[error("invalid API token: must be a non-empty, header-safe string")]
    InvalidToken,

    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Request path is not relative to the base URL or cannot be joined to it.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// The requested endpoint name is not present in the catalog.
    #[error("unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    /// A required path template parameter was not provided.
    #[error("missing required path parameter '{parameter}' for endpoint '{endpoint}'")]
    MissingPathParameter { endpoint: String, parameter: String },

    /// Request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// HTTP transport-layer failure (DNS, connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status with a decoded error envelope.
    #[error("server returned status {status}: {}", .error.error)]
    Api {
        status: reqwest::StatusCode,
        error: ApiErrorBody,
    },

    /// Non-success HTTP status whose body is not an error envelope.
    #[error("server returned status {status} with an undecodable error body: {source}")]
    UndecodableErrorBody {
        status: reqwest::StatusCode,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// Successful response body could not be decoded into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A resource timestamp could not be parsed while ordering results.
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A string did not name a known variant of an API enum.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl ClientError {
    /// Returns `true` when the request exceeded the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(error) if error.is_timeout())
    }

    /// HTTP status of a server-side failure, if this error carries one.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } | Self::UndecodableErrorBody { status, .. } => Some(*status),
            Self::Transport(error) => error.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiErrorBody, ClientError};

    #[test]
    fn decodes_upstream_envelope() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error":"Title can't be blank","status":422}"#)
                .expect("valid envelope");
        assert_eq!(body.error, "Title can't be blank");
        assert_eq!(body.status, Some(422));
        assert!(body.errors.is_none());
    }

    #[test]
    fn api_error_display_carries_upstream_message() {
        let error = ClientError::Api {
            status: reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            error: ApiErrorBody {
                error: "Title can't be blank".to_owned(),
                status: Some(422),
                errors: None,
            },
        };
        assert_eq!(
            error.to_string(),
            "server returned status 422 Unprocessable Entity: Title can't be blank"
        );
        assert_eq!(
            error.status(),
            Some(reqwest::StatusCode::UNPROCESSABLE_ENTITY)
        );
        assert!(!error.is_timeout());
    }
}
