use crate::transport::{BoxError, Response, ResponseBody};
use reqwest::header::InvalidHeaderValue;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not complete the exchange (refused, timed out, ...).
    #[error("HTTP transport error: {0}")]
    Transport(#[source] BoxError),

    /// The relative path could not be resolved against the base URL.
    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request payload could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The configured user agent is not a valid header value.
    #[error("invalid header value: {0}")]
    Header(#[from] InvalidHeaderValue),

    /// The service answered with anything other than 200 OK.
    #[error(transparent)]
    Api(#[from] ErrorResponse),

    /// A 200 response whose body could not be read to the end.
    #[error("{} {}: failed to read response body: {source}", .response.method, .response.url)]
    ReadBody { response: Response, source: BoxError },

    /// A 200 response whose body does not match the expected shape.
    #[error("{} {}: failed to decode response body: {source}", .response.method, .response.url)]
    Decode {
        response: Response,
        source: serde_json::Error,
    },
}

impl Error {
    /// HTTP status of the response behind this error, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(err) => Some(err.response.status),
            Self::ReadBody { response, .. } | Self::Decode { response, .. } => {
                Some(response.status)
            }
            Self::Transport(_) | Self::Url(_) | Self::Encode(_) | Self::Header(_) => None,
        }
    }

    /// The structured API error, if this is one.
    #[must_use]
    pub fn as_api_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// An error reported by the authentication service.
///
/// The descriptive fields are best effort: they stay empty when the body was
/// missing or not JSON, but `response` is always present.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub response: Response,
    /// Machine-readable error code, e.g. `ForbiddenOperationException`
    pub error_name: String,
    /// Human-readable description
    pub error_message: String,
    /// Upstream cause, often empty
    pub cause: String,
}

impl ErrorResponse {
    /// Builds an error from a response head and whatever body came with it.
    ///
    /// Each field is read on its own, so a field of the wrong type is left
    /// empty without losing the others.
    #[must_use]
    pub fn from_body(response: Response, body: &[u8]) -> Self {
        let parsed: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |key: &str| {
            parsed
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            error_name: field("error"),
            error_message: field("errorMessage"),
            cause: field("cause"),
            response,
        }
    }

    /// HTTP status the service answered with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// True for the error the service uses for bad credentials and tokens.
    #[must_use]
    pub fn is_forbidden_operation(&self) -> bool {
        self.error_name == "ForbiddenOperationException"
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: ({}) {}",
            self.response.method, self.response.url, self.error_name, self.error_message
        )?;
        if !self.cause.is_empty() {
            write!(f, " (caused by {})", self.cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

/// Checks a response for an API error.
///
/// Only an exact 200 counts as success; every other status, 201 and 204
/// included, is an error. On success the untouched body is handed back. On
/// failure it is read (errors reading it are tolerated) and released.
///
/// # Errors
/// Returns an [`ErrorResponse`] for any status other than 200.
pub async fn check_response(
    response: &Response,
    body: Box<dyn ResponseBody>,
) -> Result<Box<dyn ResponseBody>, ErrorResponse> {
    if response.status == StatusCode::OK {
        return Ok(body);
    }

    let data = match body.read_all().await {
        Ok(data) => data,
        Err(err) => {
            tracing::debug!("Could not read error body from {}: {}", response.url, err);
            Vec::new()
        }
    };

    let error = ErrorResponse::from_body(response.clone(), &data);
    tracing::warn!(
        status = response.status.as_u16(),
        error = %error.error_name,
        "{} {} rejected by service",
        response.method,
        response.url
    );
    Err(error)
}
