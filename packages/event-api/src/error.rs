use thiserror::Error;

/// Failures raised by the backend client.
///
/// `Transport` means the request never produced a usable response,
/// `Protocol` means the response could not be understood, and `Request`
/// means the server answered and said no. Only `Request` carries a status;
/// callers branch on it to classify outcomes (409 on apply, for example).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connect failure, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON shape the contract promises.
    #[error("malformed response: {detail}")]
    Protocol { detail: String },

    /// The server rejected the request with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Request { status: u16, message: String },
}

impl ApiError {
    pub(crate) fn protocol(detail: impl Into<String>) -> Self {
        ApiError::Protocol {
            detail: detail.into(),
        }
    }

    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-provided message of a rejected request.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Request { message, .. } => Some(message),
            _ => None,
        }
    }
}
