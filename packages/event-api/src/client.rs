//! The event backend client.

use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::models::{
    ApplicationStatus, ApplyAck, Envelope, SendCodeRequest, StatusPayload, StockPayload,
    VerifyCodeRequest, VerifyPayload,
};

const SEND_CODE_PATH: &str = "/api/auth/send-verification-code";
const VERIFY_CODE_PATH: &str = "/api/auth/verify-code";
const APPLY_PATH: &str = "/api/event/apply";
const STATUS_PATH: &str = "/api/event/status";
const STOCK_PATH: &str = "/api/admin/event/stock";

/// Connection options for the event backend.
#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub base_url: Url,
    pub envelope: Envelope,
    pub timeout: Duration,
}

impl ApiOptions {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            envelope: Envelope::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stateless request/response adapter for the event backend.
///
/// One HTTP request per operation, no retries. Cheap to clone; the inner
/// `reqwest::Client` shares its connection pool across clones.
#[derive(Debug, Clone)]
pub struct EventApiClient {
    options: ApiOptions,
    http: Client,
}

impl EventApiClient {
    pub fn new(options: ApiOptions) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { options, http })
    }

    /// Request a one-time verification code for `email`.
    pub async fn send_verification_code(&self, email: &str) -> Result<(), ApiError> {
        debug!(email, "requesting verification code");
        self.request(Method::POST, SEND_CODE_PATH, None, Some(&SendCodeRequest { email }))
            .await?;
        Ok(())
    }

    /// Exchange a verification code for a temporary auth token.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<String, ApiError> {
        debug!(email, "verifying code");
        let (_, payload) = self
            .request(
                Method::POST,
                VERIFY_CODE_PATH,
                None,
                Some(&VerifyCodeRequest { email, code }),
            )
            .await?;
        let payload: VerifyPayload = serde_json::from_value(payload)
            .map_err(|e| ApiError::protocol(format!("verify-code payload: {e}")))?;
        payload
            .into_token()
            .ok_or_else(|| ApiError::protocol("verify-code response carried no token"))
    }

    /// Submit the gift application. Requires the token from [`Self::verify_code`].
    pub async fn apply(&self, token: &str) -> Result<ApplyAck, ApiError> {
        debug!("submitting gift application");
        let (status, _) = self
            .request::<()>(Method::POST, APPLY_PATH, Some(token), None)
            .await?;
        if status == StatusCode::ACCEPTED {
            Ok(ApplyAck::Received)
        } else {
            Ok(ApplyAck::Confirmed)
        }
    }

    /// Look up the application status for the authenticated email.
    pub async fn application_status(&self, token: &str) -> Result<ApplicationStatus, ApiError> {
        let (_, payload) = self
            .request::<()>(Method::GET, STATUS_PATH, Some(token), None)
            .await?;
        let payload: StatusPayload = serde_json::from_value(payload)
            .map_err(|e| ApiError::protocol(format!("status payload: {e}")))?;
        Ok(payload.status)
    }

    /// Remaining gift stock. Admin-only endpoint.
    pub async fn event_stock(&self, admin_token: &str) -> Result<u32, ApiError> {
        let (_, payload) = self
            .request::<()>(Method::GET, STOCK_PATH, Some(admin_token), None)
            .await?;
        let payload: StockPayload = serde_json::from_value(payload)
            .map_err(|e| ApiError::protocol(format!("stock payload: {e}")))?;
        Ok(payload.stock)
    }

    /// Issue one request and apply the shared response contract:
    /// body parses as JSON (empty body reads as null), non-2xx raises
    /// `Request` with the body's message field, success unwraps the
    /// configured envelope.
    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<&B>,
    ) -> Result<(StatusCode, Value), ApiError> {
        let url = self
            .options
            .base_url
            .join(path)
            .map_err(|e| ApiError::protocol(format!("bad endpoint url {path}: {e}")))?;

        let mut req = self
            .http
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = parse_body(status, &text)?;

        if !status.is_success() {
            let message = failure_message(status, &value);
            warn!(status = status.as_u16(), %message, path, "event backend rejected request");
            return Err(ApiError::Request {
                status: status.as_u16(),
                message,
            });
        }

        Ok((status, self.options.envelope.unwrap_value(value)))
    }
}

/// Parse the raw body. Send-code success responses carry no payload, so an
/// empty body reads as JSON null rather than a protocol violation.
fn parse_body(status: StatusCode, text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
        .map_err(|_| ApiError::protocol(format!("response was not JSON (status {status})")))
}

/// The user-facing message for a rejected request: the body's `message`
/// field when the server sent one, else a generic message keyed by status.
fn failure_message(status: StatusCode, body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()))
}
