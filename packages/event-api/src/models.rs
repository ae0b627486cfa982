//! Wire types for the event backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which field the backend wraps successful payloads in.
///
/// Current deployments respond `{"data": ...}`, older ones `{"result": ...}`.
/// One configured unwrap strategy instead of per-call conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Envelope {
    #[default]
    Data,
    Result,
}

impl Envelope {
    pub fn field(self) -> &'static str {
        match self {
            Envelope::Data => "data",
            Envelope::Result => "result",
        }
    }

    /// Unwrap the envelope field when present, else return the body whole.
    pub fn unwrap_value(self, mut body: Value) -> Value {
        match body.get_mut(self.field()) {
            Some(inner) => inner.take(),
            None => body,
        }
    }
}

impl FromStr for Envelope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "data" => Ok(Envelope::Data),
            "result" => Ok(Envelope::Result),
            other => Err(format!("unknown envelope style '{other}' (expected 'data' or 'result')")),
        }
    }
}

/// Body of `POST /api/auth/send-verification-code`.
#[derive(Debug, Serialize)]
pub struct SendCodeRequest<'a> {
    pub email: &'a str,
}

/// Body of `POST /api/auth/verify-code`.
#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest<'a> {
    pub email: &'a str,
    pub code: &'a str,
}

/// Successful verify-code payload.
///
/// The token key changed between backend revisions (`token`, then
/// `temporaryToken`); accept either.
#[derive(Debug, Deserialize)]
pub struct VerifyPayload {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "temporaryToken")]
    temporary_token: Option<String>,
}

impl VerifyPayload {
    pub fn into_token(self) -> Option<String> {
        self.token.or(self.temporary_token)
    }
}

/// How the backend acknowledged an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyAck {
    /// 202: the application was queued; the outcome arrives later.
    Received,
    /// Any other 2xx: the backend settled the application synchronously.
    Confirmed,
}

/// Application status reported by `GET /api/event/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Confirmed,
    Rejected,
    None,
    Success,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Confirmed => "CONFIRMED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::None => "NONE",
            ApplicationStatus::Success => "SUCCESS",
        };
        f.write_str(s)
    }
}

/// Successful status payload.
#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: ApplicationStatus,
}

/// Successful admin stock payload.
#[derive(Debug, Deserialize)]
pub struct StockPayload {
    pub stock: u32,
}
