//! Scripted backend fake for flow tests.
//!
//! Responses are queued per operation and every call is recorded, so tests
//! can assert both the resulting state and that locally rejected actions
//! issued no request at all.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use event_api::{ApiError, ApplicationStatus, ApplyAck};

use crate::backend::EventBackend;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    SendCode { email: String },
    VerifyCode { email: String, code: String },
    Apply { token: String },
    Status { token: String },
}

/// Backend whose responses are scripted up front.
///
/// Panics if an operation runs out of scripted responses; a test that
/// triggers an unexpected request should fail loudly.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<BackendCall>>,
    send_results: Mutex<VecDeque<Result<(), ApiError>>>,
    verify_results: Mutex<VecDeque<Result<String, ApiError>>>,
    apply_results: Mutex<VecDeque<Result<ApplyAck, ApiError>>>,
    status_results: Mutex<VecDeque<Result<ApplicationStatus, ApiError>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_send(&self, result: Result<(), ApiError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn queue_verify(&self, result: Result<String, ApiError>) {
        self.verify_results.lock().unwrap().push_back(result);
    }

    pub fn queue_apply(&self, result: Result<ApplyAck, ApiError>) {
        self.apply_results.lock().unwrap().push_back(result);
    }

    pub fn queue_status(&self, result: Result<ApplicationStatus, ApiError>) {
        self.status_results.lock().unwrap().push_back(result);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next<T>(queue: &Mutex<VecDeque<Result<T, ApiError>>>, op: &str) -> Result<T, ApiError> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted result left for {op}"))
    }
}

#[async_trait]
impl EventBackend for ScriptedBackend {
    async fn send_verification_code(&self, email: &str) -> Result<(), ApiError> {
        self.record(BackendCall::SendCode {
            email: email.to_owned(),
        });
        Self::next(&self.send_results, "send_verification_code")
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<String, ApiError> {
        self.record(BackendCall::VerifyCode {
            email: email.to_owned(),
            code: code.to_owned(),
        });
        Self::next(&self.verify_results, "verify_code")
    }

    async fn apply(&self, token: &str) -> Result<ApplyAck, ApiError> {
        self.record(BackendCall::Apply {
            token: token.to_owned(),
        });
        Self::next(&self.apply_results, "apply")
    }

    async fn application_status(&self, token: &str) -> Result<ApplicationStatus, ApiError> {
        self.record(BackendCall::Status {
            token: token.to_owned(),
        });
        Self::next(&self.status_results, "application_status")
    }
}
