//! The application flow controller.
//!
//! Owns the current [`FlowState`] and the resend cooldown, validates user
//! input locally, and orchestrates backend calls. Every action takes
//! `&mut self`, which structurally serializes them: one controller can
//! never have two requests in flight, so a double-submitted apply cannot
//! race itself.

use tracing::{debug, info, warn};

use event_api::{ApiError, ApplicationStatus, ApplyAck};

use crate::backend::EventBackend;
use crate::cooldown::Cooldown;
use crate::error::FlowError;
use crate::state::FlowState;
use crate::validate;

/// Seconds the user must wait between verification-code sends.
pub const RESEND_COOLDOWN_SECS: u64 = 60;

pub struct FlowController<B: EventBackend> {
    backend: B,
    state: FlowState,
    cooldown: Cooldown,
}

impl<B: EventBackend> FlowController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: FlowState::Initial,
            cooldown: Cooldown::new(),
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Seconds until resend unlocks; zero when available.
    pub fn resend_available_in(&self) -> u64 {
        self.cooldown.remaining()
    }

    /// Leave the landing (or error) screen for the email form.
    pub fn start_application(&mut self) -> Result<&FlowState, FlowError> {
        match self.state {
            FlowState::Initial | FlowState::Error { .. } => {
                self.state = FlowState::EmailEntry;
                Ok(&self.state)
            }
            _ => Err(self.wrong_state("start the application")),
        }
    }

    /// Request a verification code for `email`.
    pub async fn send_code(&mut self, email: &str) -> Result<&FlowState, FlowError> {
        if !matches!(self.state, FlowState::EmailEntry) {
            return Err(self.wrong_state("send a code"));
        }
        validate::require_email(email)?;

        match self.backend.send_verification_code(email).await {
            Ok(()) => {
                info!(email, "verification code sent");
                self.cooldown.start(RESEND_COOLDOWN_SECS);
                self.state = FlowState::CodeEntry {
                    email: email.to_owned(),
                };
                Ok(&self.state)
            }
            Err(err) => {
                let detail = err.to_string();
                warn!(error = %detail, "sending verification code failed");
                self.state = FlowState::Error { detail };
                Err(err.into())
            }
        }
    }

    /// Send a fresh code to the email already on file. Locally rejected
    /// while the cooldown is counting down.
    pub async fn resend_code(&mut self) -> Result<&FlowState, FlowError> {
        let email = match &self.state {
            FlowState::CodeEntry { email } => email.clone(),
            _ => return Err(self.wrong_state("resend the code")),
        };
        let remaining = self.cooldown.remaining();
        if remaining > 0 {
            debug!(remaining, "resend rejected while cooldown active");
            return Err(FlowError::CooldownActive { remaining });
        }

        match self.backend.send_verification_code(&email).await {
            Ok(()) => {
                info!(email = %email, "verification code resent");
                self.cooldown.start(RESEND_COOLDOWN_SECS);
                Ok(&self.state)
            }
            Err(err) => {
                let detail = err.to_string();
                warn!(error = %detail, "resending verification code failed");
                self.cooldown.stop();
                self.state = FlowState::Error { detail };
                Err(err.into())
            }
        }
    }

    /// Exchange the emailed code for an auth token.
    pub async fn verify_code(&mut self, code: &str) -> Result<&FlowState, FlowError> {
        let email = match &self.state {
            FlowState::CodeEntry { email } => email.clone(),
            _ => return Err(self.wrong_state("verify a code")),
        };
        validate::require_code(code)?;

        match self.backend.verify_code(&email, code).await {
            Ok(token) => {
                info!(email = %email, "email verified");
                self.cooldown.stop();
                self.state = FlowState::Verified { email, token };
                Ok(&self.state)
            }
            Err(err) => {
                // The user can correct the code; stay on the entry screen.
                warn!(error = %err, "code verification failed");
                Err(err.into())
            }
        }
    }

    /// Submit the gift application.
    ///
    /// Requires the token from a successful verification; without one this
    /// fails with [`FlowError::AuthRequired`] and issues no request.
    pub async fn apply(&mut self) -> Result<&FlowState, FlowError> {
        let (email, token) = match &self.state {
            FlowState::Verified { email, token } => (email.clone(), token.clone()),
            FlowState::Applying { .. } | FlowState::ApplicationReceived { .. } => {
                return Err(self.wrong_state("apply"))
            }
            s if s.is_terminal() => return Err(self.wrong_state("apply")),
            _ => return Err(FlowError::AuthRequired),
        };
        if token.is_empty() {
            return Err(FlowError::AuthRequired);
        }

        self.state = FlowState::Applying {
            email: email.clone(),
            token: token.clone(),
        };
        match self.backend.apply(&token).await {
            Ok(ApplyAck::Received) => {
                info!("application received, outcome pending");
                self.state = FlowState::ApplicationReceived { email, token };
                Ok(&self.state)
            }
            Ok(ApplyAck::Confirmed) => {
                info!("application confirmed");
                self.state = FlowState::Success;
                Ok(&self.state)
            }
            Err(err) => {
                self.state = classify_apply_failure(&err);
                warn!(error = %err, outcome = self.state.name(), "apply rejected");
                Err(err.into())
            }
        }
    }

    /// Poll the status endpoint and fold the answer into the flow.
    pub async fn check_status(&mut self) -> Result<&FlowState, FlowError> {
        let token = match &self.state {
            FlowState::Verified { token, .. }
            | FlowState::ApplicationReceived { token, .. } => token.clone(),
            _ => return Err(self.wrong_state("check the status")),
        };

        let status = self.backend.application_status(&token).await?;
        debug!(%status, "application status fetched");
        match status {
            ApplicationStatus::Confirmed | ApplicationStatus::Success => {
                self.state = FlowState::Success;
            }
            ApplicationStatus::Rejected => {
                self.state = FlowState::SoldOut;
            }
            // Still queued, or no application on file yet.
            ApplicationStatus::Pending | ApplicationStatus::None => {}
        }
        Ok(&self.state)
    }

    /// Drop everything and return to the landing screen. The only way out
    /// of a terminal state.
    pub fn restart(&mut self) -> &FlowState {
        debug!(from = self.state.name(), "flow restarted");
        self.cooldown.stop();
        self.state = FlowState::Initial;
        &self.state
    }

    fn wrong_state(&self, action: &'static str) -> FlowError {
        FlowError::WrongState {
            action,
            state: self.state.name(),
        }
    }
}

/// Map an apply failure onto the outcome screen. A 409 means the backend
/// settled the question: either this email already applied, or the stock
/// ran out. Anything else stays recoverable.
fn classify_apply_failure(err: &ApiError) -> FlowState {
    match err {
        ApiError::Request {
            status: 409,
            message,
        } if message.to_lowercase().contains("already applied") => FlowState::AlreadyApplied,
        ApiError::Request { status: 409, .. } => FlowState::SoldOut,
        _ => FlowState::Error {
            detail: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{BackendCall, ScriptedBackend};

    fn conflict(message: &str) -> ApiError {
        ApiError::Request {
            status: 409,
            message: message.into(),
        }
    }

    fn controller() -> (Arc<ScriptedBackend>, FlowController<Arc<ScriptedBackend>>) {
        let backend = Arc::new(ScriptedBackend::new());
        let controller = FlowController::new(Arc::clone(&backend));
        (backend, controller)
    }

    /// Run a controller up to `Verified` with token "T".
    async fn verified(
    ) -> (Arc<ScriptedBackend>, FlowController<Arc<ScriptedBackend>>) {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        backend.queue_verify(Ok("T".into()));
        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();
        ctl.verify_code("123456").await.unwrap();
        (backend, ctl)
    }

    #[tokio::test]
    async fn malformed_email_never_reaches_the_backend() {
        let (backend, mut ctl) = controller();
        ctl.start_application().unwrap();

        for email in ["", "plain", "a@b", "@b.com", "a b@c.com"] {
            let err = ctl.send_code(email).await.unwrap_err();
            assert!(matches!(err, FlowError::Validation(_)), "{email}");
        }

        assert_eq!(backend.call_count(), 0);
        assert_eq!(*ctl.state(), FlowState::EmailEntry);
    }

    #[tokio::test(start_paused = true)]
    async fn send_code_enters_code_entry_and_arms_cooldown() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        ctl.start_application().unwrap();

        ctl.send_code("a@b.com").await.unwrap();
        assert_eq!(
            *ctl.state(),
            FlowState::CodeEntry {
                email: "a@b.com".into()
            }
        );
        assert_eq!(ctl.resend_available_in(), RESEND_COOLDOWN_SECS);
        assert_eq!(
            backend.calls(),
            vec![BackendCall::SendCode {
                email: "a@b.com".into()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn resend_before_expiry_is_rejected_without_a_call() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();

        let err = ctl.resend_code().await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::CooldownActive {
                remaining: RESEND_COOLDOWN_SECS
            }
        ));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn resend_after_expiry_issues_one_call_and_rearms() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        backend.queue_send(Ok(()));
        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(61)).await;
        assert_eq!(ctl.resend_available_in(), 0);

        ctl.resend_code().await.unwrap();
        assert_eq!(ctl.resend_available_in(), RESEND_COOLDOWN_SECS);
        assert_eq!(backend.call_count(), 2);
        assert_eq!(
            *ctl.state(),
            FlowState::CodeEntry {
                email: "a@b.com".into()
            }
        );
    }

    #[tokio::test]
    async fn send_failure_surfaces_a_recoverable_error() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Err(ApiError::Request {
            status: 500,
            message: "send failed".into(),
        }));
        ctl.start_application().unwrap();

        ctl.send_code("a@b.com").await.unwrap_err();
        assert_eq!(
            *ctl.state(),
            FlowState::Error {
                detail: "HTTP 500: send failed".into()
            }
        );

        // Recoverable: the user can start over from the error screen.
        ctl.start_application().unwrap();
        assert_eq!(*ctl.state(), FlowState::EmailEntry);
    }

    #[tokio::test]
    async fn short_code_is_rejected_locally() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();

        let err = ctl.verify_code("123").await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
        // Only the send call reached the backend.
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn verify_success_holds_exactly_the_returned_token() {
        let (_backend, ctl) = verified().await;
        assert_eq!(
            *ctl.state(),
            FlowState::Verified {
                email: "a@b.com".into(),
                token: "T".into()
            }
        );
        // Leaving the code-entry screen tears the cooldown down.
        assert_eq!(ctl.resend_available_in(), 0);
    }

    #[tokio::test]
    async fn verify_failure_stays_on_code_entry() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        backend.queue_verify(Err(ApiError::Request {
            status: 400,
            message: "invalid code".into(),
        }));
        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();

        let err = ctl.verify_code("999999").await.unwrap_err();
        assert!(matches!(err, FlowError::Api(_)));
        assert_eq!(
            *ctl.state(),
            FlowState::CodeEntry {
                email: "a@b.com".into()
            }
        );
    }

    #[tokio::test]
    async fn apply_without_a_token_is_auth_required_and_offline() {
        let (backend, mut ctl) = controller();
        ctl.start_application().unwrap();

        let err = ctl.apply().await.unwrap_err();
        assert!(matches!(err, FlowError::AuthRequired));
        assert_eq!(backend.call_count(), 0);
        assert_eq!(*ctl.state(), FlowState::EmailEntry);
    }

    #[tokio::test]
    async fn apply_with_an_empty_token_is_auth_required_and_offline() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        backend.queue_verify(Ok(String::new()));
        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();
        ctl.verify_code("123456").await.unwrap();

        let err = ctl.apply().await.unwrap_err();
        assert!(matches!(err, FlowError::AuthRequired));
        // send + verify only; no apply call went out.
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn apply_202_yields_application_received() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Ok(ApplyAck::Received));

        ctl.apply().await.unwrap();
        assert_eq!(
            *ctl.state(),
            FlowState::ApplicationReceived {
                email: "a@b.com".into(),
                token: "T".into()
            }
        );
        assert_eq!(
            backend.calls().last(),
            Some(&BackendCall::Apply { token: "T".into() })
        );
    }

    #[tokio::test]
    async fn apply_synchronous_2xx_yields_success() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Ok(ApplyAck::Confirmed));

        ctl.apply().await.unwrap();
        assert_eq!(*ctl.state(), FlowState::Success);
    }

    #[tokio::test]
    async fn apply_conflict_with_already_applied_message() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Err(conflict("already applied")));

        ctl.apply().await.unwrap_err();
        assert_eq!(*ctl.state(), FlowState::AlreadyApplied);
    }

    #[tokio::test]
    async fn apply_conflict_with_any_other_message_is_sold_out() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Err(conflict("event stock exhausted")));

        ctl.apply().await.unwrap_err();
        assert_eq!(*ctl.state(), FlowState::SoldOut);
    }

    #[tokio::test]
    async fn apply_server_error_is_recoverable() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Err(ApiError::Request {
            status: 500,
            message: "boom".into(),
        }));

        ctl.apply().await.unwrap_err();
        assert_eq!(
            *ctl.state(),
            FlowState::Error {
                detail: "HTTP 500: boom".into()
            }
        );
        ctl.start_application().unwrap();
    }

    #[tokio::test]
    async fn full_flow_from_landing_to_application_received() {
        let (backend, mut ctl) = controller();
        backend.queue_send(Ok(()));
        backend.queue_verify(Ok("T".into()));
        backend.queue_apply(Ok(ApplyAck::Received));

        ctl.start_application().unwrap();
        ctl.send_code("a@b.com").await.unwrap();
        assert_eq!(ctl.resend_available_in(), RESEND_COOLDOWN_SECS);
        ctl.verify_code("123456").await.unwrap();
        assert_eq!(ctl.state().token(), Some("T"));
        ctl.apply().await.unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::SendCode {
                    email: "a@b.com".into()
                },
                BackendCall::VerifyCode {
                    email: "a@b.com".into(),
                    code: "123456".into()
                },
                BackendCall::Apply { token: "T".into() },
            ]
        );
        assert!(matches!(
            ctl.state(),
            FlowState::ApplicationReceived { .. }
        ));
    }

    #[tokio::test]
    async fn terminal_state_admits_only_restart() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Err(conflict("already applied")));
        ctl.apply().await.unwrap_err();
        assert_eq!(*ctl.state(), FlowState::AlreadyApplied);

        assert!(matches!(
            ctl.start_application().unwrap_err(),
            FlowError::WrongState { .. }
        ));
        assert!(matches!(
            ctl.send_code("a@b.com").await.unwrap_err(),
            FlowError::WrongState { .. }
        ));
        assert!(matches!(
            ctl.apply().await.unwrap_err(),
            FlowError::WrongState { .. }
        ));

        assert_eq!(*ctl.restart(), FlowState::Initial);
        assert_eq!(ctl.resend_available_in(), 0);
    }

    #[tokio::test]
    async fn reapplying_after_receipt_is_a_wrong_state() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Ok(ApplyAck::Received));
        ctl.apply().await.unwrap();

        let err = ctl.apply().await.unwrap_err();
        assert!(matches!(err, FlowError::WrongState { .. }));
        // One apply call total.
        let applies = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::Apply { .. }))
            .count();
        assert_eq!(applies, 1);
    }

    #[tokio::test]
    async fn check_status_folds_the_answer_into_the_flow() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Ok(ApplyAck::Received));
        ctl.apply().await.unwrap();

        backend.queue_status(Ok(ApplicationStatus::Pending));
        ctl.check_status().await.unwrap();
        assert!(matches!(
            ctl.state(),
            FlowState::ApplicationReceived { .. }
        ));

        backend.queue_status(Ok(ApplicationStatus::Confirmed));
        ctl.check_status().await.unwrap();
        assert_eq!(*ctl.state(), FlowState::Success);
    }

    #[tokio::test]
    async fn rejected_status_means_sold_out() {
        let (backend, mut ctl) = verified().await;
        backend.queue_apply(Ok(ApplyAck::Received));
        ctl.apply().await.unwrap();

        backend.queue_status(Ok(ApplicationStatus::Rejected));
        ctl.check_status().await.unwrap();
        assert_eq!(*ctl.state(), FlowState::SoldOut);
    }

    #[tokio::test]
    async fn check_status_needs_a_token() {
        let (backend, mut ctl) = controller();
        ctl.start_application().unwrap();
        let err = ctl.check_status().await.unwrap_err();
        assert!(matches!(err, FlowError::WrongState { .. }));
        assert_eq!(backend.call_count(), 0);
    }
}
