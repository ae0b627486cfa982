//! Flow states.

use std::fmt;

/// The screens of the application flow, exactly one active at a time.
///
/// States from `CodeEntry` on carry the email the verification code was
/// requested for; the email cannot change without going back through
/// `EmailEntry`. `Applying` and `ApplicationReceived` also keep the auth
/// token so the status endpoint can be polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Landing screen, before the user opts in.
    Initial,
    /// Email form shown, nothing submitted yet.
    EmailEntry,
    /// A code was sent to `email`; waiting for the user to type it in.
    CodeEntry { email: String },
    /// Code accepted; `token` authorizes the apply call.
    Verified { email: String, token: String },
    /// Apply request in flight.
    Applying { email: String, token: String },
    /// The backend queued the application; the outcome arrives later.
    ApplicationReceived { email: String, token: String },
    /// Application settled in the user's favor.
    Success,
    /// Gift allocation exhausted.
    SoldOut,
    /// This email already holds an application.
    AlreadyApplied,
    /// Recoverable failure; `detail` is shown to the user.
    Error { detail: String },
}

impl FlowState {
    /// Terminal states admit no transition except a full restart.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FlowState::Success | FlowState::SoldOut | FlowState::AlreadyApplied
        )
    }

    /// The email a code was requested for, once there is one.
    pub fn email(&self) -> Option<&str> {
        match self {
            FlowState::CodeEntry { email }
            | FlowState::Verified { email, .. }
            | FlowState::Applying { email, .. }
            | FlowState::ApplicationReceived { email, .. } => Some(email),
            _ => None,
        }
    }

    /// The auth token, once verification has succeeded.
    pub fn token(&self) -> Option<&str> {
        match self {
            FlowState::Verified { token, .. }
            | FlowState::Applying { token, .. }
            | FlowState::ApplicationReceived { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Short name used in logs and wrong-state errors.
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Initial => "initial",
            FlowState::EmailEntry => "email-entry",
            FlowState::CodeEntry { .. } => "code-entry",
            FlowState::Verified { .. } => "verified",
            FlowState::Applying { .. } => "applying",
            FlowState::ApplicationReceived { .. } => "application-received",
            FlowState::Success => "success",
            FlowState::SoldOut => "sold-out",
            FlowState::AlreadyApplied => "already-applied",
            FlowState::Error { .. } => "error",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
