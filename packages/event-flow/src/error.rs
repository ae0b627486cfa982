use event_api::ApiError;
use thiserror::Error;

/// Failures surfaced by the flow controller.
///
/// The first four variants are local pre-flight rejections and guarantee
/// that no request was made. `Api` wraps everything the backend said no to;
/// the controller classifies apply conflicts into terminal states before
/// returning it.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Input failed the local shape check.
    #[error("invalid input: {0}")]
    Validation(&'static str),

    /// Resend attempted while the cooldown is still counting down.
    #[error("resend available in {remaining}s")]
    CooldownActive { remaining: u64 },

    /// Apply attempted without a verified token.
    #[error("verification required before applying")]
    AuthRequired,

    /// The action is not legal on the current screen.
    #[error("cannot {action} from the {state} screen")]
    WrongState {
        action: &'static str,
        state: &'static str,
    },

    /// The backend rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FlowError {
    /// True when the failure was raised locally, before any network call.
    pub fn is_local(&self) -> bool {
        !matches!(self, FlowError::Api(_))
    }
}
