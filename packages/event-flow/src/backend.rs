//! Backend seam for the flow controller.

use std::sync::Arc;

use async_trait::async_trait;
use event_api::{ApiError, ApplicationStatus, ApplyAck, EventApiClient};

/// The backend operations the flow depends on.
///
/// [`EventApiClient`] is the production implementation; tests substitute a
/// scripted fake so controller behavior is checked without a network.
#[async_trait]
pub trait EventBackend: Send + Sync {
    async fn send_verification_code(&self, email: &str) -> Result<(), ApiError>;
    async fn verify_code(&self, email: &str, code: &str) -> Result<String, ApiError>;
    async fn apply(&self, token: &str) -> Result<ApplyAck, ApiError>;
    async fn application_status(&self, token: &str) -> Result<ApplicationStatus, ApiError>;
}

#[async_trait]
impl EventBackend for EventApiClient {
    async fn send_verification_code(&self, email: &str) -> Result<(), ApiError> {
        EventApiClient::send_verification_code(self, email).await
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<String, ApiError> {
        EventApiClient::verify_code(self, email, code).await
    }

    async fn apply(&self, token: &str) -> Result<ApplyAck, ApiError> {
        EventApiClient::apply(self, token).await
    }

    async fn application_status(&self, token: &str) -> Result<ApplicationStatus, ApiError> {
        EventApiClient::application_status(self, token).await
    }
}

#[async_trait]
impl<B: EventBackend + ?Sized> EventBackend for Arc<B> {
    async fn send_verification_code(&self, email: &str) -> Result<(), ApiError> {
        (**self).send_verification_code(email).await
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<String, ApiError> {
        (**self).verify_code(email, code).await
    }

    async fn apply(&self, token: &str) -> Result<ApplyAck, ApiError> {
        (**self).apply(token).await
    }

    async fn application_status(&self, token: &str) -> Result<ApplicationStatus, ApiError> {
        (**self).application_status(token).await
    }
}
