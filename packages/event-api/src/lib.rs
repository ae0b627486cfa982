//! HTTP adapter for the farewell event backend.
//!
//! The backend exposes a small REST surface: request a verification code,
//! exchange the code for a temporary auth token, apply for the gift, and
//! check the application status. Successful responses arrive wrapped in an
//! envelope field (`data` on current deployments, `result` on older ones);
//! [`Envelope`] selects which field to unwrap so callers never see the
//! wrapper.
//!
//! The client is stateless plumbing only. It raises [`ApiError`] on
//! transport failures, malformed payloads, and non-2xx statuses, and never
//! retries; deciding what is recoverable is the flow layer's job.

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiOptions, EventApiClient};
pub use error::ApiError;
pub use models::{ApplicationStatus, ApplyAck, Envelope};
