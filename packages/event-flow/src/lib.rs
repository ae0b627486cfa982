//! Client-side flow for the farewell gift event.
//!
//! The flow walks one user from the landing screen through email
//! verification to a first-come-first-served gift application:
//!
//! ```text
//! Initial → EmailEntry → CodeEntry → Verified → Applying
//!                                                  ├─ ApplicationReceived → Success
//!                                                  ├─ Success
//!                                                  ├─ SoldOut            (terminal)
//!                                                  ├─ AlreadyApplied     (terminal)
//!                                                  └─ Error              (recoverable)
//! ```
//!
//! [`FlowController`] owns the state, validates input locally, arms the
//! resend cooldown, and drives an [`EventBackend`]. Rendering the state is
//! the caller's concern; correctness of "first come, first served" is the
//! backend's.

pub mod backend;
pub mod controller;
pub mod cooldown;
pub mod error;
pub mod state;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::EventBackend;
pub use controller::{FlowController, RESEND_COOLDOWN_SECS};
pub use cooldown::Cooldown;
pub use error::FlowError;
pub use state::FlowState;
