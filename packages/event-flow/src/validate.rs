//! Local pre-flight validation. Violations never reach the network.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FlowError;

/// Length of the one-time verification code.
pub const CODE_LEN: usize = 6;

lazy_static! {
    /// `user@domain.tld` shape. Deliberately loose; the backend owns real
    /// deliverability checks.
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

pub fn is_valid_code(code: &str) -> bool {
    code.chars().count() == CODE_LEN
}

pub(crate) fn require_email(email: &str) -> Result<(), FlowError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(FlowError::Validation("email must look like user@domain.tld"))
    }
}

pub(crate) fn require_code(code: &str) -> Result<(), FlowError> {
    if is_valid_code(code) {
        Ok(())
    } else {
        Err(FlowError::Validation("verification code must be 6 characters"))
    }
}
