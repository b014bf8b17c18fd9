//! Validation error raised before any request leaves the client

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A locally detected contract violation
///
/// Always recoverable: the user corrects the input and re-triggers the
/// action. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// The error code identifying the violated rule
    pub code: ErrorCode,
    /// Message shown to the user
    pub message: String,
}

impl ValidationError {
    /// Create an error with the default message for the code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
        }
    }

    /// Create an error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Receive quantity is not a whole number in `1..=remaining`
    pub fn receive_quantity(remaining: u32) -> Self {
        Self::with_message(
            ErrorCode::InvalidReceiveQuantity,
            format!("Enter a valid quantity (1 - {})", remaining),
        )
    }

    /// Required field is missing
    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{} is required", field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_comes_from_code() {
        let err = ValidationError::new(ErrorCode::BillNoLines);
        assert_eq!(err.to_string(), "Enter at least one bill quantity");
        assert_eq!(err.code, ErrorCode::BillNoLines);
    }

    #[test]
    fn receive_quantity_message_names_the_range() {
        let err = ValidationError::receive_quantity(6);
        assert_eq!(err.message, "Enter a valid quantity (1 - 6)");
        assert_eq!(err.code, ErrorCode::InvalidReceiveQuantity);
    }
}
