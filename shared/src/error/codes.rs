//! Error codes for the ERM procurement client
//!
//! Codes are grouped by the workflow step that raises them:
//! - 0xxx: General errors
//! - 4xxx: Purchase order and receiving errors
//! - 5xxx: Payment errors
//! - 6xxx: Purchase bill errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so the same code can travel through logs,
/// JSON payloads and UI message tables unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order / Receiving ====================
    /// Order line not found in the loaded purchase order
    OrderItemNotFound = 4006,
    /// Purchase order has no lines
    OrderEmpty = 4007,
    /// Receive quantity is empty, not a whole number or not positive
    InvalidReceiveQuantity = 4101,
    /// Receive quantity is larger than the remaining quantity
    ReceiveExceedsRemaining = 4102,
    /// Purchase order is not loaded in the view
    OrderNotLoaded = 4103,

    // ==================== 5xxx: Payment ====================
    /// Payment amount missing, non-numeric or not positive
    PaymentInvalidAmount = 5004,
    /// Payment amount is larger than the bill balance
    PaymentExceedsBalance = 5005,
    /// Bill is not loaded in the view
    BillNotLoaded = 5006,

    // ==================== 6xxx: Purchase Bill ====================
    /// Bill number is empty
    BillNumberRequired = 6001,
    /// No positive bill quantities were entered
    BillNoLines = 6002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            ErrorCode::OrderItemNotFound => "Order item not found",
            ErrorCode::OrderEmpty => "Purchase order has no items",
            ErrorCode::InvalidReceiveQuantity => "Enter a valid quantity",
            ErrorCode::ReceiveExceedsRemaining => "Quantity exceeds remaining",
            ErrorCode::OrderNotLoaded => "Purchase order not loaded",

            ErrorCode::PaymentInvalidAmount => "Enter valid amount",
            ErrorCode::PaymentExceedsBalance => "Amount cannot exceed balance",
            ErrorCode::BillNotLoaded => "Bill not loaded",

            ErrorCode::BillNumberRequired => "Bill number required",
            ErrorCode::BillNoLines => "Enter at least one bill quantity",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            4006 => Ok(ErrorCode::OrderItemNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4101 => Ok(ErrorCode::InvalidReceiveQuantity),
            4102 => Ok(ErrorCode::ReceiveExceedsRemaining),
            4103 => Ok(ErrorCode::OrderNotLoaded),

            5004 => Ok(ErrorCode::PaymentInvalidAmount),
            5005 => Ok(ErrorCode::PaymentExceedsBalance),
            5006 => Ok(ErrorCode::BillNotLoaded),

            6001 => Ok(ErrorCode::BillNumberRequired),
            6002 => Ok(ErrorCode::BillNoLines),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
