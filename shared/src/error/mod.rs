//! Error codes and validation errors for the procurement workflow
//!
//! - [`ErrorCode`]: Standardized codes grouped by workflow step
//! - [`ValidationError`]: Local contract violation tagged with a code
//!
//! # Example
//!
//! ```
//! use shared::error::{ErrorCode, ValidationError};
//!
//! let err = ValidationError::new(ErrorCode::BillNumberRequired);
//! assert_eq!(err.to_string(), "Bill number required");
//! ```

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::ValidationError;
