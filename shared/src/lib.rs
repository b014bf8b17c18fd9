//! Shared types for the ERM procurement client
//!
//! Wire models, the response envelope, the canonical identifier and the
//! error codes used by `erm-client`.

pub mod error;
pub mod models;
pub mod response;
pub mod types;
pub mod util;

// Re-exports
pub use error::{ErrorCode, ValidationError};
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};
pub use types::{EntityId, ItemId};
