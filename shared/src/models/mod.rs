//! Data models
//!
//! Wire types exchanged with the procurement backend. JSON keys are
//! camelCase; identifiers accept both `id` and `_id`.

pub mod payment;
pub mod purchase_bill;
pub mod purchase_order;
pub mod receipt;

// Re-exports
pub use payment::*;
pub use purchase_bill::*;
pub use purchase_order::*;
pub use receipt::*;
