//! ERM Client - procurement client core
//!
//! Receiving against purchase orders, billing what was received and paying
//! bills, over the ERM backend's HTTP API.
//!
//! Each page of the console maps to a session owning one view store:
//! [`OrderSession`] (receive + audit), [`BillDraft`] (create bill) and
//! [`BillSession`] (bill + payments). Sessions talk to the backend through
//! the [`ErmApi`] trait; [`NetworkHttpClient`] is the reqwest implementation.

pub mod bill;
pub mod config;
pub mod error;
pub mod http;
pub mod inflight;
pub mod ledger;
pub mod logger;
pub mod order;
pub mod payment;
pub mod receipt;
pub mod store;

pub use bill::{BillDraft, BillOutcome};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, Operation};
pub use http::{ErmApi, NetworkHttpClient};
pub use payment::{BillSession, PaymentOutcome};
pub use receipt::{AuditOutcome, OrderSession, ReceiveOutcome};

// Re-export shared types for convenience
pub use shared::models;
pub use shared::{EntityId, ErrorCode, ItemId, ValidationError};
