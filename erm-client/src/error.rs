//! Client error types

use shared::ValidationError;
use thiserror::Error;

/// Client error type
///
/// Three families reach the caller:
/// - `Validation`: detected locally, nothing was sent
/// - `Rejected`: the collaborator answered `success: false` or a non-2xx status
/// - `Http` / `Aborted` / `InvalidResponse`: the exchange did not complete
#[derive(Debug, Error)]
pub enum ClientError {
    /// Local contract violation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Collaborator refused the request
    #[error("Rejected: {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request abandoned because its view was closed
    #[error("Request aborted")]
    Aborted,

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected {
            status: None,
            message,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The request did not complete (network, timeout, abort, undecodable body)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Aborted | Self::InvalidResponse(_)
        )
    }

    /// Text to show the user for a failed `operation`
    ///
    /// Validation messages and collaborator messages are shown verbatim;
    /// everything else falls back to the per-operation text.
    pub fn user_message(&self, operation: Operation) -> String {
        match self {
            Self::Validation(err) => err.message.clone(),
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } => operation.rejection_message().to_string(),
            _ => operation.transport_message(),
        }
    }
}

/// User-triggered remote operations, used to pick fallback messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadOrder,
    ListOrders,
    CreateOrder,
    Receive,
    LoadAudit,
    CreateBill,
    LoadBill,
    ListBills,
    SubmitPayment,
    LoadPayments,
}

impl Operation {
    /// Fallback when the collaborator rejects without a message
    pub fn rejection_message(&self) -> &'static str {
        match self {
            Operation::LoadOrder => "Failed to load purchase order",
            Operation::ListOrders => "Failed to load purchase orders",
            Operation::CreateOrder => "Failed to create purchase order",
            Operation::Receive => "Receive failed",
            Operation::LoadAudit => "Failed to load audit for item",
            Operation::CreateBill => "Failed to create bill",
            Operation::LoadBill => "Failed to load bill",
            Operation::ListBills => "Failed to load bills",
            Operation::SubmitPayment => "Payment failed",
            Operation::LoadPayments => "Failed to load payment history",
        }
    }

    /// Message when the request never completed
    pub fn transport_message(&self) -> String {
        format!("{}: server unreachable", self.rejection_message())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
