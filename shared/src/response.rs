//! API response envelope
//!
//! Every collaborator response is wrapped the same way:
//! ```json
//! {
//!     "success": true,
//!     "data": { ... },
//!     "metadata": { "message": "Bill created" }
//! }
//! ```
//! Some failures arrive with a 2xx status and `"success": false`, so callers
//! must branch on `success`, not on the HTTP status alone.

use serde::{Deserialize, Serialize};

/// Optional metadata block carried next to `data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Unified response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
    /// Some endpoints put the message at the top level instead of in metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            metadata: None,
            message: None,
        }
    }

    /// Create a failed response carrying a message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            metadata: Some(ResponseMetadata {
                message: Some(message.into()),
            }),
            message: None,
        }
    }

    /// Collaborator message, preferring `metadata.message`
    pub fn message(&self) -> Option<&str> {
        pick_message(self.metadata.as_ref(), self.message.as_deref())
    }
}

fn pick_message<'a>(metadata: Option<&'a ResponseMetadata>, top: Option<&'a str>) -> Option<&'a str> {
    let present = |m: &&str| !m.trim().is_empty();
    metadata
        .and_then(|m| m.message.as_deref())
        .filter(present)
        .or(top.filter(present))
}

/// Message-only body used to read error responses of unknown shape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<&str> {
        pick_message(self.metadata.as_ref(), self.message.as_deref())
    }
}
