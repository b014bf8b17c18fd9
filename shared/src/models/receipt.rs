//! Goods receipt models

use crate::types::{EntityId, ItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Receiving action tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiveAction {
    #[default]
    Receive,
}

/// Receive request sent to `/purchaseOrder/{id}/receive`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    pub received_by: String,
    pub action: ReceiveAction,
}

impl ReceiveRequest {
    pub fn new(item_id: ItemId, quantity: u32, received_by: impl Into<String>) -> Self {
        Self {
            item_id,
            quantity,
            received_by: received_by.into(),
            action: ReceiveAction::Receive,
        }
    }
}

/// Audit record of one receiving action (append-only)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptEvent {
    #[serde(alias = "_id", default)]
    pub id: EntityId,
    #[serde(default)]
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(default)]
    pub action: ReceiveAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
