//! Purchase Order Model

use crate::types::{EntityId, ItemId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One line of a purchase order
///
/// Quantities are counters maintained by the collaborator:
/// `billed <= received <= ordered` holds after every accepted mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub item_id: ItemId,
    #[serde(default)]
    pub name: String,
    /// Ordered quantity (`quantity` on the wire)
    #[serde(rename = "quantity")]
    pub ordered_quantity: u32,
    /// Received so far (`recivedQuantity` on the wire)
    #[serde(rename = "recivedQuantity", alias = "receivedQuantity", default)]
    pub received_quantity: u32,
    /// Already included in purchase bills
    #[serde(default)]
    pub billed_quantity: u32,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub rate: Decimal,
    /// As supplied by the collaborator, never recomputed
    #[serde(with = "rust_decimal::serde::float", default)]
    pub amount: Decimal,
}

/// Receiving progress of a purchase order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderProgress {
    /// At least one line still has quantity left to receive
    Open,
    /// Every line is fully received
    FullyReceived,
}

/// Purchase order header plus its lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(alias = "_id", default)]
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
    #[serde(default)]
    pub supplier_name: String,
    /// Order date as sent by the collaborator
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    /// Subtotal
    #[serde(with = "rust_decimal::serde::float", default)]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    /// Status label reported by the collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PurchaseOrder {
    /// Find a line by item id
    pub fn line(&self, item_id: &str) -> Option<&OrderLine> {
        self.items.iter().find(|l| l.item_id.as_str() == item_id)
    }

    /// Find a line by item id for in-place update
    pub fn line_mut(&mut self, item_id: &str) -> Option<&mut OrderLine> {
        self.items.iter_mut().find(|l| l.item_id.as_str() == item_id)
    }
}

/// A line of a new purchase order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(
        with = "rust_decimal::serde::float_option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Create purchase order payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrder {
    pub supplier_id: EntityId,
    pub supplier_name: String,
    pub date: NaiveDate,
    pub items: Vec<NewOrderLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}
