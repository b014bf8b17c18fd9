//! Purchase Bill Model

use crate::types::{EntityId, ItemId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bill payment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BillStatus {
    #[default]
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl BillStatus {
    /// Derive the status from amounts alone
    ///
    /// A zero-total bill has nothing outstanding and counts as `Paid`.
    pub fn from_amounts(total: Decimal, paid: Decimal) -> Self {
        if paid >= total {
            BillStatus::Paid
        } else if paid <= Decimal::ZERO {
            BillStatus::Unpaid
        } else {
            BillStatus::PartiallyPaid
        }
    }
}

/// One billed line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub amount: Decimal,
}

/// Purchase bill generated from a purchase order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseBill {
    #[serde(alias = "_id", default)]
    pub id: EntityId,
    pub bill_number: String,
    #[serde(default)]
    pub bill_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<EntityId>,
    #[serde(default)]
    pub purchase_order_id: EntityId,
    #[serde(default)]
    pub items: Vec<BillLine>,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub sub_total: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub paid_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float", default)]
    pub balance_amount: Decimal,
    /// Status label reported by the collaborator
    #[serde(rename = "status", default, skip_serializing_if = "Option::is_none")]
    pub reported_status: Option<BillStatus>,
}

impl PurchaseBill {
    /// Status derived from `total_amount` and `paid_amount`
    pub fn status(&self) -> BillStatus {
        BillStatus::from_amounts(self.total_amount, self.paid_amount)
    }

    /// Whether a payment can still be recorded
    pub fn can_pay(&self) -> bool {
        self.balance_amount > Decimal::ZERO
    }
}

/// Requested quantity for one bill line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillLineInput {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Create bill payload sent to `/purchase-bill`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillRequest {
    pub purchase_order_id: EntityId,
    pub bill_number: String,
    pub bill_date: NaiveDate,
    pub items: Vec<BillLineInput>,
}

/// Bill list filter (query string of `GET /purchase-bill`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BillStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
}
