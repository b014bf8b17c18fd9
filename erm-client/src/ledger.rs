//! Quantity ledger
//!
//! Pure functions over order lines. Inputs are snapshots from the
//! collaborator and may be stale; results are clamped at zero instead of
//! going negative.

use shared::models::{OrderLine, OrderProgress, PurchaseOrder};

/// Quantity still to be received: `max(0, ordered - received)`
#[inline]
pub fn remaining(line: &OrderLine) -> u32 {
    line.ordered_quantity.saturating_sub(line.received_quantity)
}

/// Quantity received but not yet billed: `max(0, received - billed)`
#[inline]
pub fn billable(line: &OrderLine) -> u32 {
    line.received_quantity.saturating_sub(line.billed_quantity)
}

/// Receiving progress of the whole order
pub fn progress(order: &PurchaseOrder) -> OrderProgress {
    if order.items.iter().any(|l| remaining(l) > 0) {
        OrderProgress::Open
    } else {
        OrderProgress::FullyReceived
    }
}

/// Whether "Generate Bill" has anything to bill
pub fn has_billable_lines(order: &PurchaseOrder) -> bool {
    order.items.iter().any(|l| billable(l) > 0)
}

/// Placeholder for the receive input: the accepted range, or "0"
pub fn receive_hint(line: &OrderLine) -> String {
    match remaining(line) {
        0 => "0".to_string(),
        n => format!("1 - {}", n),
    }
}
