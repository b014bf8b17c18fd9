//! Purchase order list and creation

use crate::error::ClientResult;
use crate::http::ErmApi;
use rust_decimal::Decimal;
use shared::error::{ErrorCode, ValidationError};
use shared::models::{CreatePurchaseOrder, PurchaseOrder};

/// Check a new purchase order before it is sent
///
/// The date is typed, so only the supplier and the lines need checking.
pub fn validate_new_order(order: &CreatePurchaseOrder) -> Result<(), ValidationError> {
    if order.supplier_id.is_empty() {
        return Err(ValidationError::required("Supplier"));
    }
    if order.items.is_empty() {
        return Err(ValidationError::new(ErrorCode::OrderEmpty));
    }
    for (index, line) in order.items.iter().enumerate() {
        let row = index + 1;
        if line.item_id.is_empty() {
            return Err(ValidationError::required(&format!("Item on line {}", row)));
        }
        if line.quantity < 1 {
            return Err(ValidationError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Quantity on line {} must be at least 1", row),
            ));
        }
        if line.rate < Decimal::ZERO {
            return Err(ValidationError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Rate on line {} cannot be negative", row),
            ));
        }
    }
    if order.discount < Decimal::ZERO {
        return Err(ValidationError::with_message(
            ErrorCode::ValueOutOfRange,
            "Discount cannot be negative",
        ));
    }
    Ok(())
}

/// Validate and create a purchase order
pub async fn create_order<A: ErmApi + ?Sized>(
    api: &A,
    order: &CreatePurchaseOrder,
) -> ClientResult<Option<PurchaseOrder>> {
    validate_new_order(order)?;
    let created = api.create_order(order).await.inspect_err(|e| {
        tracing::warn!(supplier = %order.supplier_id, error = %e, "Failed to create purchase order");
    })?;
    tracing::info!(supplier = %order.supplier_id, lines = order.items.len(), "Purchase order created");
    Ok(created)
}

/// All purchase orders, newest first as the collaborator returns them
pub async fn list_orders<A: ErmApi + ?Sized>(api: &A) -> ClientResult<Vec<PurchaseOrder>> {
    let orders = api.list_orders().await?;
    tracing::debug!(count = orders.len(), "Purchase orders listed");
    Ok(orders)
}
