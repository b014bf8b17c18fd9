//! Bill composer
//!
//! Turns per-line bill quantities typed on the create-bill page into a
//! `CreateBillRequest`, bounded by what has been received but not billed.

use crate::error::{ClientError, ClientResult, Operation};
use crate::http::ErmApi;
use crate::ledger;
use crate::store::{BillDraftStore, DraftEvent};
use chrono::NaiveDate;
use shared::error::{ErrorCode, ValidationError};
use shared::models::{
    BillFilter, BillLineInput, CreateBillRequest, OrderLine, PurchaseBill, PurchaseOrder,
};
use shared::{EntityId, ItemId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Lines with something left to bill, in order
pub fn billable_lines(order: &PurchaseOrder) -> Vec<&OrderLine> {
    order
        .items
        .iter()
        .filter(|l| ledger::billable(l) > 0)
        .collect()
}

/// Build the create-bill payload
///
/// Entered quantities are clamped to each line's billable quantity, zero
/// entries and unknown items are dropped. Line order follows the order.
pub fn compose_bill_request(
    order: &PurchaseOrder,
    bill_number: &str,
    bill_date: NaiveDate,
    entered: &HashMap<ItemId, u32>,
) -> Result<CreateBillRequest, ValidationError> {
    let bill_number = bill_number.trim();
    if bill_number.is_empty() {
        return Err(ValidationError::new(ErrorCode::BillNumberRequired));
    }

    let items: Vec<BillLineInput> = billable_lines(order)
        .into_iter()
        .filter_map(|line| {
            let wanted = entered.get(&line.item_id).copied().unwrap_or(0);
            let quantity = wanted.min(ledger::billable(line));
            (quantity > 0).then(|| BillLineInput {
                item_id: line.item_id.clone(),
                quantity,
            })
        })
        .collect();

    if items.is_empty() {
        return Err(ValidationError::new(ErrorCode::BillNoLines));
    }

    Ok(CreateBillRequest {
        purchase_order_id: order.id.clone(),
        bill_number: bill_number.to_string(),
        bill_date,
        items,
    })
}

/// Bills matching `filter`; an inverted date range is refused locally
pub async fn list_bills<A: ErmApi + ?Sized>(
    api: &A,
    filter: &BillFilter,
) -> ClientResult<Vec<PurchaseBill>> {
    if let (Some(from), Some(to)) = (filter.from_date, filter.to_date)
        && from > to
    {
        return Err(ValidationError::with_message(
            ErrorCode::ValueOutOfRange,
            "From date cannot be after to date",
        )
        .into());
    }
    let bills = api.list_bills(filter).await?;
    tracing::debug!(count = bills.len(), status = ?filter.status, "Bills listed");
    Ok(bills)
}

/// Result of a create-bill attempt that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum BillOutcome {
    /// Accepted; the bill when the collaborator echoed it back
    Created(Option<PurchaseBill>),
    /// A create for this draft is already outstanding
    InFlight,
}

/// Create-bill page session
pub struct BillDraft<A: ErmApi + ?Sized> {
    api: Arc<A>,
    store: Mutex<BillDraftStore>,
    cancel: CancellationToken,
}

impl<A: ErmApi + ?Sized> BillDraft<A> {
    /// Draft dated today
    pub fn new(api: Arc<A>, order_id: impl Into<EntityId>) -> Self {
        Self::with_date(api, order_id, shared::util::today())
    }

    pub fn with_date(api: Arc<A>, order_id: impl Into<EntityId>, bill_date: NaiveDate) -> Self {
        Self {
            api,
            store: Mutex::new(BillDraftStore::new(order_id.into(), bill_date)),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn with_store<R>(&self, f: impl FnOnce(&BillDraftStore) -> R) -> R {
        f(&*self.store.lock().await)
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn guarded<T>(&self, call: impl Future<Output = ClientResult<T>>) -> ClientResult<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Aborted),
            result = call => result,
        }
    }

    async fn order_id(&self) -> EntityId {
        self.store.lock().await.order_id().clone()
    }

    /// Fetch the order the bill is drafted against
    pub async fn load(&self) -> ClientResult<()> {
        let order_id = self.order_id().await;
        let result = self.guarded(self.api.fetch_order(&order_id)).await;
        if self.is_closed() {
            return Err(ClientError::Aborted);
        }
        let mut store = self.store.lock().await;
        match result {
            Ok(order) => {
                store.apply(DraftEvent::OrderLoaded(order));
                Ok(())
            }
            Err(e) => {
                tracing::error!(%order_id, error = %e, "Failed to load order for billing");
                store.apply(DraftEvent::LoadFailed(e.user_message(Operation::LoadOrder)));
                Err(e)
            }
        }
    }

    pub async fn set_bill_number(&self, bill_number: impl Into<String>) {
        self.store
            .lock()
            .await
            .apply(DraftEvent::BillNumberChanged(bill_number.into()));
    }

    pub async fn set_bill_date(&self, bill_date: NaiveDate) {
        self.store
            .lock()
            .await
            .apply(DraftEvent::BillDateChanged(bill_date));
    }

    /// Record the quantity typed for a line; clamped when the bill is composed
    pub async fn enter_quantity(&self, item_id: impl Into<ItemId>, quantity: u32) {
        self.store.lock().await.apply(DraftEvent::QuantityEntered {
            item_id: item_id.into(),
            quantity,
        });
    }

    /// Billable lines of the loaded order, recomputed on every call
    pub async fn billable_lines(&self) -> Vec<OrderLine> {
        self.with_store(|s| {
            s.order()
                .map(|o| billable_lines(o).into_iter().cloned().collect())
                .unwrap_or_default()
        })
        .await
    }

    /// Compose and send the bill
    pub async fn submit(&self) -> ClientResult<BillOutcome> {
        let request = {
            let mut store = self.store.lock().await;
            if store.is_creating() {
                return Ok(BillOutcome::InFlight);
            }
            let order = store
                .order()
                .ok_or_else(|| ValidationError::new(ErrorCode::OrderNotLoaded))?;
            let request =
                compose_bill_request(order, store.bill_number(), store.bill_date(), store.entered())?;
            store.apply(DraftEvent::CreateStarted);
            request
        };

        let result = self.guarded(self.api.create_bill(&request)).await;

        let mut store = self.store.lock().await;
        if self.is_closed() {
            store.apply(DraftEvent::CreateFailed);
            return Err(ClientError::Aborted);
        }
        match result {
            Ok(bill) => {
                tracing::info!(
                    order_id = %request.purchase_order_id,
                    bill_number = %request.bill_number,
                    lines = request.items.len(),
                    "Bill created"
                );
                store.apply(DraftEvent::CreateSucceeded(bill.clone()));
                Ok(BillOutcome::Created(bill))
            }
            Err(e) => {
                tracing::warn!(order_id = %request.purchase_order_id, error = %e, "Failed to create bill");
                store.apply(DraftEvent::CreateFailed);
                Err(e)
            }
        }
    }
}
