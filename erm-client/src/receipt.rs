//! Receipt recorder
//!
//! Drives the purchase order page: loading the order, receiving one line
//! at a time, and the per-item receive audit trail.

use crate::error::{ClientError, ClientResult, Operation};
use crate::http::ErmApi;
use crate::store::{OrderEvent, OrderStore};
use shared::error::{ErrorCode, ValidationError};
use shared::models::{PurchaseOrder, ReceiptEvent, ReceiveRequest};
use shared::{EntityId, ItemId};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// UI-boundary filter for the receive input: empty, or ASCII digits only
pub fn accepts_receive_input(raw: &str) -> bool {
    raw.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a receive quantity against the line's remaining quantity
///
/// Rejects empty input, anything that is not a whole number, zero, and
/// values above `remaining`.
pub fn validate_receive_quantity(raw: &str, remaining: u32) -> Result<u32, ValidationError> {
    if raw.is_empty() || !accepts_receive_input(raw) {
        return Err(ValidationError::receive_quantity(remaining));
    }
    let quantity = match raw.parse::<u32>() {
        Ok(q) => q,
        // digits only, so the parse can only fail on overflow
        Err(_) => return Err(exceeds_remaining(remaining)),
    };
    if quantity == 0 {
        return Err(ValidationError::receive_quantity(remaining));
    }
    if quantity > remaining {
        return Err(exceeds_remaining(remaining));
    }
    Ok(quantity)
}

fn exceeds_remaining(remaining: u32) -> ValidationError {
    ValidationError::with_message(
        ErrorCode::ReceiveExceedsRemaining,
        format!("Enter a valid quantity (1 - {})", remaining),
    )
}

/// Result of a receive attempt that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Accepted; `received_quantity` is the optimistic new counter
    Received {
        item_id: ItemId,
        quantity: u32,
        received_quantity: u32,
    },
    /// A receive for this item is already outstanding; nothing was sent
    InFlight,
}

/// Result of an audit trail request
#[derive(Debug, Clone, PartialEq)]
pub enum AuditOutcome {
    /// Trail is visible for the item
    Shown(Vec<ReceiptEvent>),
    /// Trail was visible and is now hidden
    Hidden,
    /// A load for this item is already outstanding
    InFlight,
}

/// Purchase order view session
///
/// Owns the view's [`OrderStore`] and a cancellation token. Closing the
/// session aborts outstanding calls; their late responses are dropped
/// without touching the store.
pub struct OrderSession<A: ErmApi + ?Sized> {
    api: Arc<A>,
    order_id: EntityId,
    actor: String,
    store: Mutex<OrderStore>,
    cancel: CancellationToken,
}

impl<A: ErmApi + ?Sized> OrderSession<A> {
    pub fn new(api: Arc<A>, order_id: impl Into<EntityId>, actor: impl Into<String>) -> Self {
        Self {
            api,
            order_id: order_id.into(),
            actor: actor.into(),
            store: Mutex::new(OrderStore::new()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn order_id(&self) -> &EntityId {
        &self.order_id
    }

    /// Read the store
    pub async fn with_store<R>(&self, f: impl FnOnce(&OrderStore) -> R) -> R {
        f(&*self.store.lock().await)
    }

    /// Snapshot of the loaded order
    pub async fn order(&self) -> Option<PurchaseOrder> {
        self.with_store(|s| s.order().cloned()).await
    }

    /// Abort outstanding calls; the view is going away
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

    /// Fetch the order; replaces whatever the store held
    pub async fn load(&self) -> ClientResult<()> {
        self.store.lock().await.apply(OrderEvent::LoadStarted);
        let result = self.guarded(self.api.fetch_order(&self.order_id)).await;
        if self.is_closed() {
            return Err(ClientError::Aborted);
        }
        let mut store = self.store.lock().await;
        match result {
            Ok(order) => {
                tracing::debug!(order_id = %self.order_id, lines = order.items.len(), "Purchase order loaded");
                store.apply(OrderEvent::OrderLoaded(order));
                Ok(())
            }
            Err(e) => {
                tracing::error!(order_id = %self.order_id, error = %e, "Failed to load purchase order");
                store.apply(OrderEvent::LoadFailed(e.user_message(Operation::LoadOrder)));
                Err(e)
            }
        }
    }

    /// Feed keystrokes for a line's receive input; `false` if refused
    pub async fn set_receive_input(&self, item_id: impl Into<ItemId>, value: impl Into<String>) -> bool {
        let value = value.into();
        if !accepts_receive_input(&value) {
            return false;
        }
        self.store.lock().await.apply(OrderEvent::InputChanged {
            item_id: item_id.into(),
            value,
        });
        true
    }

    /// Receive the pending input quantity for one line
    ///
    /// The quantity is validated against the remaining quantity at the
    /// moment of submission. On success the line is patched optimistically
    /// and not re-fetched; on failure the line and the input are kept.
    pub async fn receive(&self, item_id: &str) -> ClientResult<ReceiveOutcome> {
        let (item_id, quantity) = {
            let mut store = self.store.lock().await;
            if store.is_receiving(item_id) {
                tracing::debug!(item_id, "Receive already in flight, ignoring");
                return Ok(ReceiveOutcome::InFlight);
            }
            let line = store.line(item_id).ok_or_else(|| {
                let code = if store.order().is_some() {
                    ErrorCode::OrderItemNotFound
                } else {
                    ErrorCode::OrderNotLoaded
                };
                ClientError::from(ValidationError::new(code))
            })?;
            let item_id = line.item_id.clone();
            let remaining = crate::ledger::remaining(line);
            let quantity = validate_receive_quantity(store.input(item_id.as_str()), remaining)?;
            store.apply(OrderEvent::ReceiveStarted {
                item_id: item_id.clone(),
            });
            (item_id, quantity)
        };

        let request = ReceiveRequest::new(item_id.clone(), quantity, self.actor.clone());
        let result = self
            .guarded(self.api.receive_item(&self.order_id, &request))
            .await;

        let (outcome, refresh_audit) = {
            let mut store = self.store.lock().await;
            if self.is_closed() {
                store.apply(OrderEvent::ReceiveFailed { item_id });
                return Err(ClientError::Aborted);
            }
            match result {
                Ok(()) => {
                    store.apply(OrderEvent::ReceiveSucceeded {
                        item_id: item_id.clone(),
                        quantity,
                    });
                    let received_quantity = store
                        .line(item_id.as_str())
                        .map(|l| l.received_quantity)
                        .unwrap_or_default();
                    tracing::info!(order_id = %self.order_id, %item_id, quantity, "Item received");
                    let refresh = store.audit_open() == Some(&item_id);
                    (
                        ReceiveOutcome::Received {
                            item_id: item_id.clone(),
                            quantity,
                            received_quantity,
                        },
                        refresh,
                    )
                }
                Err(e) => {
                    tracing::warn!(order_id = %self.order_id, %item_id, error = %e, "Receive failed");
                    store.apply(OrderEvent::ReceiveFailed { item_id });
                    return Err(e);
                }
            }
        };

        if refresh_audit {
            // the receive itself succeeded; a stale trail is only logged
            if let Err(e) = self.audit_trail(item_id.as_str(), true).await {
                tracing::warn!(%item_id, error = %e, "Audit refresh after receive failed");
            }
        }
        Ok(outcome)
    }

    /// Show, hide or reload the receive audit trail for one line
    ///
    /// With a cached trail and `force == false` this only flips visibility.
    pub async fn audit_trail(&self, item_id: &str, force: bool) -> ClientResult<AuditOutcome> {
        let item_id = {
            let mut store = self.store.lock().await;
            let item_id = ItemId::new(item_id);
            if !force && let Some(cached) = store.cached_audit(item_id.as_str()) {
                let cached = cached.to_vec();
                store.apply(OrderEvent::AuditToggled {
                    item_id: item_id.clone(),
                });
                return Ok(if store.audit_open() == Some(&item_id) {
                    AuditOutcome::Shown(cached)
                } else {
                    AuditOutcome::Hidden
                });
            }
            if store.is_audit_loading(item_id.as_str()) {
                return Ok(AuditOutcome::InFlight);
            }
            store.apply(OrderEvent::AuditStarted {
                item_id: item_id.clone(),
            });
            item_id
        };

        let result = self
            .guarded(self.api.fetch_receipts(&self.order_id, &item_id))
            .await;

        let mut store = self.store.lock().await;
        if self.is_closed() {
            store.apply(OrderEvent::AuditFailed { item_id });
            return Err(ClientError::Aborted);
        }
        match result {
            Ok(events) => {
                tracing::debug!(%item_id, count = events.len(), "Audit trail loaded");
                store.apply(OrderEvent::AuditLoaded {
                    item_id,
                    events: events.clone(),
                });
                Ok(AuditOutcome::Shown(events))
            }
            Err(e) => {
                tracing::warn!(%item_id, error = %e, "Failed to load audit for item");
                store.apply(OrderEvent::AuditFailed { item_id });
                Err(e)
            }
        }
    }
}
