//! Payment recorder
//!
//! Validates and submits payments against a bill. Nothing is applied
//! locally: after an accepted payment the bill and its history are
//! re-fetched from the collaborator.

use crate::error::{ClientError, ClientResult, Operation};
use crate::http::ErmApi;
use crate::store::{BillEvent, BillStore};
use rust_decimal::Decimal;
use shared::error::{ErrorCode, ValidationError};
use shared::models::{Payment, PaymentMethod, PaymentRequest, PurchaseBill};
use shared::EntityId;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Parse the amount field; `None` for anything that is not a decimal number
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw).ok()
}

/// Check an amount against the bill's outstanding balance
///
/// Overpayment is refused outright, never clamped.
pub fn validate_payment(amount: Option<Decimal>, balance: Decimal) -> Result<Decimal, ValidationError> {
    let amount = match amount {
        Some(a) if a > Decimal::ZERO => a,
        _ => return Err(ValidationError::new(ErrorCode::PaymentInvalidAmount)),
    };
    if amount > balance {
        return Err(ValidationError::with_message(
            ErrorCode::PaymentExceedsBalance,
            format!("Amount cannot exceed balance {}", balance),
        ));
    }
    Ok(amount)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Result of a payment attempt that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Accepted. `refreshed` is false when the follow-up re-fetch failed and
    /// the store still shows the pre-payment bill.
    Recorded {
        payment: Option<Payment>,
        refreshed: bool,
    },
    /// A payment for this bill is already outstanding
    InFlight,
}

/// Bill page session with its pay form
pub struct BillSession<A: ErmApi + ?Sized> {
    api: Arc<A>,
    bill_id: EntityId,
    store: Mutex<BillStore>,
    cancel: CancellationToken,
}

impl<A: ErmApi + ?Sized> BillSession<A> {
    pub fn new(api: Arc<A>, bill_id: impl Into<EntityId>) -> Self {
        let bill_id = bill_id.into();
        Self {
            api,
            store: Mutex::new(BillStore::new(bill_id.clone())),
            bill_id,
            cancel: CancellationToken::new(),
        }
    }

    pub fn bill_id(&self) -> &EntityId {
        &self.bill_id
    }

    pub async fn with_store<R>(&self, f: impl FnOnce(&BillStore) -> R) -> R {
        f(&*self.store.lock().await)
    }

    /// Snapshot of the loaded bill
    pub async fn bill(&self) -> Option<PurchaseBill> {
        self.with_store(|s| s.bill().cloned()).await
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

    /// Fetch the bill header and payment history
    pub async fn load(&self) -> ClientResult<()> {
        let (bill, payments) = tokio::join!(
            self.guarded(self.api.fetch_bill(&self.bill_id)),
            self.guarded(self.api.fetch_payments(&self.bill_id)),
        );
        if self.is_closed() {
            return Err(ClientError::Aborted);
        }
        let mut store = self.store.lock().await;
        let bill = match bill {
            Ok(bill) => bill,
            Err(e) => {
                tracing::error!(bill_id = %self.bill_id, error = %e, "Failed to load bill");
                store.apply(BillEvent::BillLoadFailed(e.user_message(Operation::LoadBill)));
                return Err(e);
            }
        };
        store.apply(BillEvent::BillLoaded(bill));
        match payments {
            Ok(payments) => {
                store.apply(BillEvent::PaymentsLoaded(payments));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(bill_id = %self.bill_id, error = %e, "Failed to load payment history");
                Err(e)
            }
        }
    }

    /// Validate and submit a payment
    ///
    /// `amount` is the raw text of the amount field. Blank transaction
    /// reference and note are omitted from the request.
    pub async fn submit_payment(
        &self,
        amount: &str,
        method: PaymentMethod,
        transaction_ref: Option<String>,
        note: Option<String>,
    ) -> ClientResult<PaymentOutcome> {
        let request = {
            let mut store = self.store.lock().await;
            if store.is_paying() {
                return Ok(PaymentOutcome::InFlight);
            }
            let bill = store
                .bill()
                .ok_or_else(|| ValidationError::new(ErrorCode::BillNotLoaded))?;
            let amount = validate_payment(parse_amount(amount), bill.balance_amount)?;
            store.apply(BillEvent::PaymentStarted);
            PaymentRequest {
                amount,
                method,
                transaction_id: non_blank(transaction_ref),
                note: non_blank(note),
            }
        };

        let result = self
            .guarded(self.api.submit_payment(&self.bill_id, &request))
            .await;

        {
            let mut store = self.store.lock().await;
            if self.is_closed() {
                store.apply(BillEvent::PaymentFailed);
                return Err(ClientError::Aborted);
            }
            if let Err(e) = &result {
                tracing::warn!(bill_id = %self.bill_id, error = %e, "Payment failed");
                store.apply(BillEvent::PaymentFailed);
            } else {
                tracing::info!(bill_id = %self.bill_id, amount = %request.amount, method = ?request.method, "Payment recorded");
                store.apply(BillEvent::PaymentSucceeded);
            }
        }
        let payment = result?;

        // 支付成功后重新拉取账单与历史
        let refreshed = match self.load().await {
            Ok(()) => true,
            Err(ClientError::Aborted) => return Err(ClientError::Aborted),
            Err(e) => {
                tracing::warn!(bill_id = %self.bill_id, error = %e, "Refresh after payment failed");
                false
            }
        };
        Ok(PaymentOutcome::Recorded { payment, refreshed })
    }
}
