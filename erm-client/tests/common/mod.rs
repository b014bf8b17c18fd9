// erm-client/tests/common/mod.rs
// 测试用内存后端

#![allow(dead_code)]

use async_trait::async_trait;
use erm_client::models::{
    BillFilter, BillStatus, CreateBillRequest, CreatePurchaseOrder, Payment, PaymentRequest,
    PurchaseBill, PurchaseOrder, ReceiptEvent, ReceiveRequest,
};
use erm_client::{ClientError, ClientResult, EntityId, ErmApi, ItemId};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Holds calls open until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory backend mirroring the collaborator's bookkeeping
#[derive(Default)]
pub struct MockApi {
    pub order: Mutex<Option<PurchaseOrder>>,
    pub receipts: Mutex<Vec<ReceiptEvent>>,
    pub bill: Mutex<Option<PurchaseBill>>,
    pub payments: Mutex<Vec<Payment>>,

    pub receive_requests: Mutex<Vec<ReceiveRequest>>,
    pub bill_requests: Mutex<Vec<CreateBillRequest>>,
    pub payment_requests: Mutex<Vec<PaymentRequest>>,

    pub fetch_order_calls: AtomicUsize,
    pub fetch_receipts_calls: AtomicUsize,
    pub fetch_bill_calls: AtomicUsize,

    /// One-shot rejection for the next mutation
    pub reject_next: Mutex<Option<Option<String>>>,
    /// Make bill fetches fail
    pub fail_bill_fetch: AtomicBool,
    pub gate: Mutex<Option<Arc<Gate>>>,
    pub receipts_gate: Mutex<Option<Arc<Gate>>>,
}

impl MockApi {
    pub fn with_order(order: PurchaseOrder) -> Arc<Self> {
        let api = Self::default();
        *api.order.lock().unwrap() = Some(order);
        Arc::new(api)
    }

    pub fn with_bill(bill: PurchaseBill) -> Arc<Self> {
        let api = Self::default();
        *api.bill.lock().unwrap() = Some(bill);
        Arc::new(api)
    }

    pub fn reject_next(&self, message: Option<&str>) {
        *self.reject_next.lock().unwrap() = Some(message.map(str::to_string));
    }

    /// Every later mutation waits for `release`
    pub fn hold_mutations(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Every later audit fetch waits for `release`
    pub fn hold_receipts(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.receipts_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn receive_count(&self) -> usize {
        self.receive_requests.lock().unwrap().len()
    }

    async fn mutation_gate(&self) -> ClientResult<()> {
        wait_at(&self.gate).await;
        self.take_rejection()
    }

    fn take_rejection(&self) -> ClientResult<()> {
        match self.reject_next.lock().unwrap().take() {
            Some(message) => Err(ClientError::rejected(message)),
            None => Ok(()),
        }
    }

    fn commit_receive(&self, request: &ReceiveRequest) -> ClientResult<()> {
        let mut order = self.order.lock().unwrap();
        let line = order
            .as_mut()
            .and_then(|o| o.line_mut(request.item_id.as_str()))
            .ok_or_else(Self::not_found)?;
        if line.received_quantity + request.quantity > line.ordered_quantity {
            return Err(ClientError::rejected(Some("Quantity exceeds ordered".into())));
        }
        line.received_quantity += request.quantity;

        let mut receipts = self.receipts.lock().unwrap();
        let id = format!("r-{}", receipts.len() + 1);
        receipts.push(ReceiptEvent {
            id: id.into(),
            item_id: request.item_id.clone(),
            quantity: request.quantity,
            action: request.action,
            received_by: Some(request.received_by.clone()),
            created_at: None,
        });
        Ok(())
    }

    fn not_found() -> ClientError {
        ClientError::Rejected {
            status: Some(404),
            message: Some("Not found".into()),
        }
    }
}

async fn wait_at(slot: &Mutex<Option<Arc<Gate>>>) {
    let gate = slot.lock().unwrap().clone();
    if let Some(gate) = gate {
        gate.entered.notify_one();
        gate.release.notified().await;
    }
}

#[async_trait]
impl ErmApi for MockApi {
    async fn fetch_order(&self, _order_id: &EntityId) -> ClientResult<PurchaseOrder> {
        self.fetch_order_calls.fetch_add(1, Ordering::SeqCst);
        self.order.lock().unwrap().clone().ok_or_else(Self::not_found)
    }

    async fn list_orders(&self) -> ClientResult<Vec<PurchaseOrder>> {
        Ok(self.order.lock().unwrap().iter().cloned().collect())
    }

    async fn create_order(&self, _order: &CreatePurchaseOrder) -> ClientResult<Option<PurchaseOrder>> {
        self.mutation_gate().await?;
        Ok(None)
    }

    // commits first, then holds the response at the gate
    async fn receive_item(&self, _order_id: &EntityId, request: &ReceiveRequest) -> ClientResult<()> {
        self.receive_requests.lock().unwrap().push(request.clone());
        self.take_rejection()?;
        self.commit_receive(request)?;
        wait_at(&self.gate).await;
        Ok(())
    }

    async fn fetch_receipts(&self, _order_id: &EntityId, item_id: &ItemId) -> ClientResult<Vec<ReceiptEvent>> {
        self.fetch_receipts_calls.fetch_add(1, Ordering::SeqCst);
        wait_at(&self.receipts_gate).await;
        Ok(self
            .receipts
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.item_id == item_id)
            .cloned()
            .collect())
    }

    async fn create_bill(&self, request: &CreateBillRequest) -> ClientResult<Option<PurchaseBill>> {
        self.bill_requests.lock().unwrap().push(request.clone());
        self.mutation_gate().await?;
        Ok(None)
    }

    async fn fetch_bill(&self, _bill_id: &EntityId) -> ClientResult<PurchaseBill> {
        self.fetch_bill_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bill_fetch.load(Ordering::SeqCst) {
            return Err(ClientError::InvalidResponse("connection reset".into()));
        }
        self.bill.lock().unwrap().clone().ok_or_else(Self::not_found)
    }

    async fn list_bills(&self, filter: &BillFilter) -> ClientResult<Vec<PurchaseBill>> {
        Ok(self
            .bill
            .lock()
            .unwrap()
            .iter()
            .filter(|b| filter.status.is_none_or(|s| b.status() == s))
            .cloned()
            .collect())
    }

    async fn submit_payment(&self, _bill_id: &EntityId, request: &PaymentRequest) -> ClientResult<Option<Payment>> {
        self.payment_requests.lock().unwrap().push(request.clone());
        self.mutation_gate().await?;

        let mut bill = self.bill.lock().unwrap();
        let bill = bill.as_mut().ok_or_else(Self::not_found)?;
        bill.paid_amount += request.amount;
        bill.balance_amount = (bill.total_amount - bill.paid_amount).max(Decimal::ZERO);
        bill.reported_status = Some(BillStatus::from_amounts(bill.total_amount, bill.paid_amount));

        let mut payments = self.payments.lock().unwrap();
        let payment = Payment {
            id: format!("p-{}", payments.len() + 1).into(),
            amount: request.amount,
            method: request.method,
            transaction_id: request.transaction_id.clone(),
            note: request.note.clone(),
            created_at: None,
        };
        payments.push(payment.clone());
        Ok(Some(payment))
    }

    async fn fetch_payments(&self, _bill_id: &EntityId) -> ClientResult<Vec<Payment>> {
        Ok(self.payments.lock().unwrap().clone())
    }
}

/// Order `po-1`: line `a` is {ordered 10, received 4, billed 2, rate 50},
/// line `b` is untouched
pub fn sample_order() -> PurchaseOrder {
    serde_json::from_value(serde_json::json!({
        "_id": "po-1",
        "supplierName": "Acme Supplies",
        "date": "2024-05-01",
        "items": [
            {"itemId": "a", "name": "Bolt", "quantity": 10, "recivedQuantity": 4,
             "billedQuantity": 2, "rate": 50, "amount": 500},
            {"itemId": "b", "name": "Nut", "quantity": 5, "recivedQuantity": 0,
             "billedQuantity": 0, "rate": 2, "amount": 10}
        ],
        "amount": 510,
        "totalAmount": 510
    }))
    .unwrap()
}

/// Bill `b-1`: total 1000, paid 400
pub fn sample_bill() -> PurchaseBill {
    serde_json::from_value(serde_json::json!({
        "_id": "b-1",
        "billNumber": "B-100",
        "billDate": "2024-05-02",
        "purchaseOrderId": "po-1",
        "items": [{"itemId": "a", "quantity": 20, "rate": 50, "amount": 1000}],
        "subTotal": 1000,
        "totalAmount": 1000,
        "paidAmount": 400,
        "balanceAmount": 600
    }))
    .unwrap()
}
