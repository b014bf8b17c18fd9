//! View stores
//!
//! Each view owns one store. Stores are plain data mutated only through
//! `apply`, one event per completion of a request the view issued. The
//! collaborator stays authoritative: a fresh load replaces the projection
//! wholesale (last fetch wins).

use crate::inflight::InFlight;
use crate::ledger;
use crate::receipt::accepts_receive_input;
use chrono::NaiveDate;
use shared::models::{OrderLine, Payment, PurchaseBill, PurchaseOrder, ReceiptEvent};
use shared::{EntityId, ItemId};
use std::collections::HashMap;

// ============================================================================
// Purchase order view
// ============================================================================

/// Events applied to [`OrderStore`]
#[derive(Debug, Clone)]
pub enum OrderEvent {
    LoadStarted,
    OrderLoaded(PurchaseOrder),
    LoadFailed(String),
    /// Raw keystrokes for a line's receive input
    InputChanged { item_id: ItemId, value: String },
    ReceiveStarted { item_id: ItemId },
    ReceiveSucceeded { item_id: ItemId, quantity: u32 },
    ReceiveFailed { item_id: ItemId },
    AuditStarted { item_id: ItemId },
    AuditLoaded { item_id: ItemId, events: Vec<ReceiptEvent> },
    AuditFailed { item_id: ItemId },
    AuditToggled { item_id: ItemId },
}

/// State behind the purchase order page
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    order: Option<PurchaseOrder>,
    loading: bool,
    load_error: Option<String>,
    pending_input: HashMap<ItemId, String>,
    receiving: InFlight<ItemId>,
    /// Bumped by every `OrderLoaded`
    load_generation: u64,
    /// Load generation seen when each outstanding receive started
    receive_generation: HashMap<ItemId, u64>,
    audit: HashMap<ItemId, Vec<ReceiptEvent>>,
    audit_loading: InFlight<ItemId>,
    audit_open: Option<ItemId>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: OrderEvent) {
        match event {
            OrderEvent::LoadStarted => {
                self.loading = true;
                self.load_error = None;
            }
            OrderEvent::OrderLoaded(order) => {
                self.loading = false;
                self.load_error = None;
                self.order = Some(order);
                self.load_generation += 1;
            }
            OrderEvent::LoadFailed(message) => {
                self.loading = false;
                self.load_error = Some(message);
            }
            OrderEvent::InputChanged { item_id, value } => {
                if accepts_receive_input(&value) {
                    self.pending_input.insert(item_id, value);
                }
            }
            OrderEvent::ReceiveStarted { item_id } => {
                self.receive_generation.insert(item_id.clone(), self.load_generation);
                self.receiving.try_begin(item_id);
            }
            OrderEvent::ReceiveSucceeded { item_id, quantity } => {
                // a load that landed mid-flight already carries this receive
                let started = self.receive_generation.remove(&item_id);
                if started == Some(self.load_generation)
                    && let Some(line) = self.order.as_mut().and_then(|o| o.line_mut(item_id.as_str()))
                {
                    line.received_quantity = line.received_quantity.saturating_add(quantity);
                }
                self.pending_input.remove(&item_id);
                self.receiving.finish(&item_id);
            }
            OrderEvent::ReceiveFailed { item_id } => {
                self.receive_generation.remove(&item_id);
                self.receiving.finish(&item_id);
            }
            OrderEvent::AuditStarted { item_id } => {
                self.audit_loading.try_begin(item_id);
            }
            OrderEvent::AuditLoaded { item_id, events } => {
                self.audit_loading.finish(&item_id);
                self.audit.insert(item_id.clone(), events);
                self.audit_open = Some(item_id);
            }
            OrderEvent::AuditFailed { item_id } => {
                self.audit_loading.finish(&item_id);
            }
            OrderEvent::AuditToggled { item_id } => {
                self.audit_open = match self.audit_open.take() {
                    Some(open) if open == item_id => None,
                    _ => Some(item_id),
                };
            }
        }
    }

    pub fn order(&self) -> Option<&PurchaseOrder> {
        self.order.as_ref()
    }

    pub fn line(&self, item_id: &str) -> Option<&OrderLine> {
        self.order.as_ref().and_then(|o| o.line(item_id))
    }

    /// Remaining quantity of a line as currently known
    pub fn remaining(&self, item_id: &str) -> Option<u32> {
        self.line(item_id).map(ledger::remaining)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Pending receive input, empty when untouched
    pub fn input(&self, item_id: &str) -> &str {
        self.pending_input.get(item_id).map(String::as_str).unwrap_or("")
    }

    pub fn is_receiving(&self, item_id: &str) -> bool {
        self.receiving.is_in_flight(item_id)
    }

    pub fn is_audit_loading(&self, item_id: &str) -> bool {
        self.audit_loading.is_in_flight(item_id)
    }

    pub fn cached_audit(&self, item_id: &str) -> Option<&[ReceiptEvent]> {
        self.audit.get(item_id).map(Vec::as_slice)
    }

    pub fn audit_open(&self) -> Option<&ItemId> {
        self.audit_open.as_ref()
    }

    /// Whether "Receive" can be pressed for a line
    pub fn can_receive(&self, item_id: &str) -> bool {
        let Some(remaining) = self.remaining(item_id) else {
            return false;
        };
        remaining > 0
            && !self.is_receiving(item_id)
            && crate::receipt::validate_receive_quantity(self.input(item_id), remaining).is_ok()
    }
}

// ============================================================================
// Create-bill view
// ============================================================================

/// Events applied to [`BillDraftStore`]
#[derive(Debug, Clone)]
pub enum DraftEvent {
    OrderLoaded(PurchaseOrder),
    LoadFailed(String),
    BillNumberChanged(String),
    BillDateChanged(NaiveDate),
    QuantityEntered { item_id: ItemId, quantity: u32 },
    CreateStarted,
    CreateSucceeded(Option<PurchaseBill>),
    CreateFailed,
}

/// State behind the create-bill page
#[derive(Debug, Clone)]
pub struct BillDraftStore {
    order_id: EntityId,
    order: Option<PurchaseOrder>,
    load_error: Option<String>,
    bill_number: String,
    bill_date: NaiveDate,
    entered: HashMap<ItemId, u32>,
    creating: InFlight<EntityId>,
    created: Option<PurchaseBill>,
}

impl BillDraftStore {
    pub fn new(order_id: EntityId, bill_date: NaiveDate) -> Self {
        Self {
            order_id,
            order: None,
            load_error: None,
            bill_number: String::new(),
            bill_date,
            entered: HashMap::new(),
            creating: InFlight::new(),
            created: None,
        }
    }

    pub fn apply(&mut self, event: DraftEvent) {
        match event {
            DraftEvent::OrderLoaded(order) => {
                self.load_error = None;
                self.order = Some(order);
            }
            DraftEvent::LoadFailed(message) => self.load_error = Some(message),
            DraftEvent::BillNumberChanged(number) => self.bill_number = number,
            DraftEvent::BillDateChanged(date) => self.bill_date = date,
            DraftEvent::QuantityEntered { item_id, quantity } => {
                self.entered.insert(item_id, quantity);
            }
            DraftEvent::CreateStarted => {
                self.creating.try_begin(self.order_id.clone());
            }
            DraftEvent::CreateSucceeded(bill) => {
                self.creating.finish(&self.order_id);
                self.entered.clear();
                self.created = bill;
            }
            DraftEvent::CreateFailed => self.creating.finish(&self.order_id),
        }
    }

    pub fn order_id(&self) -> &EntityId {
        &self.order_id
    }

    pub fn order(&self) -> Option<&PurchaseOrder> {
        self.order.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn bill_number(&self) -> &str {
        &self.bill_number
    }

    pub fn bill_date(&self) -> NaiveDate {
        self.bill_date
    }

    pub fn entered(&self) -> &HashMap<ItemId, u32> {
        &self.entered
    }

    pub fn is_creating(&self) -> bool {
        self.creating.is_in_flight(&self.order_id)
    }

    /// Bill echoed back by the last successful create, if any
    pub fn created(&self) -> Option<&PurchaseBill> {
        self.created.as_ref()
    }
}

// ============================================================================
// Bill view
// ============================================================================

/// Events applied to [`BillStore`]
#[derive(Debug, Clone)]
pub enum BillEvent {
    BillLoaded(PurchaseBill),
    BillLoadFailed(String),
    PaymentsLoaded(Vec<Payment>),
    PaymentStarted,
    PaymentSucceeded,
    PaymentFailed,
}

/// State behind the bill page and its pay form
///
/// Payments are never applied arithmetically; after an accepted payment
/// the bill header and history are re-fetched.
#[derive(Debug, Clone)]
pub struct BillStore {
    bill_id: EntityId,
    bill: Option<PurchaseBill>,
    load_error: Option<String>,
    payments: Vec<Payment>,
    paying: InFlight<EntityId>,
}

impl BillStore {
    pub fn new(bill_id: EntityId) -> Self {
        Self {
            bill_id,
            bill: None,
            load_error: None,
            payments: Vec::new(),
            paying: InFlight::new(),
        }
    }

    pub fn apply(&mut self, event: BillEvent) {
        match event {
            BillEvent::BillLoaded(bill) => {
                self.load_error = None;
                self.bill = Some(bill);
            }
            BillEvent::BillLoadFailed(message) => self.load_error = Some(message),
            BillEvent::PaymentsLoaded(payments) => self.payments = payments,
            BillEvent::PaymentStarted => {
                self.paying.try_begin(self.bill_id.clone());
            }
            BillEvent::PaymentSucceeded | BillEvent::PaymentFailed => {
                self.paying.finish(&self.bill_id)
            }
        }
    }

    pub fn bill_id(&self) -> &EntityId {
        &self.bill_id
    }

    pub fn bill(&self) -> Option<&PurchaseBill> {
        self.bill.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn is_paying(&self) -> bool {
        self.paying.is_in_flight(&self.bill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_order() -> PurchaseOrder {
        serde_json::from_value(serde_json::json!({
            "_id": "po-1",
            "supplierName": "Acme",
            "items": [
                {"itemId": "a", "name": "Bolt", "quantity": 10, "recivedQuantity": 4,
                 "billedQuantity": 2, "rate": 50, "amount": 500},
                {"itemId": "b", "name": "Nut", "quantity": 5, "recivedQuantity": 0,
                 "billedQuantity": 0, "rate": 2, "amount": 10}
            ]
        }))
        .unwrap()
    }

    fn loaded() -> OrderStore {
        let mut store = OrderStore::new();
        store.apply(OrderEvent::LoadStarted);
        store.apply(OrderEvent::OrderLoaded(sample_order()));
        store
    }

    #[test]
    fn load_clears_loading_and_error() {
        let store = loaded();
        assert!(!store.is_loading());
        assert!(store.load_error().is_none());
        assert_eq!(store.remaining("a"), Some(6));
    }

    #[test]
    fn input_filter_rejects_non_digits() {
        let mut store = loaded();
        store.apply(OrderEvent::InputChanged { item_id: "a".into(), value: "3".into() });
        store.apply(OrderEvent::InputChanged { item_id: "a".into(), value: "3x".into() });
        assert_eq!(store.input("a"), "3");
        store.apply(OrderEvent::InputChanged { item_id: "a".into(), value: "".into() });
        assert_eq!(store.input("a"), "");
    }

    #[test]
    fn receive_success_patches_only_its_line() {
        let mut store = loaded();
        store.apply(OrderEvent::InputChanged { item_id: "a".into(), value: "3".into() });
        store.apply(OrderEvent::ReceiveStarted { item_id: "a".into() });
        assert!(store.is_receiving("a"));
        assert!(!store.can_receive("a"));
        store.apply(OrderEvent::ReceiveSucceeded { item_id: "a".into(), quantity: 3 });
        assert_eq!(store.line("a").unwrap().received_quantity, 7);
        assert_eq!(store.line("b").unwrap().received_quantity, 0);
        assert_eq!(store.input("a"), "");
        assert!(!store.is_receiving("a"));
    }

    #[test]
    fn receive_failure_keeps_line_and_input() {
        let mut store = loaded();
        store.apply(OrderEvent::InputChanged { item_id: "a".into(), value: "3".into() });
        store.apply(OrderEvent::ReceiveStarted { item_id: "a".into() });
        store.apply(OrderEvent::ReceiveFailed { item_id: "a".into() });
        assert_eq!(store.line("a").unwrap().received_quantity, 4);
        assert_eq!(store.input("a"), "3");
        assert!(!store.is_receiving("a"));
        assert!(store.can_receive("a"));
    }

    #[test]
    fn reload_replaces_optimistic_value() {
        let mut store = loaded();
        store.apply(OrderEvent::ReceiveSucceeded { item_id: "a".into(), quantity: 3 });
        assert_eq!(store.line("a").unwrap().received_quantity, 7);
        // authoritative value differs; last fetch wins
        let mut fresh = sample_order();
        fresh.items[0].received_quantity = 6;
        store.apply(OrderEvent::OrderLoaded(fresh));
        assert_eq!(store.line("a").unwrap().received_quantity, 6);
    }

    #[test]
    fn load_during_receive_wins_over_patch() {
        let mut store = loaded();
        store.apply(OrderEvent::InputChanged { item_id: "a".into(), value: "6".into() });
        store.apply(OrderEvent::ReceiveStarted { item_id: "a".into() });
        let mut fresh = sample_order();
        fresh.items[0].received_quantity = 10;
        store.apply(OrderEvent::OrderLoaded(fresh));
        store.apply(OrderEvent::ReceiveSucceeded { item_id: "a".into(), quantity: 6 });
        assert_eq!(store.line("a").unwrap().received_quantity, 10);
        assert_eq!(store.input("a"), "");
        assert!(!store.is_receiving("a"));

        // the next receive patches again
        store.apply(OrderEvent::ReceiveStarted { item_id: "b".into() });
        store.apply(OrderEvent::ReceiveSucceeded { item_id: "b".into(), quantity: 2 });
        assert_eq!(store.line("b").unwrap().received_quantity, 2);
    }

    #[test]
    fn audit_toggle_and_load() {
        let mut store = loaded();
        store.apply(OrderEvent::AuditStarted { item_id: "a".into() });
        assert!(store.is_audit_loading("a"));
        store.apply(OrderEvent::AuditLoaded { item_id: "a".into(), events: vec![] });
        assert!(!store.is_audit_loading("a"));
        assert_eq!(store.audit_open().map(ItemId::as_str), Some("a"));
        store.apply(OrderEvent::AuditToggled { item_id: "a".into() });
        assert!(store.audit_open().is_none());
        store.apply(OrderEvent::AuditToggled { item_id: "a".into() });
        assert_eq!(store.audit_open().map(ItemId::as_str), Some("a"));
        assert_eq!(store.cached_audit("a").map(<[_]>::len), Some(0));
    }

    #[test]
    fn draft_create_cycle() {
        let mut draft = BillDraftStore::new("po-1".into(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        draft.apply(DraftEvent::QuantityEntered { item_id: "a".into(), quantity: 2 });
        draft.apply(DraftEvent::CreateStarted);
        assert!(draft.is_creating());
        draft.apply(DraftEvent::CreateFailed);
        assert!(!draft.is_creating());
        assert_eq!(draft.entered().get("a"), Some(&2));
        draft.apply(DraftEvent::CreateStarted);
        draft.apply(DraftEvent::CreateSucceeded(None));
        assert!(!draft.is_creating());
        assert!(draft.entered().is_empty());
    }

    #[test]
    fn bill_store_payment_flag() {
        let mut store = BillStore::new("b-1".into());
        store.apply(BillEvent::PaymentStarted);
        assert!(store.is_paying());
        store.apply(BillEvent::PaymentFailed);
        assert!(!store.is_paying());
        store.apply(BillEvent::PaymentsLoaded(vec![Payment {
            id: "p-1".into(),
            amount: Decimal::from(10),
            method: Default::default(),
            transaction_id: None,
            note: None,
            created_at: None,
        }]));
        assert_eq!(store.payments().len(), 1);
    }
}
