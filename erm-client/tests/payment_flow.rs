// erm-client/tests/payment_flow.rs
// 账单付款流程集成测试

mod common;

use common::{MockApi, sample_bill};
use erm_client::models::{BillStatus, PaymentMethod};
use erm_client::{BillSession, ClientError, ErrorCode, Operation, PaymentOutcome};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::Ordering;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn loaded_session(api: std::sync::Arc<MockApi>) -> BillSession<MockApi> {
    let session = BillSession::new(api, "b-1");
    session.load().await.unwrap();
    session
}

#[tokio::test]
async fn test_payment_refetches_bill() {
    let api = MockApi::with_bill(sample_bill());
    let session = loaded_session(api.clone()).await;
    assert_eq!(session.bill().await.unwrap().balance_amount, dec("600"));

    let outcome = session
        .submit_payment("100", PaymentMethod::Cash, Some("  ".into()), None)
        .await
        .unwrap();
    match outcome {
        PaymentOutcome::Recorded { payment, refreshed } => {
            assert!(refreshed);
            assert_eq!(payment.unwrap().amount, dec("100"));
        }
        other => panic!("unexpected {other:?}"),
    }

    // header and history come from the collaborator, not local arithmetic
    assert_eq!(api.fetch_bill_calls.load(Ordering::SeqCst), 2);
    session
        .with_store(|s| {
            let bill = s.bill().unwrap();
            assert_eq!(bill.balance_amount, dec("500"));
            assert_eq!(bill.paid_amount, dec("500"));
            assert_eq!(s.payments().len(), 1);
            assert!(!s.is_paying());
        })
        .await;

    let requests = api.payment_requests.lock().unwrap().clone();
    assert_eq!(requests[0].transaction_id, None);
    assert_eq!(requests[0].method, PaymentMethod::Cash);
}

#[tokio::test]
async fn test_overpayment_is_refused() {
    let api = MockApi::with_bill(sample_bill());
    let session = loaded_session(api.clone()).await;

    let err = session
        .submit_payment("600.01", PaymentMethod::Bank, None, None)
        .await
        .unwrap_err();
    match err {
        ClientError::Validation(v) => {
            assert_eq!(v.code, ErrorCode::PaymentExceedsBalance);
            assert_eq!(v.message, "Amount cannot exceed balance 600");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(api.payment_requests.lock().unwrap().is_empty());

    // the whole balance is fine
    assert!(session
        .submit_payment("600", PaymentMethod::Bank, None, None)
        .await
        .is_ok());
    let bill = session.bill().await.unwrap();
    assert_eq!(bill.status(), BillStatus::Paid);
    assert!(!bill.can_pay());
}

#[tokio::test]
async fn test_invalid_amounts() {
    let api = MockApi::with_bill(sample_bill());
    let session = loaded_session(api.clone()).await;

    for raw in ["", "abc", "0", "-5"] {
        let err = session
            .submit_payment(raw, PaymentMethod::Cash, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(Operation::SubmitPayment), "Enter valid amount", "{raw:?}");
    }
    assert!(api.payment_requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_surfaces_message() {
    let api = MockApi::with_bill(sample_bill());
    let session = loaded_session(api.clone()).await;

    api.reject_next(Some("Bill is locked"));
    let err = session
        .submit_payment("10", PaymentMethod::Upi, Some("UTR-1".into()), Some("first".into()))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(Operation::SubmitPayment), "Bill is locked");

    api.reject_next(None);
    let err = session
        .submit_payment("10", PaymentMethod::Upi, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(Operation::SubmitPayment), "Payment failed");

    // nothing re-fetched, nothing applied
    assert_eq!(api.fetch_bill_calls.load(Ordering::SeqCst), 1);
    session
        .with_store(|s| {
            assert_eq!(s.bill().unwrap().balance_amount, dec("600"));
            assert!(!s.is_paying());
        })
        .await;

    let requests = api.payment_requests.lock().unwrap().clone();
    assert_eq!(requests[0].transaction_id.as_deref(), Some("UTR-1"));
    assert_eq!(requests[0].note.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_refresh_failure_is_reported() {
    let api = MockApi::with_bill(sample_bill());
    let session = loaded_session(api.clone()).await;

    api.fail_bill_fetch.store(true, Ordering::SeqCst);
    let outcome = session
        .submit_payment("50", PaymentMethod::Cheque, None, None)
        .await
        .unwrap();
    assert!(matches!(outcome, PaymentOutcome::Recorded { refreshed: false, .. }));
    session
        .with_store(|s| {
            assert!(!s.is_paying());
            assert!(s.load_error().is_some());
        })
        .await;
}

#[tokio::test]
async fn test_second_payment_while_paying_is_noop() {
    let api = MockApi::with_bill(sample_bill());
    let session = loaded_session(api.clone()).await;
    let gate = api.hold_mutations();

    let first = session.submit_payment("10", PaymentMethod::Cash, None, None);
    let second = async {
        gate.entered.notified().await;
        let outcome = session
            .submit_payment("10", PaymentMethod::Cash, None, None)
            .await;
        gate.release.notify_one();
        outcome
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(first.unwrap(), PaymentOutcome::Recorded { .. }));
    assert_eq!(second.unwrap(), PaymentOutcome::InFlight);
    assert_eq!(api.payment_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_pay_before_load_is_refused() {
    let api = MockApi::with_bill(sample_bill());
    let session = BillSession::new(api, "b-1");
    match session
        .submit_payment("10", PaymentMethod::Cash, None, None)
        .await
        .unwrap_err()
    {
        ClientError::Validation(v) => assert_eq!(v.code, ErrorCode::BillNotLoaded),
        other => panic!("unexpected {other:?}"),
    }
}
