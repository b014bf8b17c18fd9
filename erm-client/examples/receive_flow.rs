//! Receive against a live backend, then show the item's audit trail.
//!
//! Usage:
//!   cargo run -p erm-client --example receive_flow -- <order_id> <item_id> <quantity>
//!
//! Configuration comes from ERM_API_BASE_URL / ERM_ACTOR / ERM_API_TOKEN
//! (a `.env` file is honoured).

use anyhow::{Context, bail};
use erm_client::logger::init_logger_with_level;
use erm_client::{AuditOutcome, ClientConfig, Operation, OrderSession, ReceiveOutcome, ledger};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger_with_level("info", false)?;

    let mut args = std::env::args().skip(1);
    let (Some(order_id), Some(item_id), Some(quantity)) = (args.next(), args.next(), args.next())
    else {
        bail!("usage: receive_flow <order_id> <item_id> <quantity>");
    };

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, actor = %config.actor, "Connecting");
    let api = Arc::new(config.build_http_client()?);
    let session = OrderSession::new(api, order_id.as_str(), config.actor.clone());

    session
        .load()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message(Operation::LoadOrder)))?;

    let order = session.order().await.context("order missing after load")?;
    println!("{} ({})", order.id, order.supplier_name);
    for line in &order.items {
        println!(
            "  {:<12} {:<24} ordered {:>5}  received {:>5}  billed {:>5}  receive [{}]",
            line.item_id,
            line.name,
            line.ordered_quantity,
            line.received_quantity,
            line.billed_quantity,
            ledger::receive_hint(line),
        );
    }

    if !session.set_receive_input(item_id.as_str(), quantity.as_str()).await {
        bail!("quantity must be a whole number");
    }
    match session.receive(&item_id).await {
        Ok(ReceiveOutcome::Received {
            received_quantity, ..
        }) => println!("received, {} now {}", item_id, received_quantity),
        Ok(ReceiveOutcome::InFlight) => println!("receive already in progress"),
        Err(e) => bail!(e.user_message(Operation::Receive)),
    }

    match session.audit_trail(&item_id, true).await {
        Ok(AuditOutcome::Shown(events)) => {
            for event in events {
                println!(
                    "  {:?} {} by {}",
                    event.action,
                    event.quantity,
                    event.received_by.as_deref().unwrap_or("-"),
                );
            }
        }
        Ok(_) => {}
        Err(e) => eprintln!("{}", e.user_message(Operation::LoadAudit)),
    }

    session.close();
    Ok(())
}
