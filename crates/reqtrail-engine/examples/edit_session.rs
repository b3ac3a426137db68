//! Edit session demo
//!
//! Simulates a burst of edits on one event request, lets the quiescence
//! window close, and prints what reaches a stdout audit sink. Set
//! `RUST_LOG=reqtrail=debug` to see the pass and delivery events.

use async_trait::async_trait;
use reqtrail_core::logging_facility::{init, Profile};
use reqtrail_core::{Result, Snapshot, TrailConfig};
use reqtrail_engine::{
    ActorIdResolver, AuditContext, AuditLogMapper, AuditSink, ChangeScheduler, FieldAuditEntry,
    FileAuditEntry, InvoiceAuditEntry,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct StdoutSink;

#[async_trait]
impl AuditSink for StdoutSink {
    async fn log_field_changes(
        &self,
        record_id: &str,
        _actor_id: &str,
        entries: &[FieldAuditEntry],
        actor_name: &str,
    ) -> Result<()> {
        for entry in entries {
            println!(
                "[{}] {} changed {}: {} -> {}",
                record_id, actor_name, entry.label, entry.old_display, entry.new_display
            );
        }
        Ok(())
    }

    async fn log_file_changes(
        &self,
        record_id: &str,
        _actor_id: &str,
        entries: &[FileAuditEntry],
        actor_name: &str,
    ) -> Result<()> {
        for entry in entries {
            println!("[{}] {}: {}", record_id, actor_name, entry.description);
        }
        Ok(())
    }

    async fn log_invoice_changes(
        &self,
        record_id: &str,
        _actor_id: &str,
        entries: &[InvoiceAuditEntry],
        actor_name: &str,
    ) -> Result<()> {
        for entry in entries {
            println!("[{}] {}: {}", record_id, actor_name, entry.summary);
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);

    let baseline = Snapshot::from_json(json!({
        "name": "Hack Night",
        "roomBookingFiles": ["https://files.example/u/17_booking.pdf"],
        "invoices": [{"id": "i1", "vendor": "Costco", "total": 50}]
    }))?;

    let mapper = AuditLogMapper::new(Arc::new(StdoutSink), Arc::new(ActorIdResolver));
    let scheduler = ChangeScheduler::with_audit(
        baseline.clone(),
        TrailConfig::event_request(),
        mapper,
        AuditContext::new("req-42", "ada"),
    )?;

    // Typing the new name one keystroke at a time
    let mut live = baseline;
    for name in ["Hack Night ", "Hack Night 2", "Hack Night 20", "Hack Night 2026"] {
        live.set("name", json!(name));
        scheduler.schedule(live.clone());
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    live.set(
        "invoices",
        json!([{"id": "i1", "vendor": "Costco", "total": 70}]),
    );
    live.set("roomBookingFiles", json!([]));
    scheduler.schedule(live);

    tokio::time::sleep(scheduler.config().quiescence() + Duration::from_millis(100)).await;
    println!("passes run: {}", scheduler.passes_run());
    Ok(())
}
