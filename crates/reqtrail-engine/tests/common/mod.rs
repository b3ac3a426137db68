use async_trait::async_trait;
use reqtrail_core::{ReqTrailError, Result, Snapshot};
use reqtrail_engine::{
    ActorResolver, AuditGroup, AuditSink, FieldAuditEntry, FileAuditEntry, InvoiceAuditEntry,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One sink call as the sink saw it
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SinkCall {
    pub group: AuditGroup,
    pub record_id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub entries: Value,
}

/// Sink that records every call and can be told to fail or stall per group
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failing: HashSet<AuditGroup>,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(groups: &[AuditGroup]) -> Self {
        Self {
            failing: groups.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn groups(&self) -> Vec<AuditGroup> {
        self.calls().into_iter().map(|c| c.group).collect()
    }

    async fn record<T: serde::Serialize>(
        &self,
        group: AuditGroup,
        record_id: &str,
        actor_id: &str,
        entries: &[T],
        actor_name: &str,
    ) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().unwrap().push(SinkCall {
            group,
            record_id: record_id.to_string(),
            actor_id: actor_id.to_string(),
            actor_name: actor_name.to_string(),
            entries: serde_json::to_value(entries).unwrap(),
        });
        if self.failing.contains(&group) {
            return Err(ReqTrailError::SinkRejected {
                record_id: record_id.to_string(),
                group: group.to_string(),
                reason: "write refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn log_field_changes(
        &self,
        record_id: &str,
        actor_id: &str,
        entries: &[FieldAuditEntry],
        actor_name: &str,
    ) -> Result<()> {
        self.record(AuditGroup::Field, record_id, actor_id, entries, actor_name)
            .await
    }

    async fn log_file_changes(
        &self,
        record_id: &str,
        actor_id: &str,
        entries: &[FileAuditEntry],
        actor_name: &str,
    ) -> Result<()> {
        self.record(AuditGroup::File, record_id, actor_id, entries, actor_name)
            .await
    }

    async fn log_invoice_changes(
        &self,
        record_id: &str,
        actor_id: &str,
        entries: &[InvoiceAuditEntry],
        actor_name: &str,
    ) -> Result<()> {
        self.record(AuditGroup::Invoice, record_id, actor_id, entries, actor_name)
            .await
    }
}

/// Resolver that counts lookups
#[derive(Default)]
pub struct CountingResolver {
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl CountingResolver {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActorResolver for CountingResolver {
    async fn resolve_actor_name(&self, actor_id: &str) -> String {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        format!("Officer {}", actor_id)
    }
}

#[allow(dead_code)]
pub fn request(name: &str) -> Snapshot {
    Snapshot::from_json(json!({
        "name": name,
        "roomBookingFiles": ["https://files.example/u/17_booking.pdf"],
        "invoices": [{"id": "i1", "vendor": "Costco", "total": 50}]
    }))
    .unwrap()
}
