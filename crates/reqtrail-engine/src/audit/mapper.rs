//! Best-effort delivery of a change set to the audit sink.

use crate::audit::{ActorResolver, AuditEntries, AuditGroup, AuditSink};
use reqtrail_core::schema::EVENT_SKIPPED;
use reqtrail_core::{ChangeSet, ExError, ReqTrailError};
use reqtrail_core_types::{DeliveryId, PassContext};
use std::sync::Arc;
use std::time::Instant;

/// Record and actor a delivery is made for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub record_id: String,
    pub actor_id: String,
}

impl AuditContext {
    pub fn new(record_id: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            actor_id: actor_id.into(),
        }
    }
}

/// Outcome of one delivery
///
/// Informational only: failures have already been logged when the report is
/// returned, and nothing is retried.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    /// `None` when the change set was empty and nothing was sent
    pub delivery_id: Option<DeliveryId>,
    pub actor_name: Option<String>,
    pub delivered: Vec<AuditGroup>,
    pub failed: Vec<(AuditGroup, ReqTrailError)>,
}

impl DeliveryReport {
    /// Whether every non-empty group reached the sink
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn was_skipped(&self) -> bool {
        self.delivery_id.is_none()
    }
}

/// Reshapes change sets into audit entries and forwards them to a sink
///
/// One delivery resolves the actor name once, then calls the sink once per
/// non-empty group in the order field, file, invoice. A failing group is
/// logged and does not stop the others.
#[derive(Clone)]
pub struct AuditLogMapper {
    sink: Arc<dyn AuditSink>,
    resolver: Arc<dyn ActorResolver>,
}

impl AuditLogMapper {
    pub fn new(sink: Arc<dyn AuditSink>, resolver: Arc<dyn ActorResolver>) -> Self {
        Self { sink, resolver }
    }

    /// Deliver `changes` outside of any scheduled pass
    pub async fn map(&self, context: &AuditContext, changes: &ChangeSet) -> DeliveryReport {
        self.map_for_pass(context, changes, PassContext::new()).await
    }

    /// Deliver the change set produced by the pass described by `pass`
    pub async fn map_for_pass(
        &self,
        context: &AuditContext,
        changes: &ChangeSet,
        pass: PassContext,
    ) -> DeliveryReport {
        let entries = AuditEntries::from_change_set(changes);
        if entries.is_empty() {
            tracing::debug!(
                component = module_path!(),
                op = "audit_delivery",
                event = EVENT_SKIPPED,
                record_id = context.record_id.as_str(),
                pass_id = pass.pass_id.as_str(),
            );
            return DeliveryReport::default();
        }

        let pass = pass.begin_delivery();
        let delivery_id = pass.delivery_id.clone().unwrap_or_default();
        let start = Instant::now();
        reqtrail_core::log_op_start!(
            "audit_delivery",
            record_id = context.record_id.as_str(),
            pass_id = pass.pass_id.as_str(),
            delivery_id = delivery_id.as_str()
        );

        let actor_name = self.resolver.resolve_actor_name(&context.actor_id).await;
        let mut report = DeliveryReport {
            delivery_id: Some(delivery_id.clone()),
            actor_name: Some(actor_name.clone()),
            ..DeliveryReport::default()
        };

        if !entries.fields.is_empty() {
            let started = Instant::now();
            let outcome = self
                .sink
                .log_field_changes(
                    &context.record_id,
                    &context.actor_id,
                    &entries.fields,
                    &actor_name,
                )
                .await;
            record_outcome(
                AuditGroup::Field,
                entries.fields.len(),
                outcome,
                started,
                context,
                &pass,
                &mut report,
            );
        }

        if !entries.files.is_empty() {
            let started = Instant::now();
            let outcome = self
                .sink
                .log_file_changes(
                    &context.record_id,
                    &context.actor_id,
                    &entries.files,
                    &actor_name,
                )
                .await;
            record_outcome(
                AuditGroup::File,
                entries.files.len(),
                outcome,
                started,
                context,
                &pass,
                &mut report,
            );
        }

        if !entries.invoices.is_empty() {
            let started = Instant::now();
            let outcome = self
                .sink
                .log_invoice_changes(
                    &context.record_id,
                    &context.actor_id,
                    &entries.invoices,
                    &actor_name,
                )
                .await;
            record_outcome(
                AuditGroup::Invoice,
                entries.invoices.len(),
                outcome,
                started,
                context,
                &pass,
                &mut report,
            );
        }

        reqtrail_core::log_op_end!(
            "audit_delivery",
            duration_ms = start.elapsed().as_millis() as u64,
            record_id = context.record_id.as_str(),
            delivery_id = delivery_id.as_str(),
            delivered = report.delivered.len(),
            failed = report.failed.len()
        );
        report
    }
}

fn record_outcome(
    group: AuditGroup,
    entry_count: usize,
    outcome: reqtrail_core::Result<()>,
    started: Instant,
    context: &AuditContext,
    pass: &PassContext,
    report: &mut DeliveryReport,
) {
    let duration_ms = started.elapsed().as_millis() as u64;
    let delivery_id = pass.delivery_id.clone().unwrap_or_default();
    match outcome {
        Ok(()) => {
            tracing::debug!(
                component = module_path!(),
                op = group.op(),
                record_id = context.record_id.as_str(),
                delivery_id = delivery_id.as_str(),
                entries = entry_count,
                duration_ms,
                "audit group delivered"
            );
            report.delivered.push(group);
        }
        Err(err) => {
            let logged = ExError::from(err.clone())
                .with_pass_id(pass.pass_id.clone())
                .with_delivery_id(delivery_id);
            reqtrail_core::log_op_error!(
                group.op(),
                logged,
                duration_ms = duration_ms,
                record_id = context.record_id.as_str(),
                entries = entry_count
            );
            report.failed.push((group, err));
        }
    }
}
