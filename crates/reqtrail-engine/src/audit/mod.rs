//! Audit delivery.
//!
//! The engine never persists audit history itself. It reshapes a change set
//! into entries and hands them to an [`AuditSink`] supplied by the host
//! application, resolving the acting party's display name through an
//! [`ActorResolver`].

pub mod entries;
pub mod mapper;

use async_trait::async_trait;
use reqtrail_core::Result;

pub use entries::{AuditEntries, FieldAuditEntry, FileAuditEntry, InvoiceAuditEntry};
pub use mapper::{AuditContext, AuditLogMapper, DeliveryReport};

/// External system of record for human-readable change history
///
/// Each method receives one non-empty entry group. Failures are reported to
/// the mapper, which logs them and carries on with the remaining groups.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_field_changes(
        &self,
        record_id: &str,
        actor_id: &str,
        entries: &[FieldAuditEntry],
        actor_name: &str,
    ) -> Result<()>;

    async fn log_file_changes(
        &self,
        record_id: &str,
        actor_id: &str,
        entries: &[FileAuditEntry],
        actor_name: &str,
    ) -> Result<()>;

    async fn log_invoice_changes(
        &self,
        record_id: &str,
        actor_id: &str,
        entries: &[InvoiceAuditEntry],
        actor_name: &str,
    ) -> Result<()>;
}

/// Resolves an actor id into a display name
///
/// Called once per delivery. Implementations fall back to a placeholder
/// (for example the id itself) rather than failing.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    async fn resolve_actor_name(&self, actor_id: &str) -> String;
}

/// Resolver that always answers with the actor id
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorIdResolver;

#[async_trait]
impl ActorResolver for ActorIdResolver {
    async fn resolve_actor_name(&self, actor_id: &str) -> String {
        actor_id.to_string()
    }
}

/// The three entry groups, in delivery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditGroup {
    Field,
    File,
    Invoice,
}

impl AuditGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditGroup::Field => "field",
            AuditGroup::File => "file",
            AuditGroup::Invoice => "invoice",
        }
    }

    /// Name of the sink operation that receives this group
    pub fn op(&self) -> &'static str {
        match self {
            AuditGroup::Field => "log_field_changes",
            AuditGroup::File => "log_file_changes",
            AuditGroup::Invoice => "log_invoice_changes",
        }
    }
}

impl std::fmt::Display for AuditGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
