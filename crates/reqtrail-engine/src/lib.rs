//! ReqTrail Engine - scheduling and audit delivery
//!
//! Wraps the synchronous diff core with the event-driven parts:
//! - `ChangeScheduler`: debounced diff passes on a tokio runtime
//! - `AuditLogMapper`: best-effort delivery of change sets to an audit sink

pub mod audit;
pub mod scheduler;

pub use audit::{
    ActorIdResolver, ActorResolver, AuditContext, AuditEntries, AuditGroup, AuditLogMapper,
    AuditSink, DeliveryReport, FieldAuditEntry, FileAuditEntry, InvoiceAuditEntry,
};
pub use scheduler::{ChangeScheduler, SchedulerPhase};
