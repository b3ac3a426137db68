//! ReqTrail Core - change detection for event requests
//!
//! This crate provides the deterministic half of the audit trail:
//! - Snapshot and change-record models
//! - Field, file and invoice-collection diff detectors
//! - Canonical JSON equality
//! - Registry configuration loaded from TOML
//! - Error taxonomy and structured logging facility
//!
//! Scheduling and audit delivery live in `reqtrail-engine`.

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;

pub use reqtrail_core_types::schema;

// Re-export commonly used types
pub use config::{CollectionConfig, PendingUploadSlot, TrailConfig};
pub use diff::{detect_changes, render_change_summary};
pub use errors::{ExError, ExErrorKind, ReqTrailError, Result};
pub use model::{
    ChangeSet, DiffWarning, FieldChange, FieldMapping, FieldValue, FileChange, FileChangeType,
    InvoiceChange, InvoiceChangeType, LocalFile, Side, Snapshot, ValueKind,
};
