//! Audit-log entry shapes handed to the sink.
//!
//! Entries keep the raw values from the change set and add display strings,
//! so a sink can store either without re-deriving presentation rules.

use chrono::{DateTime, Utc};
use reqtrail_core::diff::human_summary::{describe_invoice_change, display_value};
use reqtrail_core::{
    ChangeSet, FieldChange, FieldValue, FileChange, FileChangeType, InvoiceChange,
    InvoiceChangeType, ValueKind,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One changed field, ready for the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAuditEntry {
    pub field: String,
    pub label: String,
    pub value_kind: ValueKind,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
    pub old_display: String,
    pub new_display: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&FieldChange> for FieldAuditEntry {
    fn from(change: &FieldChange) -> Self {
        Self {
            field: change.field.clone(),
            label: change.label.clone(),
            value_kind: change.value_kind,
            old_value: change.old_value.clone(),
            new_value: change.new_value.clone(),
            old_display: change.old_value.display(change.value_kind),
            new_display: change.new_value.display(change.value_kind),
            timestamp: change.timestamp,
        }
    }
}

/// One added or removed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAuditEntry {
    pub action: FileChangeType,
    pub field: String,
    pub filename: String,
    /// `None` for a local file that is not uploaded yet
    pub url: Option<String>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&FileChange> for FileAuditEntry {
    fn from(change: &FileChange) -> Self {
        let description = match change.change_type {
            FileChangeType::Added => format!("Added file {}", change.filename),
            FileChangeType::Removed => format!("Removed file {}", change.filename),
        };
        Self {
            action: change.change_type,
            field: change.field.clone(),
            filename: change.filename.clone(),
            url: change.url.clone(),
            description,
            timestamp: change.timestamp,
        }
    }
}

/// One invoice presence change or modified invoice field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAuditEntry {
    pub invoice_id: String,
    pub field: String,
    pub action: InvoiceChangeType,
    pub old_value: Value,
    pub new_value: Value,
    pub old_display: String,
    pub new_display: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&InvoiceChange> for InvoiceAuditEntry {
    fn from(change: &InvoiceChange) -> Self {
        Self {
            invoice_id: change.invoice_id.clone(),
            field: change.field.clone(),
            action: change.change_type,
            old_value: change.old_value.clone(),
            new_value: change.new_value.clone(),
            old_display: display_value(&change.old_value),
            new_display: display_value(&change.new_value),
            summary: describe_invoice_change(change),
            timestamp: change.timestamp,
        }
    }
}

/// The three entry groups of one change set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditEntries {
    pub fields: Vec<FieldAuditEntry>,
    pub files: Vec<FileAuditEntry>,
    pub invoices: Vec<InvoiceAuditEntry>,
}

impl AuditEntries {
    /// Split a change set into entry groups, preserving detector order
    pub fn from_change_set(changes: &ChangeSet) -> Self {
        Self {
            fields: changes.field_changes.iter().map(Into::into).collect(),
            files: changes.file_changes.iter().map(Into::into).collect(),
            invoices: changes.invoice_changes.iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty() && self.invoices.is_empty()
    }
}
