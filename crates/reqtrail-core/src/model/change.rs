//! Diff pass output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Vectors keep detector emission order so that two passes over the same
//! input serialize identically.

use crate::model::field::{FieldValue, ValueKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name used by whole-invoice presence changes
pub const INVOICE_FIELD: &str = "invoice";

/// A monitored field whose value differs between baseline and live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    pub field: String,
    pub label: String,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
    pub value_kind: ValueKind,
    pub timestamp: DateTime<Utc>,
}

/// Direction of a file-reference change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeType {
    Added,
    Removed,
}

/// A file reference added to or removed from a file field
///
/// `url` is `None` for pending local files that have no persisted location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileChange {
    pub change_type: FileChangeType,
    pub field: String,
    pub filename: String,
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Kind of an invoice change
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceChangeType {
    Added,
    Removed,
    Modified,
}

/// One change to the invoice collection
///
/// With `field == "invoice"` the whole invoice was added or removed and the
/// values hold the full item (or `Null` on the missing side). Otherwise one
/// sub-field of a matched invoice was modified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceChange {
    pub invoice_id: String,
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
    pub change_type: InvoiceChangeType,
    pub timestamp: DateTime<Utc>,
}

impl InvoiceChange {
    /// True for whole-invoice additions and removals
    pub fn is_presence_change(&self) -> bool {
        self.field == INVOICE_FIELD && self.change_type != InvoiceChangeType::Modified
    }
}

/// Which snapshot a warning refers to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Baseline,
    Live,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Baseline => write!(f, "baseline"),
            Side::Live => write!(f, "live"),
        }
    }
}

/// A non-fatal problem met during a diff pass
///
/// Warnings are reported alongside the changes and never count as changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum DiffWarning {
    /// A collection item without a usable id was left out of reconciliation
    UnidentifiableItem { side: Side, index: usize },
    /// Two items on one side share an id; the later one was used
    DuplicateItemId { side: Side, id: String },
    /// A value could not be canonicalized and was treated as changed
    UncomparableValue { field: String, reason: String },
}

/// Aggregate output of one diff pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChangeSet {
    pub field_changes: Vec<FieldChange>,
    pub file_changes: Vec<FileChange>,
    pub invoice_changes: Vec<InvoiceChange>,
    pub has_changes: bool,
    /// Pass time of the latest pass that found changes
    pub last_change_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub warnings: Vec<DiffWarning>,
}

impl ChangeSet {
    /// Assemble a change set, deriving `has_changes` from the three groups
    pub fn new(
        field_changes: Vec<FieldChange>,
        file_changes: Vec<FileChange>,
        invoice_changes: Vec<InvoiceChange>,
        warnings: Vec<DiffWarning>,
        at: DateTime<Utc>,
    ) -> Self {
        let has_changes =
            !(field_changes.is_empty() && file_changes.is_empty() && invoice_changes.is_empty());
        Self {
            field_changes,
            file_changes,
            invoice_changes,
            has_changes,
            last_change_timestamp: has_changes.then_some(at),
            warnings,
        }
    }

    /// Total number of changes across all groups
    pub fn len(&self) -> usize {
        self.field_changes.len() + self.file_changes.len() + self.invoice_changes.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_changes
    }
}
