//! Human-readable summary renderer for change sets.

use crate::model::{
    ChangeSet, DiffWarning, FieldValue, FileChangeType, InvoiceChange, InvoiceChangeType,
    ValueKind,
};
use serde_json::Value;

/// Render a raw JSON value for people: strings unquoted, integral floats as
/// integers, booleans as Yes/No, null as "(empty)".
pub fn display_value(value: &Value) -> String {
    FieldValue::from_raw(ValueKind::Text, Some(value)).display(ValueKind::Text)
}

/// Short description of a whole invoice, e.g. `Staples, 12`
pub fn describe_invoice(item: &Value) -> String {
    let parts: Vec<String> = ["vendor", "total"]
        .iter()
        .filter_map(|key| item.get(*key))
        .filter(|v| !v.is_null())
        .map(display_value)
        .collect();
    if parts.is_empty() {
        "no details".to_string()
    } else {
        parts.join(", ")
    }
}

/// One-line description of an invoice change
pub fn describe_invoice_change(change: &InvoiceChange) -> String {
    match change.change_type {
        InvoiceChangeType::Added => format!(
            "Added invoice `{}` ({})",
            change.invoice_id,
            describe_invoice(&change.new_value)
        ),
        InvoiceChangeType::Removed => format!(
            "Removed invoice `{}` ({})",
            change.invoice_id,
            describe_invoice(&change.old_value)
        ),
        InvoiceChangeType::Modified => format!(
            "Invoice `{}` {}: `{}` → `{}`",
            change.invoice_id,
            change.field,
            display_value(&change.old_value),
            display_value(&change.new_value)
        ),
    }
}

/// Render a Markdown summary of a [`ChangeSet`].
///
/// Intended for the "pending changes" panel and for audit entry previews.
/// Informational only.
pub fn render_change_summary(changes: &ChangeSet) -> String {
    let mut out = String::new();

    out.push_str("## Event Request Changes\n\n");

    if !changes.has_changes {
        out.push_str("_No changes detected._\n");
        render_warnings(&changes.warnings, &mut out);
        return out;
    }

    out.push_str(&format!(
        "**Changes**: {} (fields: {}, files: {}, invoices: {})\n\n",
        changes.len(),
        changes.field_changes.len(),
        changes.file_changes.len(),
        changes.invoice_changes.len()
    ));

    if !changes.field_changes.is_empty() {
        out.push_str("### Field Changes\n\n");
        for change in &changes.field_changes {
            out.push_str(&format!(
                "- **{}**: `{}` → `{}`\n",
                change.label,
                change.old_value.display(change.value_kind),
                change.new_value.display(change.value_kind)
            ));
        }
        out.push('\n');
    }

    if !changes.file_changes.is_empty() {
        out.push_str("### File Changes\n\n");
        for change in &changes.file_changes {
            let line = match (change.change_type, &change.url) {
                (FileChangeType::Added, Some(_)) => {
                    format!("- **Added** `{}` to {}\n", change.filename, change.field)
                }
                (FileChangeType::Added, None) => format!(
                    "- **Added** `{}` to {} (pending upload)\n",
                    change.filename, change.field
                ),
                (FileChangeType::Removed, _) => {
                    format!("- **Removed** `{}` from {}\n", change.filename, change.field)
                }
            };
            out.push_str(&line);
        }
        out.push('\n');
    }

    if !changes.invoice_changes.is_empty() {
        out.push_str("### Invoice Changes\n\n");
        for change in &changes.invoice_changes {
            out.push_str(&format!("- {}\n", describe_invoice_change(change)));
        }
        out.push('\n');
    }

    render_warnings(&changes.warnings, &mut out);
    out
}

fn render_warnings(warnings: &[DiffWarning], out: &mut String) {
    if warnings.is_empty() {
        return;
    }
    out.push_str("\n### ⚠ Warnings\n\n");
    for warning in warnings {
        let line = match warning {
            DiffWarning::UnidentifiableItem { side, index } => {
                format!("- {side} invoice at position {index} has no id and was skipped\n")
            }
            DiffWarning::DuplicateItemId { side, id } => {
                format!("- {side} invoices share id `{id}`; the last one was used\n")
            }
            DiffWarning::UncomparableValue { field, reason } => {
                format!("- `{field}` could not be compared ({reason}); treated as changed\n")
            }
        };
        out.push_str(&line);
    }
}
