//! Keyed reconciliation of the invoice sub-collection.
//!
//! Items are matched by id, never by position: an invoice that moved within
//! the list but kept its id is the same logical invoice.

use crate::diff::canonical::canonical_eq;
use crate::errors::ReqTrailError;
use crate::log_recovered;
use crate::model::{DiffWarning, InvoiceChange, InvoiceChangeType, Side, INVOICE_FIELD};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// Baseline/live pair for one id
#[derive(Default)]
struct Slot<'a> {
    old: Option<&'a Value>,
    new: Option<&'a Value>,
}

/// Read the collection field as a list of items; anything but an array is empty
pub fn collection_items(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Stable id of an item: a non-empty string or a number under `id_field`
fn item_id(item: &Value, id_field: &str) -> Option<String> {
    match item.as_object()?.get(id_field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reconcile baseline and live items by id
///
/// Ids are visited in first-seen order (baseline first, then ids that only
/// appear in live). Per id:
///
/// - baseline only: one `Removed` change on field `"invoice"`
/// - live only: one `Added` change on field `"invoice"`
/// - both: one `Modified` change per differing field in `compared_fields`
///
/// Items without a usable id are left out and reported in `warnings`, as are
/// repeated ids on one side (the later item wins).
pub fn detect_invoice_changes(
    baseline_items: &[Value],
    live_items: &[Value],
    id_field: &str,
    compared_fields: &[String],
    at: DateTime<Utc>,
    warnings: &mut Vec<DiffWarning>,
) -> Vec<InvoiceChange> {
    let mut order: Vec<String> = Vec::new();
    let mut index: HashMap<String, Slot<'_>> = HashMap::new();

    for (side, items) in [(Side::Baseline, baseline_items), (Side::Live, live_items)] {
        for (position, item) in items.iter().enumerate() {
            let Some(id) = item_id(item, id_field) else {
                log_recovered!(
                    "detect_invoice_changes",
                    ReqTrailError::UnidentifiableItem {
                        side: side.to_string(),
                        index: position,
                    }
                );
                warnings.push(DiffWarning::UnidentifiableItem {
                    side,
                    index: position,
                });
                continue;
            };

            let slot = index.entry(id.clone()).or_insert_with(|| {
                order.push(id.clone());
                Slot::default()
            });
            let target = match side {
                Side::Baseline => &mut slot.old,
                Side::Live => &mut slot.new,
            };
            if target.replace(item).is_some() {
                log_recovered!(
                    "detect_invoice_changes",
                    ReqTrailError::DuplicateItemId {
                        side: side.to_string(),
                        id: id.clone(),
                    }
                );
                warnings.push(DiffWarning::DuplicateItemId { side, id });
            }
        }
    }

    let mut changes = Vec::new();
    for id in order {
        let Some(slot) = index.get(&id) else { continue };
        match (slot.old, slot.new) {
            (Some(old), None) => changes.push(InvoiceChange {
                invoice_id: id,
                field: INVOICE_FIELD.to_string(),
                old_value: old.clone(),
                new_value: Value::Null,
                change_type: InvoiceChangeType::Removed,
                timestamp: at,
            }),
            (None, Some(new)) => changes.push(InvoiceChange {
                invoice_id: id,
                field: INVOICE_FIELD.to_string(),
                old_value: Value::Null,
                new_value: new.clone(),
                change_type: InvoiceChangeType::Added,
                timestamp: at,
            }),
            (Some(old), Some(new)) => {
                for field in compared_fields {
                    let before = old.get(field);
                    let after = new.get(field);
                    let equal = canonical_eq(before, after).unwrap_or_else(|e| {
                        let path = format!("{}[{}].{}", INVOICE_FIELD, id, field);
                        let reason = e.to_string();
                        log_recovered!(
                            "detect_invoice_changes",
                            ReqTrailError::Uncomparable {
                                field: path.clone(),
                                reason: reason.clone(),
                            }
                        );
                        warnings.push(DiffWarning::UncomparableValue {
                            field: path,
                            reason,
                        });
                        false
                    });
                    if !equal {
                        changes.push(InvoiceChange {
                            invoice_id: id.clone(),
                            field: field.clone(),
                            old_value: before.cloned().unwrap_or(Value::Null),
                            new_value: after.cloned().unwrap_or(Value::Null),
                            change_type: InvoiceChangeType::Modified,
                            timestamp: at,
                        });
                    }
                }
            }
            (None, None) => {}
        }
    }

    changes
}
