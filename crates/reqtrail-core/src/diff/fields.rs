//! Registry-driven field comparison.

use crate::diff::canonical::canonical_eq;
use crate::errors::ReqTrailError;
use crate::log_recovered;
use crate::model::{DiffWarning, FieldChange, FieldMapping, FieldValue, Snapshot};
use chrono::{DateTime, Utc};

/// Compare every registered field between baseline and live
///
/// Emits one [`FieldChange`] per mapping whose values differ under the
/// canonical equality contract, in registry order. Fields that are not in
/// `mappings` are never looked at. A value that cannot be canonicalized is
/// reported as changed and recorded in `warnings`.
pub fn detect_field_changes(
    baseline: &Snapshot,
    live: &Snapshot,
    mappings: &[FieldMapping],
    at: DateTime<Utc>,
    warnings: &mut Vec<DiffWarning>,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for mapping in mappings {
        let old = baseline.get(&mapping.field);
        let new = live.get(&mapping.field);

        let equal = match canonical_eq(old, new) {
            Ok(equal) => equal,
            Err(e) => {
                let reason = e.to_string();
                log_recovered!(
                    "detect_field_changes",
                    ReqTrailError::Uncomparable {
                        field: mapping.field.clone(),
                        reason: reason.clone(),
                    }
                );
                warnings.push(DiffWarning::UncomparableValue {
                    field: mapping.field.clone(),
                    reason,
                });
                false
            }
        };

        if !equal {
            changes.push(FieldChange {
                field: mapping.field.clone(),
                label: mapping.label.clone(),
                old_value: FieldValue::from_raw(mapping.value_kind, old),
                new_value: FieldValue::from_raw(mapping.value_kind, new),
                value_kind: mapping.value_kind,
                timestamp: at,
            });
        }
    }

    changes
}
