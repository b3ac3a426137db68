//! One complete diff pass.
//!
//! The core entry point is [`detect_changes`], which runs the three detectors
//! against a baseline and a live snapshot and assembles a [`ChangeSet`].

use crate::config::TrailConfig;
use crate::diff::collection::{collection_items, detect_invoice_changes};
use crate::diff::fields::detect_field_changes;
use crate::diff::files::detect_file_changes;
use crate::model::{ChangeSet, Snapshot};
use chrono::{DateTime, Utc};

/// Compute the change set between `baseline` and `live`
///
/// Detectors run in the fixed order field → file → collection, so output
/// composition is deterministic. All entries share the pass time `at`. The
/// pass never fails: problems are absorbed into `ChangeSet::warnings`.
pub fn detect_changes(
    baseline: &Snapshot,
    live: &Snapshot,
    config: &TrailConfig,
    at: DateTime<Utc>,
) -> ChangeSet {
    let mut warnings = Vec::new();

    let field_changes = detect_field_changes(baseline, live, &config.fields, at, &mut warnings);

    let file_changes = detect_file_changes(
        baseline,
        live,
        &config.file_fields,
        &config.pending_uploads,
        at,
    );

    let collection = &config.collection;
    let invoice_changes = detect_invoice_changes(
        collection_items(baseline.get(&collection.field)),
        collection_items(live.get(&collection.field)),
        &collection.id_field,
        &collection.compared_fields,
        at,
        &mut warnings,
    );

    tracing::debug!(
        component = module_path!(),
        field_changes = field_changes.len(),
        file_changes = file_changes.len(),
        invoice_changes = invoice_changes.len(),
        warnings = warnings.len(),
        "diff pass computed"
    );

    ChangeSet::new(field_changes, file_changes, invoice_changes, warnings, at)
}
