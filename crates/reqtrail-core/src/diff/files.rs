//! File-reference set comparison and pending-upload reporting.

use crate::config::PendingUploadSlot;
use crate::model::{FileChange, FileChangeType, Snapshot};
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::BTreeSet;

/// Placeholder used when no filename can be derived from a reference
pub const UNKNOWN_FILENAME: &str = "Unknown file";

/// Derive a display filename from a stored file reference (usually a URL)
///
/// Takes the last path segment (query and fragment dropped), strips the
/// upload prefix up to and including the first `_`, then percent-decodes what
/// remains. Falls back to [`UNKNOWN_FILENAME`] instead of failing.
pub fn filename_from_reference(reference: &str) -> String {
    let path = reference
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    let stripped = match segment.split_once('_') {
        Some((_, rest)) => rest,
        None => segment,
    };
    match percent_decode_str(stripped).decode_utf8() {
        Ok(name) if !name.trim().is_empty() => name.into_owned(),
        _ => UNKNOWN_FILENAME.to_string(),
    }
}

/// Read a file field as an ordered set of reference strings
///
/// A single string is a one-element set, absent or `null` is empty, and
/// non-string array members are skipped. Duplicates keep their first position.
fn reference_set(value: Option<&Value>) -> Vec<&str> {
    let candidates: Vec<&str> = match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    let mut seen = BTreeSet::new();
    candidates
        .into_iter()
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .collect()
}

/// Compute a set-delta between two ordered reference lists.
///
/// Returns `(added, removed)` where added = in b but not a, removed = in a but not b.
fn set_delta<'a>(a: &[&'a str], b: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
    let set_a: BTreeSet<&str> = a.iter().copied().collect();
    let set_b: BTreeSet<&str> = b.iter().copied().collect();
    let added = b.iter().copied().filter(|s| !set_a.contains(s)).collect();
    let removed = a.iter().copied().filter(|s| !set_b.contains(s)).collect();
    (added, removed)
}

/// Compare file-reference sets and report pending local uploads
///
/// For each field in `file_fields` (in order) all removals are emitted before
/// additions. Pending uploads on the live snapshot follow, one `Added` entry
/// per file with no url; a single-file slot reports only its first file.
pub fn detect_file_changes(
    baseline: &Snapshot,
    live: &Snapshot,
    file_fields: &[String],
    pending_slots: &[PendingUploadSlot],
    at: DateTime<Utc>,
) -> Vec<FileChange> {
    let mut changes = Vec::new();

    for field in file_fields {
        let before = reference_set(baseline.get(field));
        let after = reference_set(live.get(field));
        let (added, removed) = set_delta(&before, &after);

        for (change_type, refs) in [
            (FileChangeType::Removed, removed),
            (FileChangeType::Added, added),
        ] {
            changes.extend(refs.into_iter().map(|reference| FileChange {
                change_type,
                field: field.clone(),
                filename: filename_from_reference(reference),
                url: Some(reference.to_string()),
                timestamp: at,
            }));
        }
    }

    for slot in pending_slots {
        let files = live.pending_in(&slot.slot);
        let take = if slot.multiple { files.len() } else { files.len().min(1) };
        if files.len() > take {
            tracing::debug!(
                component = module_path!(),
                slot = slot.slot.as_str(),
                ignored = files.len() - take,
                "single-file slot holds extra files"
            );
        }
        changes.extend(files.iter().take(take).map(|file| FileChange {
            change_type: FileChangeType::Added,
            field: slot.field.clone(),
            filename: file
                .file_name()
                .filter(|n| !n.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| UNKNOWN_FILENAME.to_string()),
            url: None,
            timestamp: at,
        }));
    }

    changes
}
