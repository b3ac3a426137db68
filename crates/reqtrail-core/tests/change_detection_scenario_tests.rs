//! End-to-end diff passes over event-request snapshots.

mod common;

use chrono::{TimeZone, Utc};
use common::{config, saved_request, snapshot};
use reqtrail_core::diff::detect_changes;
use reqtrail_core::{
    DiffWarning, FieldValue, FileChangeType, InvoiceChangeType, LocalFile, Side, ValueKind,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_scenario_a_renamed_event() {
    let baseline = snapshot(json!({"name": "Hack Night"}));
    let live = snapshot(json!({"name": "Hack Night 2"}));

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());

    assert!(changes.has_changes);
    assert_eq!(changes.field_changes.len(), 1);
    assert!(changes.file_changes.is_empty());
    assert!(changes.invoice_changes.is_empty());

    let change = &changes.field_changes[0];
    assert_eq!(change.field, "name");
    assert_eq!(change.label, "Event Name");
    assert_eq!(change.value_kind, ValueKind::Text);
    assert_eq!(change.old_value, FieldValue::Text("Hack Night".to_string()));
    assert_eq!(change.new_value, FieldValue::Text("Hack Night 2".to_string()));
}

#[test]
fn test_scenario_b_invoice_modified_and_added() {
    let baseline = snapshot(json!({
        "invoices": [{"id": "i1", "vendor": "Costco", "total": 50}]
    }));
    let live = snapshot(json!({
        "invoices": [
            {"id": "i1", "vendor": "Costco", "total": 70},
            {"id": "i2", "vendor": "Staples", "total": 12}
        ]
    }));

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());

    assert!(changes.field_changes.is_empty());
    assert_eq!(changes.invoice_changes.len(), 2);

    let modified = &changes.invoice_changes[0];
    assert_eq!(modified.invoice_id, "i1");
    assert_eq!(modified.field, "total");
    assert_eq!(modified.change_type, InvoiceChangeType::Modified);
    assert_eq!(modified.old_value, json!(50));
    assert_eq!(modified.new_value, json!(70));

    let added = &changes.invoice_changes[1];
    assert_eq!(added.invoice_id, "i2");
    assert_eq!(added.field, "invoice");
    assert_eq!(added.change_type, InvoiceChangeType::Added);
    assert_eq!(added.old_value, Value::Null);
    assert_eq!(added.new_value["vendor"], "Staples");
}

#[test]
fn test_scenario_c_room_booking_file_removed() {
    let baseline = snapshot(json!({"roomBookingFiles": ["a.pdf"]}));
    let live = snapshot(json!({"roomBookingFiles": []}));

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());

    assert_eq!(changes.file_changes.len(), 1);
    let change = &changes.file_changes[0];
    assert_eq!(change.change_type, FileChangeType::Removed);
    assert_eq!(change.filename, "a.pdf");
    assert_eq!(change.field, "roomBookingFiles");
}

// ---------------------------------------------------------------------------
// Pass composition
// ---------------------------------------------------------------------------

#[test]
fn test_identical_snapshots_produce_empty_change_set() {
    let baseline = snapshot(saved_request());
    let live = snapshot(saved_request());

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());

    assert!(!changes.has_changes);
    assert!(changes.is_empty());
    assert!(changes.last_change_timestamp.is_none());
    assert!(changes.warnings.is_empty());
}

#[test]
fn test_float_formatting_and_key_order_are_not_changes() {
    let baseline = snapshot(saved_request());
    let mut live_json = saved_request();
    live_json["expectedAttendees"] = json!(60.0);
    live_json["contact"] = serde_json::from_str(r#"{"email":"ada@example.edu","name":"Ada"}"#)
        .expect("valid json");
    live_json["invoices"][0]["total"] = json!(50.0);
    let live = snapshot(live_json);

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());
    assert!(!changes.has_changes, "unexpected changes: {:?}", changes);
}

#[test]
fn test_full_edit_session_touches_every_group_in_order() {
    let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    let baseline = snapshot(saved_request());

    let mut live_json = saved_request();
    live_json["room"] = json!("E-305");
    live_json["hasFood"] = json!(false);
    live_json["servicesRequested"] = json!(["Catering", "AV"]);
    live_json["otherFiles"] = json!([]);
    live_json["invoices"] = json!([
        {"id": "i2", "vendor": "Domino's", "total": 135, "tax": 10, "tip": 15, "items": ["pizza"]},
        {"id": "i3", "vendor": "Target", "total": 20}
    ]);
    let live = snapshot(live_json)
        .with_pending_upload("invoiceFile", LocalFile::new("/home/ada/receipt.pdf"));

    let changes = detect_changes(&baseline, &live, &config(), at);

    let fields: Vec<_> = changes.field_changes.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["room", "hasFood", "servicesRequested", "otherFiles"]);

    let files: Vec<_> = changes
        .file_changes
        .iter()
        .map(|c| (c.change_type, c.field.as_str(), c.filename.as_str()))
        .collect();
    assert_eq!(
        files,
        vec![
            (FileChangeType::Removed, "otherFiles", "flyer v2.png"),
            (FileChangeType::Added, "invoiceFiles", "receipt.pdf"),
        ]
    );
    assert!(changes.file_changes[1].url.is_none());

    let invoices: Vec<_> = changes
        .invoice_changes
        .iter()
        .map(|c| (c.invoice_id.as_str(), c.field.as_str(), c.change_type))
        .collect();
    assert_eq!(
        invoices,
        vec![
            ("i1", "invoice", InvoiceChangeType::Removed),
            ("i2", "total", InvoiceChangeType::Modified),
            ("i3", "invoice", InvoiceChangeType::Added),
        ]
    );

    assert_eq!(changes.last_change_timestamp, Some(at));
    assert!(changes.field_changes.iter().all(|c| c.timestamp == at));
    assert!(changes.file_changes.iter().all(|c| c.timestamp == at));
    assert!(changes.invoice_changes.iter().all(|c| c.timestamp == at));
}

#[test]
fn test_absent_and_null_are_distinct() {
    let baseline = snapshot(json!({"description": null}));
    let live = snapshot(json!({}));

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());
    assert_eq!(changes.field_changes.len(), 1);
    assert_eq!(changes.field_changes[0].old_value, FieldValue::Null);
    assert_eq!(changes.field_changes[0].new_value, FieldValue::Absent);
}

#[test]
fn test_unidentifiable_invoices_surface_as_warnings() {
    let baseline = snapshot(json!({"invoices": [{"vendor": "Costco", "total": 5}]}));
    let live = snapshot(json!({"invoices": [{"vendor": "Costco", "total": 9}]}));

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());

    assert!(!changes.has_changes);
    assert_eq!(
        changes.warnings,
        vec![
            DiffWarning::UnidentifiableItem { side: Side::Baseline, index: 0 },
            DiffWarning::UnidentifiableItem { side: Side::Live, index: 0 },
        ]
    );
}

#[test]
fn test_change_set_serializes_with_tagged_values() {
    let baseline = snapshot(json!({"expectedAttendees": 40}));
    let live = snapshot(json!({"expectedAttendees": null}));

    let changes = detect_changes(&baseline, &live, &config(), Utc::now());
    let encoded = serde_json::to_value(&changes).expect("change set serializes");

    let change = &encoded["field_changes"][0];
    assert_eq!(change["old_value"], json!({"type": "number", "value": 40}));
    assert_eq!(change["new_value"], json!({"type": "null"}));
    assert_eq!(change["value_kind"], "number");
}
