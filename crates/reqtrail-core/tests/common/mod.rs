use reqtrail_core::{Snapshot, TrailConfig};
use serde_json::{json, Value};

/// Registry used by most integration tests
#[allow(dead_code)]
pub fn config() -> TrailConfig {
    TrailConfig::event_request()
}

/// Build a snapshot from a JSON object literal
#[allow(dead_code)]
pub fn snapshot(value: Value) -> Snapshot {
    Snapshot::from_json(value).expect("fixture must be a JSON object")
}

/// A fully populated event request, as loaded from the store
#[allow(dead_code)]
pub fn saved_request() -> Value {
    json!({
        "name": "Hack Night",
        "organization": "ACM",
        "description": "Overnight build session",
        "location": "Engineering Hall",
        "room": "E-201",
        "startDate": "2026-11-07T18:00:00Z",
        "endDate": "2026-11-08T06:00:00Z",
        "expectedAttendees": 60,
        "estimatedBudget": 450.0,
        "needsFunding": true,
        "hasFood": true,
        "isPublic": false,
        "department": "Computer Science",
        "status": "submitted",
        "servicesRequested": ["AV", "Catering"],
        "contact": {"name": "Ada", "email": "ada@example.edu"},
        "roomBookingFiles": ["https://files.example/u/1700000000_booking.pdf"],
        "invoiceFiles": [],
        "otherFiles": ["https://files.example/u/1700000001_flyer%20v2.png"],
        "invoices": [
            {"id": "i1", "vendor": "Costco", "total": 50, "tax": 4.5, "tip": 0, "items": ["chips", "soda"]},
            {"id": "i2", "vendor": "Domino's", "total": 120, "tax": 10, "tip": 15, "items": ["pizza"]}
        ]
    })
}
