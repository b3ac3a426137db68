//! Change summary demo
//!
//! Runs one diff pass over an edited event request and prints:
//! - the Markdown summary shown in the "pending changes" panel
//! - the structured change set as JSON

use chrono::Utc;
use reqtrail_core::logging_facility::{init, Profile};
use reqtrail_core::{detect_changes, render_change_summary, LocalFile, Snapshot, TrailConfig};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);

    let config = TrailConfig::event_request();

    let baseline = Snapshot::from_json(json!({
        "name": "Hack Night",
        "room": "E-201",
        "hasFood": false,
        "expectedAttendees": 40,
        "roomBookingFiles": ["https://files.example/u/1700000000_booking.pdf"],
        "invoices": [{"id": "i1", "vendor": "Costco", "total": 50}]
    }))?;

    let live = Snapshot::from_json(json!({
        "name": "Hack Night 2",
        "room": "E-201",
        "hasFood": true,
        "expectedAttendees": 40.0,
        "roomBookingFiles": [],
        "invoices": [
            {"id": "i1", "vendor": "Costco", "total": 70},
            {"id": "i2", "vendor": "Staples", "total": 12},
            {"vendor": "No id"}
        ]
    }))?
    .with_pending_upload("roomBookingFile", LocalFile::new("/home/ada/new booking.pdf"));

    let changes = detect_changes(&baseline, &live, &config, Utc::now());

    println!("{}", render_change_summary(&changes));
    println!("{}", serde_json::to_string_pretty(&changes)?);
    Ok(())
}
