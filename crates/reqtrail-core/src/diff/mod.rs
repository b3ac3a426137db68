//! Change detection.
//!
//! Compares a baseline snapshot of an event request with its live state and
//! produces a structured, deterministic [`ChangeSet`](crate::model::ChangeSet).
//!
//! ## Entry point
//!
//! ```ignore
//! use reqtrail_core::config::TrailConfig;
//! use reqtrail_core::diff::{detect_changes, render_change_summary};
//!
//! let changes = detect_changes(&baseline, &live, &TrailConfig::event_request(), Utc::now());
//! let summary = render_change_summary(&changes);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical change sets, in
//!   registry order for fields and first-seen order for invoices.
//! - **Canonical equality**: object key order and integral float formatting
//!   never count as changes; array order does.
//! - **Totality**: a pass never fails. Unidentifiable invoices, duplicate ids
//!   and uncomparable values surface as warnings on the change set.

pub mod canonical;
pub mod collection;
pub mod engine;
pub mod fields;
pub mod files;
pub mod human_summary;

pub use engine::detect_changes;
pub use human_summary::render_change_summary;
