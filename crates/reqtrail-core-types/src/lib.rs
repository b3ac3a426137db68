//! Core types shared across reqtrail facilities
//!
//! This crate provides foundational types used by both the change-detection
//! core and the scheduling/audit engine:
//!
//! - **Correlation types**: PassId, DeliveryId, PassContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{DeliveryId, PassContext, PassId};
