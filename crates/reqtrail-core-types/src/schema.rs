//! Canonical schema constants for structured logging and events
//!
//! These constants keep field keys and event names consistent between the
//! diff core, the scheduler and the audit mapper.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_PASS_ID: &str = "pass_id";
pub const FIELD_DELIVERY_ID: &str = "delivery_id";
pub const FIELD_RECORD_ID: &str = "record_id";

// Error fields, as written by the logging macros
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";
pub const FIELD_ERR_MESSAGE: &str = "err.message";
pub const FIELD_ERR_ENTITY_ID: &str = "err.entity_id";
pub const FIELD_ERR_FIELD: &str = "err.field";
pub const FIELD_ERR_PASS_ID: &str = "err.pass_id";
pub const FIELD_ERR_DELIVERY_ID: &str = "err.delivery_id";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SKIPPED: &str = "skipped";
