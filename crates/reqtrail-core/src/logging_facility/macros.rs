//! Canonical logging macros
//!
//! Every operation boundary in the engine (diff pass, audit delivery, sink
//! group write) is logged through these macros so that `op`/`event` pairs
//! stay uniform across crates.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use reqtrail_core::log_op_start;
/// log_op_start!("diff_pass");
/// log_op_start!("diff_pass", record_id = "req-42");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use reqtrail_core::log_op_end;
/// log_op_end!("diff_pass", duration_ms = 3);
/// log_op_end!("diff_pass", duration_ms = 3, field_changes = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation that ended in error
///
/// The error is converted into an `ExError` so the log carries its stable
/// kind and code, plus whichever context (entity, field, pass and delivery
/// ids) it was built with.
///
/// # Example
///
/// ```
/// # use reqtrail_core::{log_op_error, errors::ReqTrailError};
/// let err = ReqTrailError::SinkRejected {
///     record_id: "req-1".to_string(),
///     group: "field".to_string(),
///     reason: "quota exceeded".to_string(),
/// };
/// log_op_error!("log_field_changes", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            err.entity_id = ex_err.entity_id(),
            err.field = ex_err.field(),
            err.pass_id = ex_err.pass_id().map(|id| id.as_str()),
            err.delivery_id = ex_err.delivery_id().map(|id| id.as_str()),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            err.entity_id = ex_err.entity_id(),
            err.field = ex_err.field(),
            err.pass_id = ex_err.pass_id().map(|id| id.as_str()),
            err.delivery_id = ex_err.delivery_id().map(|id| id.as_str()),
            $($field)*
        );
    }};
}

/// Log a failure that was absorbed locally (the operation continues)
///
/// # Example
///
/// ```
/// # use reqtrail_core::{log_recovered, errors::ReqTrailError};
/// let err = ReqTrailError::UnidentifiableItem { side: "live".to_string(), index: 2 };
/// log_recovered!("detect_invoice_changes", err);
/// ```
#[macro_export]
macro_rules! log_recovered {
    ($op:expr, $err:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            err.entity_id = ex_err.entity_id(),
            err.field = ex_err.field(),
            err.pass_id = ex_err.pass_id().map(|id| id.as_str()),
            err.delivery_id = ex_err.delivery_id().map(|id| id.as_str()),
        );
    }};
    ($op:expr, $err:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.message = ex_err.message(),
            err.entity_id = ex_err.entity_id(),
            err.field = ex_err.field(),
            err.pass_id = ex_err.pass_id().map(|id| id.as_str()),
            err.delivery_id = ex_err.delivery_id().map(|id| id.as_str()),
            $($field)*
        );
    }};
}
