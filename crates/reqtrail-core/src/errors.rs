use reqtrail_core_types::{DeliveryId, PassId};
use thiserror::Error;

/// Result type alias using ReqTrailError
pub type Result<T> = std::result::Result<T, ReqTrailError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure the engine observes is classified into one of these kinds
/// before it is logged. Each kind maps to a stable error code usable in log
/// queries and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    InvalidConfig,
    DuplicateMapping,

    // Diffing (recovered locally, never surfaced)
    UncomparableValue,
    UnidentifiableItem,
    DuplicateItemId,
    Serialization,

    // Collaborators
    ExternalService,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::DuplicateMapping => "ERR_DUPLICATE_MAPPING",
            ExErrorKind::UncomparableValue => "ERR_UNCOMPARABLE_VALUE",
            ExErrorKind::UnidentifiableItem => "ERR_UNIDENTIFIABLE_ITEM",
            ExErrorKind::DuplicateItemId => "ERR_DUPLICATE_ITEM_ID",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and the context
/// (operation, record, field, correlation ids) needed when the error is
/// logged instead of returned.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    field: Option<String>,
    pass_id: Option<PassId>,
    delivery_id: Option<DeliveryId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            field: None,
            pass_id: None,
            delivery_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (record id or invoice id)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add field name context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add diff pass context
    pub fn with_pass_id(mut self, pass_id: PassId) -> Self {
        self.pass_id = Some(pass_id);
        self
    }

    /// Add audit delivery context
    pub fn with_delivery_id(mut self, delivery_id: DeliveryId) -> Self {
        self.delivery_id = Some(delivery_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the field context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the diff pass id, if any
    pub fn pass_id(&self) -> Option<&PassId> {
        self.pass_id.as_ref()
    }

    /// Get the audit delivery id, if any
    pub fn delivery_id(&self) -> Option<&DeliveryId> {
        self.delivery_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for reqtrail operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReqTrailError {
    /// Snapshot input was not a JSON object
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// Configuration failed validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The same field is registered more than once
    #[error("Field registered more than once: {field}")]
    DuplicateMapping { field: String },

    /// Configuration text could not be parsed
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    /// A value could not be canonicalized for comparison
    #[error("Value of {field} cannot be compared: {reason}")]
    Uncomparable { field: String, reason: String },

    /// A collection item has no usable id
    #[error("{side} item at index {index} has no usable id")]
    UnidentifiableItem { side: String, index: usize },

    /// Two collection items on one side share an id
    #[error("{side} items share id {id}; the later item is used")]
    DuplicateItemId { side: String, id: String },

    /// JSON (de)serialization failed
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The audit sink rejected or failed a write
    #[error("Audit sink rejected {group} changes for {record_id}: {reason}")]
    SinkRejected {
        record_id: String,
        group: String,
        reason: String,
    },

    /// No async runtime was available to run timers or deliveries
    #[error("Async runtime unavailable: {reason}")]
    RuntimeUnavailable { reason: String },
}

impl From<ReqTrailError> for ExError {
    fn from(err: ReqTrailError) -> Self {
        match err {
            ReqTrailError::InvalidSnapshot { reason } => ExError::new(ExErrorKind::InvalidInput)
                .with_op("snapshot_from_json")
                .with_message(format!("Invalid snapshot: {}", reason)),

            ReqTrailError::InvalidConfig { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("validate_config")
                .with_message(reason),

            ReqTrailError::DuplicateMapping { field } => {
                ExError::new(ExErrorKind::DuplicateMapping)
                    .with_op("validate_config")
                    .with_field(field)
                    .with_message("Field registered more than once")
            }

            ReqTrailError::ConfigParse { message } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("load_config")
                .with_message(message),

            ReqTrailError::Uncomparable { field, reason } => {
                ExError::new(ExErrorKind::UncomparableValue)
                    .with_field(field)
                    .with_message(reason)
            }

            ReqTrailError::UnidentifiableItem { side, index } => {
                ExError::new(ExErrorKind::UnidentifiableItem)
                    .with_message(format!("{} item at index {} has no usable id", side, index))
            }

            ReqTrailError::DuplicateItemId { side, id } => {
                ExError::new(ExErrorKind::DuplicateItemId)
                    .with_entity_id(id)
                    .with_message(format!("{} items share an id; the later item is used", side))
            }

            ReqTrailError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            ReqTrailError::SinkRejected {
                record_id,
                group,
                reason,
            } => ExError::new(ExErrorKind::ExternalService)
                .with_op(format!("log_{}_changes", group))
                .with_entity_id(record_id)
                .with_message(reason),

            ReqTrailError::RuntimeUnavailable { reason } => {
                ExError::new(ExErrorKind::Concurrency).with_message(reason)
            }
        }
    }
}

/// Conversion from serde_json::Error to ReqTrailError
impl From<serde_json::Error> for ReqTrailError {
    fn from(err: serde_json::Error) -> Self {
        ReqTrailError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from toml::de::Error to ReqTrailError
impl From<toml::de::Error> for ReqTrailError {
    fn from(err: toml::de::Error) -> Self {
        ReqTrailError::ConfigParse {
            message: err.to_string(),
        }
    }
}
