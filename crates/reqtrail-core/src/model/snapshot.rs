use crate::errors::{ReqTrailError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A local file attached in the form but not yet uploaded
///
/// Only live snapshots carry these; the file has no persisted URL until the
/// form is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFile {
    pub path: PathBuf,
    pub size_bytes: Option<u64>,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Final path component, if it is valid UTF-8
    pub fn file_name(&self) -> Option<&str> {
        Path::new(&self.path).file_name().and_then(|n| n.to_str())
    }
}

/// State of one event request at a point in time
///
/// Field values are kept as raw JSON; the field registry decides which ones
/// are compared and how. Pending uploads are keyed by upload slot name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pending_uploads: BTreeMap<String, Vec<LocalFile>>,
}

impl Snapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a JSON document whose root is an object
    ///
    /// # Errors
    ///
    /// Returns `ReqTrailError::InvalidSnapshot` if the root is not an object.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
                pending_uploads: BTreeMap::new(),
            }),
            other => Err(ReqTrailError::InvalidSnapshot {
                reason: format!("expected a JSON object, got {}", json_type_name(&other)),
            }),
        }
    }

    /// Get a field value; `None` means the field is absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field value
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Remove a field, making it absent
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Builder-style `set`
    pub fn with_field(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set(field, value);
        self
    }

    /// Attach a local file to an upload slot
    pub fn attach_pending(&mut self, slot: impl Into<String>, file: LocalFile) {
        self.pending_uploads.entry(slot.into()).or_default().push(file);
    }

    /// Builder-style `attach_pending`
    pub fn with_pending_upload(mut self, slot: impl Into<String>, file: LocalFile) -> Self {
        self.attach_pending(slot, file);
        self
    }

    /// Drop all pending files of a slot (e.g. after they were uploaded)
    pub fn clear_pending(&mut self, slot: &str) {
        self.pending_uploads.remove(slot);
    }

    /// Files pending in a slot, in attachment order
    pub fn pending_in(&self, slot: &str) -> &[LocalFile] {
        self.pending_uploads
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Get all field names
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Get the number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the snapshot has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for Snapshot {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            pending_uploads: BTreeMap::new(),
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
