//! Static engine configuration: field registry, file fields, pending-upload
//! slots, collection settings and the quiescence window.
//!
//! Configuration is data, not runtime state. It can be built in code, taken
//! from [`TrailConfig::event_request`], or parsed from TOML:
//!
//! ```toml
//! quiescence_ms = 750
//! file_fields = ["roomBookingFiles"]
//!
//! [[fields]]
//! field = "name"
//! label = "Event name"
//! kind = "text"
//!
//! [[pending_uploads]]
//! slot = "roomBookingFile"
//! field = "roomBookingFiles"
//! multiple = false
//!
//! [collection]
//! field = "invoices"
//! id_field = "id"
//! compared_fields = ["vendor", "total"]
//! ```

use crate::errors::{ReqTrailError, Result};
use crate::model::{FieldMapping, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_QUIESCENCE_MS: u64 = 500;

/// A live-snapshot slot holding local files that are not uploaded yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUploadSlot {
    /// Slot name in `Snapshot` pending uploads
    pub slot: String,
    /// File field the files will land in once uploaded
    pub field: String,
    /// Multi-file slot; a single-file slot only reports its first file
    #[serde(default)]
    pub multiple: bool,
}

/// The keyed sub-collection reconciled by id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_collection_field")]
    pub field: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_compared_fields")]
    pub compared_fields: Vec<String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            field: default_collection_field(),
            id_field: default_id_field(),
            compared_fields: default_compared_fields(),
        }
    }
}

fn default_collection_field() -> String {
    "invoices".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_compared_fields() -> Vec<String> {
    ["vendor", "total", "tax", "tip", "items", "invoiceFile"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_quiescence_ms() -> u64 {
    DEFAULT_QUIESCENCE_MS
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailConfig {
    #[serde(default = "default_quiescence_ms")]
    pub quiescence_ms: u64,
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
    #[serde(default)]
    pub file_fields: Vec<String>,
    #[serde(default)]
    pub pending_uploads: Vec<PendingUploadSlot>,
    #[serde(default)]
    pub collection: CollectionConfig,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            fields: Vec::new(),
            file_fields: Vec::new(),
            pending_uploads: Vec::new(),
            collection: CollectionConfig::default(),
        }
    }
}

impl TrailConfig {
    /// Built-in registry for event requests
    pub fn event_request() -> Self {
        use ValueKind::*;
        let fields = [
            ("name", "Event Name", Text),
            ("organization", "Organization", Text),
            ("description", "Description", Text),
            ("location", "Location", Text),
            ("room", "Room", Text),
            ("startDate", "Start Date", Date),
            ("endDate", "End Date", Date),
            ("expectedAttendees", "Expected Attendees", Number),
            ("estimatedBudget", "Estimated Budget", Number),
            ("needsFunding", "Needs Funding", Boolean),
            ("hasFood", "Food Served", Boolean),
            ("isPublic", "Open to Public", Boolean),
            ("department", "Department", Text),
            ("status", "Status", Text),
            ("servicesRequested", "Services Requested", Array),
            ("contact", "Point of Contact", Object),
            ("roomBookingFiles", "Room Booking Files", File),
            ("invoiceFiles", "Invoice Files", File),
            ("otherFiles", "Other Files", File),
        ]
        .into_iter()
        .map(|(field, label, kind)| FieldMapping::new(field, label, kind))
        .collect();

        Self {
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            fields,
            file_fields: ["roomBookingFiles", "invoiceFiles", "otherFiles"]
                .into_iter()
                .map(String::from)
                .collect(),
            pending_uploads: vec![
                PendingUploadSlot {
                    slot: "roomBookingFile".to_string(),
                    field: "roomBookingFiles".to_string(),
                    multiple: false,
                },
                PendingUploadSlot {
                    slot: "invoiceFile".to_string(),
                    field: "invoiceFiles".to_string(),
                    multiple: false,
                },
                PendingUploadSlot {
                    slot: "otherFiles".to_string(),
                    field: "otherFiles".to_string(),
                    multiple: true,
                },
            ],
            collection: CollectionConfig::default(),
        }
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// - `ConfigParse` if the TOML is malformed or has the wrong shape
    /// - any error from [`TrailConfig::validate`]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TrailConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for a zero quiescence window, empty names, or an
    ///   empty id field
    /// - `DuplicateMapping` if a field is registered twice
    pub fn validate(&self) -> Result<()> {
        if self.quiescence_ms == 0 {
            return Err(ReqTrailError::InvalidConfig {
                reason: "quiescence_ms must be greater than zero".to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for mapping in &self.fields {
            if mapping.field.trim().is_empty() {
                return Err(ReqTrailError::InvalidConfig {
                    reason: format!("field mapping '{}' has an empty field name", mapping.label),
                });
            }
            if !seen.insert(mapping.field.as_str()) {
                return Err(ReqTrailError::DuplicateMapping {
                    field: mapping.field.clone(),
                });
            }
        }

        if self.file_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ReqTrailError::InvalidConfig {
                reason: "file_fields contains an empty name".to_string(),
            });
        }
        if self
            .pending_uploads
            .iter()
            .any(|s| s.slot.trim().is_empty() || s.field.trim().is_empty())
        {
            return Err(ReqTrailError::InvalidConfig {
                reason: "pending upload slot with an empty slot or field name".to_string(),
            });
        }
        if self.collection.id_field.trim().is_empty() {
            return Err(ReqTrailError::InvalidConfig {
                reason: "collection.id_field must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}
