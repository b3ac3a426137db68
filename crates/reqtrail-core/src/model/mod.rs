pub mod change;
pub mod field;
pub mod snapshot;

pub use change::{
    ChangeSet, DiffWarning, FieldChange, FileChange, FileChangeType, InvoiceChange,
    InvoiceChangeType, Side, INVOICE_FIELD,
};
pub use field::{FieldMapping, FieldValue, ValueKind};
pub use snapshot::{LocalFile, Snapshot};
