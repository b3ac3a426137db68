//! Correlation types for diff passes and audit deliveries
//!
//! A diff pass runs on the scheduler's timer task while its audit delivery
//! runs detached; these ids tie the two sets of log events together.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Generate a new time-ordered id using UUIDv7
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Get the string representation
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Create from an existing string (for deserialization)
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

correlation_id! {
    /// Identifier of a single diff pass (one run of all three detectors)
    PassId
}

correlation_id! {
    /// Identifier of a single audit delivery (one `map` call on the mapper)
    DeliveryId
}

/// Context carried from a diff pass into its audit delivery
#[derive(Debug, Clone)]
pub struct PassContext {
    pub pass_id: PassId,
    pub delivery_id: Option<DeliveryId>,
}

impl PassContext {
    /// Create a new context with a fresh PassId
    pub fn new() -> Self {
        Self {
            pass_id: PassId::new(),
            delivery_id: None,
        }
    }

    /// Create a context for an existing pass
    pub fn for_pass(pass_id: PassId) -> Self {
        Self {
            pass_id,
            delivery_id: None,
        }
    }

    /// Attach a fresh DeliveryId to the context
    pub fn begin_delivery(mut self) -> Self {
        self.delivery_id = Some(DeliveryId::new());
        self
    }
}

impl Default for PassContext {
    fn default() -> Self {
        Self::new()
    }
}
