//! Ownership records for created resources.
//!
//! Ownership is captured once, when a resource instance is created, and is
//! read only by visibility filtering. It never takes part in grant matching.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who created a resource instance, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOwnership {
    /// Name of the creating principal.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl ResourceOwnership {
    pub fn new(created_by: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            created_by: created_by.into(),
            created_at,
        }
    }

    pub fn is_owned_by(&self, principal: &str) -> bool {
        self.created_by == principal
    }
}

/// Anything that carries a creation-time ownership record.
pub trait Owned {
    fn ownership(&self) -> &ResourceOwnership;
}

impl Owned for ResourceOwnership {
    fn ownership(&self) -> &ResourceOwnership {
        self
    }
}

impl<T: Owned + ?Sized> Owned for &T {
    fn ownership(&self) -> &ResourceOwnership {
        (**self).ownership()
    }
}
