//! Rule persistence (in-memory) with creation-time ownership.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use rulegate_auth::{PrincipalName, RuleDefinition};
use rulegate_core::{Owned, ResourceOwnership, RuleId};

/// A persisted rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRule {
    pub id: RuleId,
    pub reference: String,
    pub definition: RuleDefinition,
    pub ownership: ResourceOwnership,
}

impl Owned for StoredRule {
    fn ownership(&self) -> &ResourceOwnership {
        &self.ownership
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("rule already exists: {0}")]
    AlreadyExists(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// In-memory rule catalog. Rules are kept in creation order.
#[derive(Debug, Default)]
pub struct InMemoryRuleCatalog {
    rules: RwLock<Vec<StoredRule>>,
}

impl InMemoryRuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist `definition`, recording `owner` as its creator.
    pub fn insert(
        &self,
        definition: RuleDefinition,
        owner: &PrincipalName,
        created_at: DateTime<Utc>,
    ) -> Result<StoredRule, CatalogError> {
        let reference = definition.reference();
        let mut rules = self
            .rules
            .write()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;

        if rules.iter().any(|r| r.reference == reference) {
            return Err(CatalogError::AlreadyExists(reference));
        }

        let stored = StoredRule {
            id: RuleId::new(),
            reference,
            definition,
            ownership: ResourceOwnership::new(owner.as_str(), created_at),
        };
        rules.push(stored.clone());
        Ok(stored)
    }

    pub fn get_by_ref(&self, reference: &str) -> Result<Option<StoredRule>, CatalogError> {
        let rules = self
            .rules
            .read()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;
        Ok(rules.iter().find(|r| r.reference == reference).cloned())
    }

    pub fn list(&self) -> Result<Vec<StoredRule>, CatalogError> {
        let rules = self
            .rules
            .read()
            .map_err(|_| CatalogError::Storage("lock poisoned".to_string()))?;
        Ok(rules.clone())
    }
}
