//! Rule create/list flow: authorize, persist, list, filter.
//!
//! This is the boundary a request handler calls. Publishing notifications
//! after a successful create is left to the caller.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use rulegate_auth::{
    AuthorizationSequencer, AuthzError, PrincipalName, RbacConfig, RbacStore, RuleDefinition,
    filter_visible,
};
use rulegate_core::ResourceFamily;

use crate::rule_catalog::{CatalogError, InMemoryRuleCatalog, StoredRule};

/// Page size used when a list request does not specify one.
pub const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleServiceError {
    #[error(transparent)]
    Authz(#[from] AuthzError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct RuleService<S> {
    store: Arc<S>,
    catalog: InMemoryRuleCatalog,
    config: RbacConfig,
}

impl<S> RuleService<S>
where
    S: RbacStore,
{
    pub fn new(store: Arc<S>, config: RbacConfig) -> Self {
        Self {
            store,
            catalog: InMemoryRuleCatalog::new(),
            config,
        }
    }

    pub fn config(&self) -> &RbacConfig {
        &self.config
    }

    /// Swap in a reloaded configuration.
    pub fn set_config(&mut self, config: RbacConfig) {
        self.config = config;
    }

    pub fn catalog(&self) -> &InMemoryRuleCatalog {
        &self.catalog
    }

    /// Authorize and persist a new rule.
    pub fn create(
        &self,
        principal: &PrincipalName,
        rule: RuleDefinition,
    ) -> Result<StoredRule, RuleServiceError> {
        AuthorizationSequencer::new(self.store.as_ref(), &self.config)
            .authorize_create(principal, &rule)?;

        let stored = self.catalog.insert(rule, principal, Utc::now())?;
        info!(principal = %principal, rule = %stored.reference, rule_id = %stored.id, "rule created");
        Ok(stored)
    }

    /// List rules visible to `principal`.
    ///
    /// `limit`: `None` uses [`DEFAULT_LIST_LIMIT`], a negative value asks for
    /// every record.
    pub fn list(
        &self,
        principal: &PrincipalName,
        limit: Option<i64>,
    ) -> Result<Vec<StoredRule>, RuleServiceError> {
        AuthorizationSequencer::new(self.store.as_ref(), &self.config).authorize_list(
            principal,
            ResourceFamily::Rule,
            limit,
        )?;

        let mut visible = filter_visible(&self.config, principal, self.catalog.list()?);
        match limit {
            Some(n) if n < 0 => {}
            Some(n) => visible.truncate(usize::try_from(n).unwrap_or(usize::MAX)),
            None => visible.truncate(DEFAULT_LIST_LIMIT),
        }
        Ok(visible)
    }
}
