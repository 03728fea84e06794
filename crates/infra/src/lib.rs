//! Infrastructure layer: storage adapters, configuration, request flows.

pub mod config;
pub mod rule_catalog;
pub mod rule_service;
pub mod store;


pub use rule_catalog::{CatalogError, InMemoryRuleCatalog, StoredRule};
pub use rule_service::{DEFAULT_LIST_LIMIT, RuleService, RuleServiceError};
pub use store::InMemoryRbacStore;
