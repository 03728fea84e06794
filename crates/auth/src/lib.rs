//! `rulegate-auth` — authorization decision engine.
//!
//! This crate is intentionally decoupled from HTTP and storage: it reads
//! grants, roles and assignments through the traits in [`store`] and answers
//! "may this principal do this" and "which resources may it see".

pub mod authorize;
pub mod config;
pub mod grant;
pub mod hierarchy;
pub mod isolation;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod rule;
pub mod sequencer;
pub mod store;

pub use authorize::{
    AllowedVia, AuthzError, EffectiveGrants, PermissionDenied, PermissionResolver, ResolvedGrant,
    UsageContext,
};
pub use config::RbacConfig;
pub use grant::PermissionGrant;
pub use hierarchy::ancestors_of;
pub use isolation::filter_visible;
pub use permissions::CapabilityTag;
pub use principal::{PrincipalName, RoleAssignment};
pub use roles::{Role, RoleDefinition, SystemRole};
pub use rule::{ActionSpec, RuleDefinition, TriggerSpec, WEBHOOK_TRIGGER_TYPE};
pub use sequencer::{AuthorizationSequencer, PlannedCheck, plan_rule_create};
pub use store::{AssignmentIndex, GrantStore, RbacStore, RoleRegistry, StoreError};
