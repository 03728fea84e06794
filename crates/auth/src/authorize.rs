//! Point-in-time authorization decisions.
//!
//! [`PermissionResolver::resolve`] loads a principal's effective grants once;
//! the returned [`EffectiveGrants`] answers any number of checks without
//! touching storage again.
//!
//! - No IO after resolution
//! - No panics
//! - Purely additive: no negative grants exist

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use rulegate_core::{DomainError, GrantId, ResourceAddress, ResourceFamily};

use crate::hierarchy::ancestors_of;
use crate::store::{RbacStore, StoreError};
use crate::{CapabilityTag, PermissionGrant, PrincipalName, Role, SystemRole};

/// What the denied principal was trying to do with the resource.
///
/// Selects the caller-facing wording of a denial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UsageContext {
    /// Direct operation on the resource.
    Resource,
    /// Using a trigger (identified by its trigger type reference) in a rule.
    Trigger { trigger_ref: String },
    /// Using an action in a rule.
    Action,
}

/// A failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionDenied {
    pub principal: PrincipalName,
    pub capability: CapabilityTag,
    pub resource_family: ResourceFamily,
    /// `None` for collection-level checks.
    pub resource_id: Option<String>,
    pub context: UsageContext,
}

impl core::fmt::Display for PermissionDenied {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let user = self.principal.as_str();
        let cap = self.capability;
        let id = self.resource_id.as_deref().unwrap_or_default();
        match (&self.context, &self.resource_id) {
            (UsageContext::Trigger { trigger_ref }, _) => write!(
                f,
                "User \"{user}\" doesn't have required permission ({cap}) to use trigger {trigger_ref}"
            ),
            (UsageContext::Action, _) => write!(
                f,
                "User \"{user}\" doesn't have required ({cap}) permission to use {} {id}",
                self.resource_family.label()
            ),
            (UsageContext::Resource, Some(_)) => write!(
                f,
                "User \"{user}\" doesn't have required permission \"{cap}\" on resource \"{}:{id}\"",
                self.resource_family
            ),
            (UsageContext::Resource, None) => {
                write!(f, "User \"{user}\" doesn't have required permission \"{cap}\"")
            }
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{0}")]
    PermissionDenied(PermissionDenied),

    #[error(
        "Administrator access required to be able to specify limit=-1 and retrieve all the records"
    )]
    UnboundedListDenied { principal: PrincipalName },

    #[error("malformed resource address: {0}")]
    MalformedResourceAddress(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthzError {
    /// Denials are reported as "forbidden"; everything else is a bad request
    /// or an internal failure.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            AuthzError::PermissionDenied(_) | AuthzError::UnboundedListDenied { .. }
        )
    }

    pub fn denied(&self) -> Option<&PermissionDenied> {
        match self {
            AuthzError::PermissionDenied(denied) => Some(denied),
            _ => None,
        }
    }
}

impl From<DomainError> for AuthzError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::MalformedResourceAddress(msg) => AuthzError::MalformedResourceAddress(msg),
            other => AuthzError::InvalidRequest(other.to_string()),
        }
    }
}

/// Why a check was allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AllowedVia {
    /// Authorization is switched off.
    Disabled,
    /// The principal holds a universal system role.
    UniversalRole { role: SystemRole },
    /// A grant reached through `role` matched. Built-in grants have no id.
    Grant { role: Role, grant_id: Option<GrantId> },
}

/// A grant together with the role that contributed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGrant {
    pub role: Role,
    pub grant_id: Option<GrantId>,
    pub grant: PermissionGrant,
}

impl ResolvedGrant {
    fn allowed_via(&self) -> AllowedVia {
        AllowedVia::Grant {
            role: self.role.clone(),
            grant_id: self.grant_id,
        }
    }
}

/// A principal's resolved authorization state for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveGrants {
    principal: PrincipalName,
    universal: Option<SystemRole>,
    roles: Vec<Role>,
    grants: Vec<ResolvedGrant>,
}

impl EffectiveGrants {
    /// No roles, no grants: every check is denied.
    pub fn empty(principal: PrincipalName) -> Self {
        Self {
            principal,
            universal: None,
            roles: Vec::new(),
            grants: Vec::new(),
        }
    }

    pub fn new(principal: PrincipalName, roles: Vec<Role>, grants: Vec<ResolvedGrant>) -> Self {
        let universal = SystemRole::universal_among(&roles);
        Self {
            principal,
            universal,
            roles,
            grants,
        }
    }

    pub fn principal(&self) -> &PrincipalName {
        &self.principal
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn grants(&self) -> &[ResolvedGrant] {
        &self.grants
    }

    pub fn universal_role(&self) -> Option<SystemRole> {
        self.universal
    }

    pub fn holds_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Check `capability` on `address`.
    pub fn check(
        &self,
        capability: CapabilityTag,
        address: &ResourceAddress,
    ) -> Result<AllowedVia, AuthzError> {
        self.check_in_context(capability, address, UsageContext::Resource)
    }

    /// Like [`check`](Self::check), with the denial worded for `context`.
    pub fn check_in_context(
        &self,
        capability: CapabilityTag,
        address: &ResourceAddress,
        context: UsageContext,
    ) -> Result<AllowedVia, AuthzError> {
        if let Some(role) = self.universal {
            return Ok(AllowedVia::UniversalRole { role });
        }

        let ancestors = ancestors_of(address);
        let matched = self
            .grants
            .iter()
            .find(|g| grant_matches(&g.grant, capability, address, &ancestors));

        match matched {
            Some(resolved) => {
                debug!(
                    principal = %self.principal,
                    capability = %capability,
                    resource = %address,
                    role = %resolved.role,
                    "permission granted"
                );
                Ok(resolved.allowed_via())
            }
            None => {
                info!(
                    principal = %self.principal,
                    capability = %capability,
                    resource = %address,
                    "permission denied"
                );
                Err(AuthzError::PermissionDenied(PermissionDenied {
                    principal: self.principal.clone(),
                    capability,
                    resource_family: address.family(),
                    resource_id: Some(address.id().to_string()),
                    context,
                }))
            }
        }
    }

    /// Collection-level check: only global grants on the capability's family
    /// count.
    pub fn check_global(&self, capability: CapabilityTag) -> Result<AllowedVia, AuthzError> {
        if let Some(role) = self.universal {
            return Ok(AllowedVia::UniversalRole { role });
        }

        let family = capability.family();
        let matched = self.grants.iter().find(|g| {
            g.grant.is_global() && g.grant.resource_family == family && g.grant.satisfies(capability)
        });

        match matched {
            Some(resolved) => {
                debug!(principal = %self.principal, capability = %capability, "global permission granted");
                Ok(resolved.allowed_via())
            }
            None => {
                info!(principal = %self.principal, capability = %capability, "global permission denied");
                Err(AuthzError::PermissionDenied(PermissionDenied {
                    principal: self.principal.clone(),
                    capability,
                    resource_family: family,
                    resource_id: None,
                    context: UsageContext::Resource,
                }))
            }
        }
    }
}

/// A grant matches when its scope covers the address and it holds the
/// capability or the capability's family wildcard.
///
/// Scope covers the address when the grant is on the address itself (exact
/// or global on its family), on an ancestor container (exact or global on the
/// container family), or global on the capability's own family.
fn grant_matches(
    grant: &PermissionGrant,
    capability: CapabilityTag,
    address: &ResourceAddress,
    ancestors: &[ResourceAddress],
) -> bool {
    let on_family = grant.resource_family == address.family()
        && grant
            .resource_id
            .as_deref()
            .is_none_or(|id| id == address.id());
    let global_on_capability = grant.is_global() && grant.resource_family == capability.family();
    let on_ancestor = ancestors
        .iter()
        .any(|a| grant.names(a) || (grant.is_global() && grant.resource_family == a.family()));
    let in_scope = on_family || global_on_capability || on_ancestor;

    in_scope && grant.satisfies(capability)
}

/// Loads effective grants from storage.
pub struct PermissionResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> PermissionResolver<'a, S>
where
    S: RbacStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve the union of grants of every role assigned to `principal`.
    ///
    /// A principal with no assignments resolves to an empty grant set.
    pub fn resolve(&self, principal: &PrincipalName) -> Result<EffectiveGrants, AuthzError> {
        let assignments = self.store.assignments_for(principal)?;

        let mut roles: Vec<Role> = Vec::new();
        for assignment in assignments {
            if !roles.contains(&assignment.role) {
                roles.push(assignment.role);
            }
        }

        if SystemRole::universal_among(&roles).is_some() {
            return Ok(EffectiveGrants::new(principal.clone(), roles, Vec::new()));
        }

        let mut grants = Vec::new();
        for role in &roles {
            if let Some(system_role) = role.system_role() {
                grants.extend(system_role.builtin_grants().into_iter().map(|grant| ResolvedGrant {
                    role: role.clone(),
                    grant_id: None,
                    grant,
                }));
                continue;
            }

            let Some(definition) = self.store.get_role(role)? else {
                warn!(principal = %principal, role = %role, "assigned role does not exist");
                continue;
            };

            for grant_id in definition.grant_ids() {
                match self.store.get_grant(*grant_id)? {
                    Some(grant) => grants.push(ResolvedGrant {
                        role: role.clone(),
                        grant_id: Some(*grant_id),
                        grant,
                    }),
                    None => {
                        warn!(role = %role, grant_id = %grant_id, "role references a missing grant");
                    }
                }
            }
        }

        Ok(EffectiveGrants::new(principal.clone(), roles, grants))
    }

    /// Resolve and check in one step.
    pub fn check(
        &self,
        principal: &PrincipalName,
        capability: CapabilityTag,
        address: &ResourceAddress,
    ) -> Result<AllowedVia, AuthzError> {
        self.resolve(principal)?.check(capability, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grants_for(principal: &'static str, grants: Vec<PermissionGrant>) -> EffectiveGrants {
        let role = Role::new("custom");
        let resolved = grants
            .into_iter()
            .map(|grant| ResolvedGrant {
                role: role.clone(),
                grant_id: Some(GrantId::new()),
                grant,
            })
            .collect();
        EffectiveGrants::new(PrincipalName::new(principal), vec![role], resolved)
    }

    fn addr(uid: &str) -> ResourceAddress {
        ResourceAddress::parse_uid(uid).unwrap()
    }

    #[test]
    fn pack_grant_cascades_to_its_rules_only() {
        let grants = grants_for(
            "alice",
            vec![PermissionGrant::on_uid("pack:examples", [CapabilityTag::RuleCreate]).unwrap()],
        );

        assert!(grants.check(CapabilityTag::RuleCreate, &addr("rule:examples.myrule")).is_ok());
        assert!(grants.check(CapabilityTag::RuleCreate, &addr("pack:examples")).is_ok());

        let err = grants
            .check(CapabilityTag::RuleCreate, &addr("rule:other.myrule"))
            .unwrap_err();
        let denied = err.denied().unwrap();
        assert_eq!(denied.capability, CapabilityTag::RuleCreate);
        assert_eq!(denied.resource_id.as_deref(), Some("other.myrule"));
    }

    #[test]
    fn family_wildcard_covers_exact_ancestor_and_global_scopes() {
        let exact = grants_for(
            "a",
            vec![PermissionGrant::on_uid("action:core.local", [CapabilityTag::ActionAll]).unwrap()],
        );
        let ancestor = grants_for(
            "b",
            vec![PermissionGrant::on_uid("pack:core", [CapabilityTag::ActionAll]).unwrap()],
        );
        let global = grants_for(
            "c",
            vec![PermissionGrant::global(ResourceFamily::Action, [CapabilityTag::ActionAll]).unwrap()],
        );

        let target = addr("action:core.local");
        for grants in [&exact, &ancestor, &global] {
            assert!(grants.check(CapabilityTag::ActionExecute, &target).is_ok());
            assert!(grants.check(CapabilityTag::ActionDelete, &target).is_ok());
        }

        assert!(exact.check(CapabilityTag::ActionExecute, &addr("action:core.remote")).is_err());
        assert!(ancestor.check(CapabilityTag::ActionExecute, &addr("action:linux.ls")).is_err());
        assert!(global.check(CapabilityTag::ActionExecute, &addr("action:linux.ls")).is_ok());
    }

    #[test]
    fn webhooks_only_match_exact_or_global_grants() {
        let exact = grants_for(
            "a",
            vec![PermissionGrant::on_uid("webhook:sample", [CapabilityTag::WebhookCreate]).unwrap()],
        );
        assert!(exact.check(CapabilityTag::WebhookCreate, &addr("webhook:sample")).is_ok());
        assert!(exact.check(CapabilityTag::WebhookCreate, &addr("webhook:other")).is_err());
    }

    #[test]
    fn global_grant_on_capability_family_covers_every_pack() {
        let grants = grants_for(
            "g",
            vec![
                PermissionGrant::global(ResourceFamily::Rule, [CapabilityTag::RuleCreate]).unwrap(),
                PermissionGrant::global(ResourceFamily::Action, [CapabilityTag::ActionExecute]).unwrap(),
            ],
        );

        assert!(grants.check(CapabilityTag::RuleCreate, &addr("pack:examples")).is_ok());
        assert!(grants.check(CapabilityTag::RuleCreate, &addr("pack:other")).is_ok());
        assert!(grants.check(CapabilityTag::ActionExecute, &addr("action:wolfpack.action-1")).is_ok());
        assert!(grants.check(CapabilityTag::RuleDelete, &addr("pack:examples")).is_err());
    }

    #[test]
    fn global_pack_grant_cascades_onto_every_pack() {
        let grants = grants_for(
            "g",
            vec![
                PermissionGrant::global(
                    ResourceFamily::Pack,
                    [CapabilityTag::RuleCreate, CapabilityTag::ActionAll],
                )
                .unwrap(),
            ],
        );

        assert!(grants.check(CapabilityTag::RuleCreate, &addr("pack:examples")).is_ok());
        assert!(grants.check(CapabilityTag::RuleCreate, &addr("rule:other.myrule")).is_ok());
        assert!(grants.check(CapabilityTag::ActionExecute, &addr("action:core.local")).is_ok());
        assert!(grants.check(CapabilityTag::WebhookCreate, &addr("webhook:sample")).is_err());
    }

    #[test]
    fn global_check_ignores_instance_grants() {
        let grants = grants_for(
            "a",
            vec![
                PermissionGrant::on_uid("pack:examples", [CapabilityTag::RuleAll]).unwrap(),
                PermissionGrant::on_uid("rule:examples.r1", [CapabilityTag::RuleList]).unwrap(),
            ],
        );
        let err = grants.check_global(CapabilityTag::RuleList).unwrap_err();
        assert_eq!(
            err.to_string(),
            "User \"a\" doesn't have required permission \"rule_list\""
        );

        let global = grants_for(
            "b",
            vec![PermissionGrant::global(ResourceFamily::Rule, [CapabilityTag::RuleList]).unwrap()],
        );
        assert!(global.check_global(CapabilityTag::RuleList).is_ok());
    }

    #[test]
    fn universal_role_short_circuits() {
        let admin = EffectiveGrants::new(PrincipalName::new("root"), vec![Role::new("admin")], vec![]);
        assert_eq!(
            admin.check(CapabilityTag::WebhookDelete, &addr("webhook:anything")),
            Ok(AllowedVia::UniversalRole { role: SystemRole::Admin })
        );
        assert!(admin.check_global(CapabilityTag::SensorList).is_ok());
    }

    #[test]
    fn denial_wording_per_context() {
        let nobody = EffectiveGrants::empty(PrincipalName::new("rule_create"));

        let trigger = nobody
            .check_in_context(
                CapabilityTag::WebhookCreate,
                &addr("webhook:sample"),
                UsageContext::Trigger {
                    trigger_ref: "core.st2.webhook".to_string(),
                },
            )
            .unwrap_err();
        assert_eq!(
            trigger.to_string(),
            "User \"rule_create\" doesn't have required permission (webhook_create) to use trigger core.st2.webhook"
        );

        let action = nobody
            .check_in_context(
                CapabilityTag::ActionExecute,
                &addr("action:wolfpack.action-1"),
                UsageContext::Action,
            )
            .unwrap_err();
        assert_eq!(
            action.to_string(),
            "User \"rule_create\" doesn't have required (action_execute) permission to use action wolfpack.action-1"
        );

        let plain = nobody.check(CapabilityTag::RuleCreate, &addr("pack:examples")).unwrap_err();
        assert_eq!(
            plain.to_string(),
            "User \"rule_create\" doesn't have required permission \"rule_create\" on resource \"pack:examples\""
        );
        assert!(plain.is_denial());
    }

    fn any_capability() -> impl Strategy<Value = CapabilityTag> {
        prop::sample::select(CapabilityTag::ALL.to_vec())
    }

    fn any_family() -> impl Strategy<Value = ResourceFamily> {
        prop::sample::select(ResourceFamily::ALL.to_vec())
    }

    fn sample_address(family: ResourceFamily) -> ResourceAddress {
        let id = match family {
            ResourceFamily::Pack => "examples",
            ResourceFamily::Webhook => "sample",
            _ => "examples.thing",
        };
        ResourceAddress::new(family, id).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: global grants on a family unrelated to both the target
        /// and the capability never allow (no pack grants, so nothing can
        /// cascade).
        #[test]
        fn grants_on_other_families_never_allow(
            target_family in any_family(),
            capability in any_capability(),
            other_family in any_family(),
        ) {
            prop_assume!(other_family != target_family && other_family != ResourceFamily::Pack);
            prop_assume!(capability.family() != other_family);
            let grants = grants_for(
                "p",
                vec![PermissionGrant::global(other_family, [CapabilityTag::wildcard_for(other_family)]).unwrap()],
            );
            prop_assert!(grants.check(capability, &sample_address(target_family)).is_err());
        }

        /// Property: the family wildcard satisfies every concrete tag of
        /// that family on a globally granted family.
        #[test]
        fn wildcard_is_a_superset(capability in any_capability()) {
            let family = capability.family();
            let grants = grants_for(
                "p",
                vec![PermissionGrant::global(family, [CapabilityTag::wildcard_for(family)]).unwrap()],
            );
            prop_assert!(grants.check(capability, &sample_address(family)).is_ok());
        }

        /// Property: repeating a check yields the same decision.
        #[test]
        fn checks_are_idempotent(
            capability in any_capability(),
            target_family in any_family(),
            granted in prop::collection::vec(any_capability(), 1..4),
        ) {
            let grants: Vec<PermissionGrant> = granted
                .into_iter()
                .map(|c| PermissionGrant::global(c.family(), [c]).unwrap())
                .collect();
            let effective = grants_for("p", grants);
            let target = sample_address(target_family);
            let first = effective.check(capability, &target);
            let second = effective.check(capability, &target);
            prop_assert_eq!(first, second);
        }
    }
}
