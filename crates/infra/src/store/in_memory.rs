use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use tracing::debug;

use rulegate_auth::{
    AssignmentIndex, GrantStore, PermissionGrant, PrincipalName, Role, RoleAssignment,
    RoleDefinition, RoleRegistry, StoreError,
};
use rulegate_core::GrantId;

/// In-memory grant, role and assignment store.
///
/// Intended for tests/dev. Each write takes a single lock, so readers never
/// observe a partially replaced role.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    grants: RwLock<HashMap<GrantId, PermissionGrant>>,
    roles: RwLock<BTreeMap<Role, RoleDefinition>>,
    assignments: RwLock<HashMap<PrincipalName, Vec<RoleAssignment>>>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Storage("lock poisoned".to_string())
}

impl InMemoryRbacStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `grants` and define (or replace) role `name` over them.
    pub fn define_role(
        &self,
        name: &str,
        grants: Vec<PermissionGrant>,
    ) -> Result<RoleDefinition, StoreError> {
        let ids = grants
            .into_iter()
            .map(|g| self.insert_grant(g))
            .collect::<Result<Vec<_>, _>>()?;
        let role = RoleDefinition::new(Role::new(name.to_string()), ids);
        self.put_role(role.clone())?;
        Ok(role)
    }
}

impl GrantStore for InMemoryRbacStore {
    fn get_grant(&self, id: GrantId) -> Result<Option<PermissionGrant>, StoreError> {
        let grants = self.grants.read().map_err(poisoned)?;
        Ok(grants.get(&id).cloned())
    }

    fn insert_grant(&self, grant: PermissionGrant) -> Result<GrantId, StoreError> {
        grant
            .validate()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let id = GrantId::new();
        let mut grants = self.grants.write().map_err(poisoned)?;
        grants.insert(id, grant);
        Ok(id)
    }
}

impl RoleRegistry for InMemoryRbacStore {
    fn get_role(&self, name: &Role) -> Result<Option<RoleDefinition>, StoreError> {
        let roles = self.roles.read().map_err(poisoned)?;
        Ok(roles.get(name).cloned())
    }

    fn put_role(&self, role: RoleDefinition) -> Result<(), StoreError> {
        if role.name.system_role().is_some() {
            return Err(StoreError::SystemRoleImmutable(role.name));
        }

        {
            let grants = self.grants.read().map_err(poisoned)?;
            if let Some(missing) = role.grant_ids().iter().find(|id| !grants.contains_key(*id)) {
                return Err(StoreError::GrantNotFound(*missing));
            }
        }

        debug!(role = %role.name, grants = role.grant_ids().len(), "role stored");
        let mut roles = self.roles.write().map_err(poisoned)?;
        roles.insert(role.name.clone(), role);
        Ok(())
    }

    fn list_roles(&self) -> Result<Vec<RoleDefinition>, StoreError> {
        let roles = self.roles.read().map_err(poisoned)?;
        Ok(roles.values().cloned().collect())
    }
}

impl AssignmentIndex for InMemoryRbacStore {
    fn assignments_for(&self, principal: &PrincipalName) -> Result<Vec<RoleAssignment>, StoreError> {
        let assignments = self.assignments.read().map_err(poisoned)?;
        Ok(assignments.get(principal).cloned().unwrap_or_default())
    }

    fn assign(&self, assignment: RoleAssignment) -> Result<(), StoreError> {
        if assignment.role.system_role().is_none() && self.get_role(&assignment.role)?.is_none() {
            return Err(StoreError::RoleNotFound(assignment.role));
        }

        let mut assignments = self.assignments.write().map_err(poisoned)?;
        let held = assignments.entry(assignment.principal.clone()).or_default();
        if !held.contains(&assignment) {
            held.push(assignment);
        }
        Ok(())
    }

    fn revoke_source(&self, principal: &PrincipalName, source: &str) -> Result<usize, StoreError> {
        let mut assignments = self.assignments.write().map_err(poisoned)?;
        let Some(held) = assignments.get_mut(principal) else {
            return Ok(0);
        };
        let before = held.len();
        held.retain(|a| a.source != source);
        let removed = before - held.len();
        if held.is_empty() {
            assignments.remove(principal);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulegate_auth::{CapabilityTag, SystemRole};
    use rulegate_core::ResourceFamily;

    fn rule_list() -> PermissionGrant {
        PermissionGrant::global(ResourceFamily::Rule, [CapabilityTag::RuleList]).unwrap()
    }

    #[test]
    fn put_role_rejects_unknown_grant_ids() {
        let store = InMemoryRbacStore::new();
        let role = RoleDefinition::new(Role::new("ghost"), [GrantId::new()]);
        assert!(matches!(store.put_role(role), Err(StoreError::GrantNotFound(_))));
    }

    #[test]
    fn put_role_replaces_whole_grant_list() {
        let store = InMemoryRbacStore::new();
        store.define_role("ops", vec![rule_list(), rule_list()]).unwrap();
        let replaced = store.define_role("ops", vec![rule_list()]).unwrap();

        let stored = store.get_role(&Role::new("ops")).unwrap().unwrap();
        assert_eq!(stored.grant_ids(), replaced.grant_ids());
        assert_eq!(stored.grant_ids().len(), 1);
    }

    #[test]
    fn system_roles_cannot_be_redefined() {
        let store = InMemoryRbacStore::new();
        let err = store.define_role("admin", vec![rule_list()]).unwrap_err();
        assert_eq!(err, StoreError::SystemRoleImmutable(Role::new("admin")));
    }

    #[test]
    fn invalid_grants_are_rejected() {
        let store = InMemoryRbacStore::new();
        let grant = PermissionGrant {
            resource_family: ResourceFamily::Webhook,
            resource_id: Some("sample".to_string()),
            capabilities: [CapabilityTag::RuleCreate].into_iter().collect(),
        };
        assert!(matches!(store.insert_grant(grant), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn assignments_require_an_existing_role() {
        let store = InMemoryRbacStore::new();
        let alice = PrincipalName::new("alice");

        let err = store
            .assign(RoleAssignment::from_user_file(alice.clone(), Role::new("missing")))
            .unwrap_err();
        assert!(matches!(err, StoreError::RoleNotFound(_)));

        store
            .assign(RoleAssignment::from_user_file(alice.clone(), SystemRole::Observer.role()))
            .unwrap();
        assert_eq!(store.assignments_for(&alice).unwrap().len(), 1);
    }

    #[test]
    fn revoke_source_removes_only_that_source() {
        let store = InMemoryRbacStore::new();
        store.define_role("ops", vec![rule_list()]).unwrap();
        let alice = PrincipalName::new("alice");

        store
            .assign(RoleAssignment::new(alice.clone(), Role::new("ops"), "assignments/alice.yaml"))
            .unwrap();
        store
            .assign(RoleAssignment::new(alice.clone(), SystemRole::Admin.role(), "ldap"))
            .unwrap();

        assert_eq!(store.revoke_source(&alice, "ldap").unwrap(), 1);
        let remaining = store.assignments_for(&alice).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].role, Role::new("ops"));
    }

    #[test]
    fn revoking_last_assignment_drops_the_principal_entry() {
        let store = InMemoryRbacStore::new();
        let alice = PrincipalName::new("alice");
        store
            .assign(RoleAssignment::new(alice.clone(), SystemRole::Observer.role(), "ldap"))
            .unwrap();

        assert_eq!(store.revoke_source(&alice, "ldap").unwrap(), 1);
        assert!(store.assignments.read().unwrap().is_empty());
        assert_eq!(store.revoke_source(&alice, "ldap").unwrap(), 0);
    }
}
