//! Storage seams for grants, roles and role assignments.
//!
//! The engine only reads through these traits. Implementations must make
//! single-record writes atomic: a reader sees either the old or the new
//! version of a role's grant list, never a mix.

use std::sync::Arc;

use rulegate_core::GrantId;

use crate::{PermissionGrant, PrincipalName, Role, RoleAssignment, RoleDefinition};

/// Storage error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("grant not found: {0}")]
    GrantNotFound(GrantId),
    #[error("role not found: {0}")]
    RoleNotFound(Role),
    #[error("system role '{0}' cannot be redefined")]
    SystemRoleImmutable(Role),
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Immutable grant records, addressed by generated id.
pub trait GrantStore: Send + Sync {
    fn get_grant(&self, id: GrantId) -> Result<Option<PermissionGrant>, StoreError>;

    /// Store a grant and return its new id.
    fn insert_grant(&self, grant: PermissionGrant) -> Result<GrantId, StoreError>;
}

/// Named roles.
pub trait RoleRegistry: Send + Sync {
    fn get_role(&self, name: &Role) -> Result<Option<RoleDefinition>, StoreError>;

    /// Create or wholly replace a role.
    fn put_role(&self, role: RoleDefinition) -> Result<(), StoreError>;

    fn list_roles(&self) -> Result<Vec<RoleDefinition>, StoreError>;
}

/// Principal → role assignments.
pub trait AssignmentIndex: Send + Sync {
    fn assignments_for(&self, principal: &PrincipalName) -> Result<Vec<RoleAssignment>, StoreError>;

    fn assign(&self, assignment: RoleAssignment) -> Result<(), StoreError>;

    /// Remove every assignment of `principal` that came from `source`.
    /// Returns the number removed.
    fn revoke_source(&self, principal: &PrincipalName, source: &str) -> Result<usize, StoreError>;
}

/// Everything the resolver needs from storage.
pub trait RbacStore: GrantStore + RoleRegistry + AssignmentIndex {}

impl<S> RbacStore for S where S: GrantStore + RoleRegistry + AssignmentIndex {}

impl<S> GrantStore for Arc<S>
where
    S: GrantStore + ?Sized,
{
    fn get_grant(&self, id: GrantId) -> Result<Option<PermissionGrant>, StoreError> {
        (**self).get_grant(id)
    }

    fn insert_grant(&self, grant: PermissionGrant) -> Result<GrantId, StoreError> {
        (**self).insert_grant(grant)
    }
}

impl<S> RoleRegistry for Arc<S>
where
    S: RoleRegistry + ?Sized,
{
    fn get_role(&self, name: &Role) -> Result<Option<RoleDefinition>, StoreError> {
        (**self).get_role(name)
    }

    fn put_role(&self, role: RoleDefinition) -> Result<(), StoreError> {
        (**self).put_role(role)
    }

    fn list_roles(&self) -> Result<Vec<RoleDefinition>, StoreError> {
        (**self).list_roles()
    }
}

impl<S> AssignmentIndex for Arc<S>
where
    S: AssignmentIndex + ?Sized,
{
    fn assignments_for(&self, principal: &PrincipalName) -> Result<Vec<RoleAssignment>, StoreError> {
        (**self).assignments_for(principal)
    }

    fn assign(&self, assignment: RoleAssignment) -> Result<(), StoreError> {
        (**self).assign(assignment)
    }

    fn revoke_source(&self, principal: &PrincipalName, source: &str) -> Result<usize, StoreError> {
        (**self).revoke_source(principal, source)
    }
}
