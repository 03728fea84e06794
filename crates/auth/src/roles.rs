use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use rulegate_core::{GrantId, ResourceFamily};

use crate::{CapabilityTag, PermissionGrant};

/// Role identifier used for RBAC.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The built-in role this name refers to, if any.
    pub fn system_role(&self) -> Option<SystemRole> {
        SystemRole::from_name(self.as_str())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Built-in roles. They exist without stored role or grant records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    SystemAdmin,
    Admin,
    Observer,
}

impl SystemRole {
    pub const ALL: [SystemRole; 3] = [SystemRole::SystemAdmin, SystemRole::Admin, SystemRole::Observer];

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::SystemAdmin => "system_admin",
            SystemRole::Admin => "admin",
            SystemRole::Observer => "observer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }

    pub fn role(&self) -> Role {
        Role::new(self.as_str())
    }

    /// Universal roles hold an implicit grant on everything.
    pub fn is_universal(&self) -> bool {
        matches!(self, SystemRole::SystemAdmin | SystemRole::Admin)
    }

    /// First universal system role among `roles`, if any.
    pub fn universal_among<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Option<SystemRole> {
        roles
            .into_iter()
            .filter_map(Role::system_role)
            .find(SystemRole::is_universal)
    }

    /// Grants implied by a non-universal built-in role.
    pub fn builtin_grants(&self) -> Vec<PermissionGrant> {
        match self {
            SystemRole::SystemAdmin | SystemRole::Admin => Vec::new(),
            SystemRole::Observer => ResourceFamily::ALL
                .into_iter()
                .map(|family| PermissionGrant {
                    resource_family: family,
                    resource_id: None,
                    capabilities: [CapabilityTag::list_for(family), CapabilityTag::view_for(family)]
                        .into_iter()
                        .collect(),
                })
                .collect(),
        }
    }
}

/// A named, reusable set of grants.
///
/// Updating a role replaces its whole grant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub description: Option<String>,
    grant_ids: Vec<GrantId>,
}

impl RoleDefinition {
    /// Duplicate grant ids are dropped; first occurrence wins.
    pub fn new(name: Role, grant_ids: impl IntoIterator<Item = GrantId>) -> Self {
        let mut ordered: Vec<GrantId> = Vec::new();
        for id in grant_ids {
            if !ordered.contains(&id) {
                ordered.push(id);
            }
        }
        Self {
            name,
            description: None,
            grant_ids: ordered,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn grant_ids(&self) -> &[GrantId] {
        &self.grant_ids
    }
}
