use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Name of an authenticated principal (human user, service account, etc).
///
/// Principals are created by user management; this crate only refers to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalName(Cow<'static, str>);

impl PrincipalName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PrincipalName {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PrincipalName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A principal's assignment to a role.
///
/// `source` records where the assignment came from (for example
/// `assignments/alice.yaml`) so assignments can be synced per source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub principal: PrincipalName,
    pub role: Role,
    pub source: String,
}

impl RoleAssignment {
    pub fn new(principal: PrincipalName, role: Role, source: impl Into<String>) -> Self {
        Self {
            principal,
            role,
            source: source.into(),
        }
    }

    /// Assignment whose source is the conventional per-user file.
    pub fn from_user_file(principal: PrincipalName, role: Role) -> Self {
        let source = format!("assignments/{}.yaml", principal.as_str());
        Self::new(principal, role, source)
    }
}
