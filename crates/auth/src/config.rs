//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{Role, SystemRole};

/// Authorization settings, injected per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// When false every check is allowed and listings are not filtered.
    pub enable: bool,

    /// Restrict listings to resources created by the requesting principal.
    pub permission_isolation: bool,

    /// Roles allowed to request unbounded listings.
    pub elevated_roles: Vec<Role>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            enable: true,
            permission_isolation: false,
            elevated_roles: vec![SystemRole::SystemAdmin.role(), SystemRole::Admin.role()],
        }
    }
}

impl RbacConfig {
    pub fn with_isolation(mut self, on: bool) -> Self {
        self.permission_isolation = on;
        self
    }

    pub fn is_elevated(&self, role: &Role) -> bool {
        self.elevated_roles.iter().any(|r| r == role)
    }
}
