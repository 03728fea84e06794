//! Permission grants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rulegate_core::{AddressingScheme, DomainError, DomainResult, ResourceAddress, ResourceFamily};

use crate::CapabilityTag;

/// A unit of permission.
///
/// `resource_id = None` makes the grant global: it covers every resource of
/// `resource_family` and is the only kind of grant that answers
/// collection-level questions such as listing.
///
/// A grant on a pack, or on every pack, may carry capabilities of the
/// pack-scoped families (e.g. `rule_create`, `action_all`); those cascade onto
/// the pack's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub resource_family: ResourceFamily,
    pub resource_id: Option<String>,
    pub capabilities: BTreeSet<CapabilityTag>,
}

impl PermissionGrant {
    /// Grant on every resource of `family`.
    pub fn global(
        family: ResourceFamily,
        capabilities: impl IntoIterator<Item = CapabilityTag>,
    ) -> DomainResult<Self> {
        let grant = Self {
            resource_family: family,
            resource_id: None,
            capabilities: capabilities.into_iter().collect(),
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Grant on one resource instance.
    pub fn on_resource(
        address: &ResourceAddress,
        capabilities: impl IntoIterator<Item = CapabilityTag>,
    ) -> DomainResult<Self> {
        let grant = Self {
            resource_family: address.family(),
            resource_id: Some(address.id().to_string()),
            capabilities: capabilities.into_iter().collect(),
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Grant on the resource named by a `<family>:<id>` uid.
    pub fn on_uid(
        uid: &str,
        capabilities: impl IntoIterator<Item = CapabilityTag>,
    ) -> DomainResult<Self> {
        Self::on_resource(&ResourceAddress::parse_uid(uid)?, capabilities)
    }

    /// Check the grant's invariants.
    ///
    /// - the resource id, if present, is valid for the family
    /// - the capability set is not empty
    /// - every capability belongs to the grant's family, or the grant is on
    ///   packs and the capability belongs to a pack-scoped family
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(id) = &self.resource_id {
            self.resource_family.validate_id(id)?;
        }

        if self.capabilities.is_empty() {
            return Err(DomainError::validation("grant must carry at least one capability"));
        }

        let cascades = self.resource_family == ResourceFamily::Pack;
        for capability in &self.capabilities {
            let family = capability.family();
            let allowed = family == self.resource_family
                || (cascades && family.scheme() == AddressingScheme::PackScoped);
            if !allowed {
                return Err(DomainError::validation(format!(
                    "capability '{capability}' cannot be granted on {}",
                    self.scope_label()
                )));
            }
        }

        Ok(())
    }

    pub fn is_global(&self) -> bool {
        self.resource_id.is_none()
    }

    /// Whether any held capability satisfies `required`.
    pub fn satisfies(&self, required: CapabilityTag) -> bool {
        self.capabilities.iter().any(|held| required.is_satisfied_by(*held))
    }

    /// Whether this grant names exactly `address`.
    pub fn names(&self, address: &ResourceAddress) -> bool {
        self.resource_family == address.family() && self.resource_id.as_deref() == Some(address.id())
    }

    fn scope_label(&self) -> String {
        match &self.resource_id {
            Some(id) => format!("{}:{id}", self.resource_family),
            None => format!("all {} resources", self.resource_family),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_grant_may_carry_pack_scoped_capabilities() {
        let grant = PermissionGrant::on_uid(
            "pack:examples",
            [CapabilityTag::RuleCreate, CapabilityTag::ActionAll],
        );
        assert!(grant.is_ok());
    }

    #[test]
    fn global_pack_grant_may_carry_pack_scoped_capabilities() {
        let grant = PermissionGrant::global(ResourceFamily::Pack, [CapabilityTag::RuleCreate]);
        assert!(grant.is_ok());
    }

    #[test]
    fn global_grant_may_not_carry_other_families() {
        let grant = PermissionGrant::global(ResourceFamily::Rule, [CapabilityTag::ActionExecute]);
        assert!(matches!(grant, Err(DomainError::Validation(_))));

        let grant = PermissionGrant::global(ResourceFamily::Pack, [CapabilityTag::WebhookCreate]);
        assert!(matches!(grant, Err(DomainError::Validation(_))));
    }

    #[test]
    fn webhook_grant_rejects_foreign_capability() {
        let grant = PermissionGrant::on_uid("webhook:sample", [CapabilityTag::ActionExecute]);
        assert!(grant.is_err());
    }

    #[test]
    fn malformed_resource_id_is_rejected() {
        let grant = PermissionGrant {
            resource_family: ResourceFamily::Action,
            resource_id: Some("no-pack".to_string()),
            capabilities: [CapabilityTag::ActionExecute].into_iter().collect(),
        };
        assert!(matches!(
            grant.validate(),
            Err(DomainError::MalformedResourceAddress(_))
        ));
    }

    #[test]
    fn empty_capability_set_is_rejected() {
        assert!(PermissionGrant::global(ResourceFamily::Rule, []).is_err());
    }

    #[test]
    fn wildcard_in_grant_satisfies_concrete_tag() {
        let grant = PermissionGrant::on_uid("pack:wolfpack", [CapabilityTag::ActionAll]).unwrap();
        assert!(grant.satisfies(CapabilityTag::ActionExecute));
        assert!(!grant.satisfies(CapabilityTag::RuleCreate));
    }
}
