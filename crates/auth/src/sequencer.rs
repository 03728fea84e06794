//! Ordered, multi-step authorization for composite operations.
//!
//! Grants are resolved once at the top of each operation and reused by every
//! step. The first failing step aborts the operation and is the only reason
//! reported.

use tracing::{debug, info, warn};

use rulegate_core::{ResourceAddress, ResourceFamily};

use crate::authorize::{AllowedVia, AuthzError, EffectiveGrants, PermissionResolver, UsageContext};
use crate::rule::RuleDefinition;
use crate::store::RbacStore;
use crate::{CapabilityTag, PrincipalName, RbacConfig};

/// One step of a composite authorization.
///
/// The target is kept as a raw reference; it is only turned into an address
/// when the step is reached, so a malformed reference in a later step never
/// masks a denial in an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCheck {
    pub capability: CapabilityTag,
    pub family: ResourceFamily,
    pub reference: String,
    pub context: UsageContext,
}

impl PlannedCheck {
    pub fn address(&self) -> Result<ResourceAddress, AuthzError> {
        Ok(ResourceAddress::new(self.family, self.reference.as_str())?)
    }
}

/// Checks required to create `rule`, in evaluation order.
///
/// 1. `rule_create` on the rule's pack
/// 2. `webhook_create` on the webhook, only for webhook triggers
/// 3. `action_execute` on the referenced action
///
/// The action is addressed by its reference alone; it need not exist. A
/// webhook trigger without a url plans an empty webhook name, which fails
/// as malformed once step 2 is reached.
pub fn plan_rule_create(rule: &RuleDefinition) -> Vec<PlannedCheck> {
    let mut plan = Vec::with_capacity(3);

    plan.push(PlannedCheck {
        capability: CapabilityTag::RuleCreate,
        family: ResourceFamily::Pack,
        reference: rule.pack.clone(),
        context: UsageContext::Resource,
    });

    if rule.uses_webhook_trigger() {
        plan.push(PlannedCheck {
            capability: CapabilityTag::WebhookCreate,
            family: ResourceFamily::Webhook,
            reference: rule.webhook_name().unwrap_or_default().to_string(),
            context: UsageContext::Trigger {
                trigger_ref: rule.trigger.trigger_type.clone(),
            },
        });
    }

    plan.push(PlannedCheck {
        capability: CapabilityTag::ActionExecute,
        family: ResourceFamily::Action,
        reference: rule.action.reference.clone(),
        context: UsageContext::Action,
    });

    plan
}

/// Runs composite authorizations against a store under one configuration.
pub struct AuthorizationSequencer<'a, S: ?Sized> {
    resolver: PermissionResolver<'a, S>,
    config: &'a RbacConfig,
}

impl<'a, S> AuthorizationSequencer<'a, S>
where
    S: RbacStore + ?Sized,
{
    pub fn new(store: &'a S, config: &'a RbacConfig) -> Self {
        Self {
            resolver: PermissionResolver::new(store),
            config,
        }
    }

    pub fn config(&self) -> &RbacConfig {
        self.config
    }

    /// Authorize creating `rule` on behalf of `principal`.
    ///
    /// On success the caller may persist the rule.
    pub fn authorize_create(
        &self,
        principal: &PrincipalName,
        rule: &RuleDefinition,
    ) -> Result<Vec<AllowedVia>, AuthzError> {
        let plan = plan_rule_create(rule);
        if !self.config.enable {
            for step in &plan {
                step.address().inspect_err(|err| {
                    warn!(principal = %principal, rule = %rule.reference(), error = %err, "rejected rule definition");
                })?;
            }
            return Ok(vec![AllowedVia::Disabled; plan.len()]);
        }

        let grants = self.resolver.resolve(principal)?;
        let allowed = run_plan(&grants, plan).inspect_err(|err| {
            if matches!(err, AuthzError::MalformedResourceAddress(_)) {
                warn!(principal = %principal, rule = %rule.reference(), error = %err, "rejected rule definition");
            }
        })?;

        debug!(principal = %principal, rule = %rule.reference(), "rule creation authorized");
        Ok(allowed)
    }

    /// Authorize listing resources of `family`.
    ///
    /// A negative `requested_limit` asks for every record and additionally
    /// requires a universal or elevated role, whatever list grants are held.
    pub fn authorize_list(
        &self,
        principal: &PrincipalName,
        family: ResourceFamily,
        requested_limit: Option<i64>,
    ) -> Result<AllowedVia, AuthzError> {
        if !self.config.enable {
            return Ok(AllowedVia::Disabled);
        }

        let grants = self.resolver.resolve(principal)?;
        let allowed = grants.check_global(CapabilityTag::list_for(family))?;

        if requested_limit.is_some_and(|limit| limit < 0) && !self.is_elevated(&grants) {
            info!(principal = %principal, family = %family, "unbounded listing denied");
            return Err(AuthzError::UnboundedListDenied {
                principal: principal.clone(),
            });
        }

        Ok(allowed)
    }

    fn is_elevated(&self, grants: &EffectiveGrants) -> bool {
        grants.universal_role().is_some() || grants.roles().iter().any(|r| self.config.is_elevated(r))
    }
}

/// Evaluate `plan` in order, stopping at the first denial or the first
/// step whose target is malformed.
pub fn run_plan(
    grants: &EffectiveGrants,
    plan: Vec<PlannedCheck>,
) -> Result<Vec<AllowedVia>, AuthzError> {
    plan.into_iter()
        .map(|step| {
            let address = step.address()?;
            grants.check_in_context(step.capability, &address, step.context)
        })
        .collect()
}
