//! Capability tags.
//!
//! Every tag belongs to exactly one resource family. Each family also has a
//! wildcard tag (`<family>_all`) that satisfies every concrete tag of that
//! family; the containment relation lives in [`CapabilityTag::is_satisfied_by`]
//! and nowhere else.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use rulegate_core::{DomainError, ResourceFamily};

/// Named permission.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTag {
    PackList,
    PackView,
    PackInstall,
    PackUninstall,
    PackRegister,
    PackAll,

    ActionList,
    ActionView,
    ActionCreate,
    ActionModify,
    ActionDelete,
    ActionExecute,
    ActionAll,

    RuleList,
    RuleView,
    RuleCreate,
    RuleModify,
    RuleDelete,
    RuleAll,

    SensorList,
    SensorView,
    SensorModify,
    SensorAll,

    TriggerList,
    TriggerView,
    TriggerAll,

    WebhookList,
    WebhookView,
    WebhookCreate,
    WebhookSend,
    WebhookDelete,
    WebhookAll,
}

impl CapabilityTag {
    pub const ALL: [CapabilityTag; 32] = [
        CapabilityTag::PackList,
        CapabilityTag::PackView,
        CapabilityTag::PackInstall,
        CapabilityTag::PackUninstall,
        CapabilityTag::PackRegister,
        CapabilityTag::PackAll,
        CapabilityTag::ActionList,
        CapabilityTag::ActionView,
        CapabilityTag::ActionCreate,
        CapabilityTag::ActionModify,
        CapabilityTag::ActionDelete,
        CapabilityTag::ActionExecute,
        CapabilityTag::ActionAll,
        CapabilityTag::RuleList,
        CapabilityTag::RuleView,
        CapabilityTag::RuleCreate,
        CapabilityTag::RuleModify,
        CapabilityTag::RuleDelete,
        CapabilityTag::RuleAll,
        CapabilityTag::SensorList,
        CapabilityTag::SensorView,
        CapabilityTag::SensorModify,
        CapabilityTag::SensorAll,
        CapabilityTag::TriggerList,
        CapabilityTag::TriggerView,
        CapabilityTag::TriggerAll,
        CapabilityTag::WebhookList,
        CapabilityTag::WebhookView,
        CapabilityTag::WebhookCreate,
        CapabilityTag::WebhookSend,
        CapabilityTag::WebhookDelete,
        CapabilityTag::WebhookAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityTag::PackList => "pack_list",
            CapabilityTag::PackView => "pack_view",
            CapabilityTag::PackInstall => "pack_install",
            CapabilityTag::PackUninstall => "pack_uninstall",
            CapabilityTag::PackRegister => "pack_register",
            CapabilityTag::PackAll => "pack_all",
            CapabilityTag::ActionList => "action_list",
            CapabilityTag::ActionView => "action_view",
            CapabilityTag::ActionCreate => "action_create",
            CapabilityTag::ActionModify => "action_modify",
            CapabilityTag::ActionDelete => "action_delete",
            CapabilityTag::ActionExecute => "action_execute",
            CapabilityTag::ActionAll => "action_all",
            CapabilityTag::RuleList => "rule_list",
            CapabilityTag::RuleView => "rule_view",
            CapabilityTag::RuleCreate => "rule_create",
            CapabilityTag::RuleModify => "rule_modify",
            CapabilityTag::RuleDelete => "rule_delete",
            CapabilityTag::RuleAll => "rule_all",
            CapabilityTag::SensorList => "sensor_list",
            CapabilityTag::SensorView => "sensor_view",
            CapabilityTag::SensorModify => "sensor_modify",
            CapabilityTag::SensorAll => "sensor_all",
            CapabilityTag::TriggerList => "trigger_list",
            CapabilityTag::TriggerView => "trigger_view",
            CapabilityTag::TriggerAll => "trigger_all",
            CapabilityTag::WebhookList => "webhook_list",
            CapabilityTag::WebhookView => "webhook_view",
            CapabilityTag::WebhookCreate => "webhook_create",
            CapabilityTag::WebhookSend => "webhook_send",
            CapabilityTag::WebhookDelete => "webhook_delete",
            CapabilityTag::WebhookAll => "webhook_all",
        }
    }

    /// Family this tag belongs to.
    pub fn family(&self) -> ResourceFamily {
        use CapabilityTag::*;
        match self {
            PackList | PackView | PackInstall | PackUninstall | PackRegister | PackAll => {
                ResourceFamily::Pack
            }
            ActionList | ActionView | ActionCreate | ActionModify | ActionDelete | ActionExecute
            | ActionAll => ResourceFamily::Action,
            RuleList | RuleView | RuleCreate | RuleModify | RuleDelete | RuleAll => {
                ResourceFamily::Rule
            }
            SensorList | SensorView | SensorModify | SensorAll => ResourceFamily::Sensor,
            TriggerList | TriggerView | TriggerAll => ResourceFamily::Trigger,
            WebhookList | WebhookView | WebhookCreate | WebhookSend | WebhookDelete
            | WebhookAll => ResourceFamily::Webhook,
        }
    }

    /// Wildcard tag of `family`.
    pub fn wildcard_for(family: ResourceFamily) -> CapabilityTag {
        match family {
            ResourceFamily::Pack => CapabilityTag::PackAll,
            ResourceFamily::Action => CapabilityTag::ActionAll,
            ResourceFamily::Rule => CapabilityTag::RuleAll,
            ResourceFamily::Sensor => CapabilityTag::SensorAll,
            ResourceFamily::Trigger => CapabilityTag::TriggerAll,
            ResourceFamily::Webhook => CapabilityTag::WebhookAll,
        }
    }

    /// Collection-level list tag of `family`.
    pub fn list_for(family: ResourceFamily) -> CapabilityTag {
        match family {
            ResourceFamily::Pack => CapabilityTag::PackList,
            ResourceFamily::Action => CapabilityTag::ActionList,
            ResourceFamily::Rule => CapabilityTag::RuleList,
            ResourceFamily::Sensor => CapabilityTag::SensorList,
            ResourceFamily::Trigger => CapabilityTag::TriggerList,
            ResourceFamily::Webhook => CapabilityTag::WebhookList,
        }
    }

    pub fn view_for(family: ResourceFamily) -> CapabilityTag {
        match family {
            ResourceFamily::Pack => CapabilityTag::PackView,
            ResourceFamily::Action => CapabilityTag::ActionView,
            ResourceFamily::Rule => CapabilityTag::RuleView,
            ResourceFamily::Sensor => CapabilityTag::SensorView,
            ResourceFamily::Trigger => CapabilityTag::TriggerView,
            ResourceFamily::Webhook => CapabilityTag::WebhookView,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Self::wildcard_for(self.family())
    }

    /// Whether holding `held` is enough to exercise `self`.
    pub fn is_satisfied_by(&self, held: CapabilityTag) -> bool {
        held == *self || held == Self::wildcard_for(self.family())
    }
}

impl core::fmt::Display for CapabilityTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CapabilityTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown capability '{s}'")))
    }
}
