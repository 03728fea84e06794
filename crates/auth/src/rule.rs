//! Rule definitions as submitted for creation.
//!
//! Only the attributes authorization needs are interpreted here; the rest is
//! carried through untouched for persistence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved trigger type for webhook triggers.
pub const WEBHOOK_TRIGGER_TYPE: &str = "core.st2.webhook";

/// Pack used when a rule does not name one.
pub const DEFAULT_PACK: &str = "default";

fn default_pack() -> String {
    DEFAULT_PACK.to_string()
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default = "default_pack")]
    pub pack: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub trigger: TriggerSpec,
    #[serde(default)]
    pub criteria: Map<String, Value>,
    pub action: ActionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    #[serde(rename = "type")]
    pub trigger_type: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl RuleDefinition {
    /// `<pack>.<name>`
    pub fn reference(&self) -> String {
        format!("{}.{}", self.pack, self.name)
    }

    pub fn uses_webhook_trigger(&self) -> bool {
        self.trigger.trigger_type == WEBHOOK_TRIGGER_TYPE
    }

    /// Webhook name taken from the trigger's `url` parameter, without a
    /// leading slash. `None` when the parameter is absent or not a string.
    pub fn webhook_name(&self) -> Option<&str> {
        self.trigger
            .parameters
            .get("url")
            .and_then(Value::as_str)
            .map(|url| url.trim_start_matches('/'))
    }
}
