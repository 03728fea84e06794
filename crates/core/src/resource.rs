//! Resource families and resource addresses.
//!
//! Every protected entity is addressed by a `(family, identifier)` pair.
//! Identifiers follow the addressing convention of their family:
//!
//! - packs are single, undotted names (`examples`)
//! - pack-scoped families use `<pack>.<name>` (`wolfpack.action-1`)
//! - flat families use a plain name with no pack prefix (`sample`)
//!
//! The textual uid form is `<family>:<id>` (`pack:examples`). Pack-scoped
//! uids may also be written `<family>:<pack>:<name>`, which is normalised to
//! the dotted identifier.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Category of protected entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFamily {
    Pack,
    Action,
    Rule,
    Sensor,
    Trigger,
    Webhook,
}

/// How identifiers of a family are shaped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressingScheme {
    /// Top-level container; identifier must not contain a dot.
    Root,
    /// `<pack>.<name>`; the pack prefix names the container.
    PackScoped,
    /// Free-standing name with no container.
    Flat,
}

impl ResourceFamily {
    pub const ALL: [ResourceFamily; 6] = [
        ResourceFamily::Pack,
        ResourceFamily::Action,
        ResourceFamily::Rule,
        ResourceFamily::Sensor,
        ResourceFamily::Trigger,
        ResourceFamily::Webhook,
    ];

    /// Wire name, also used as the uid prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceFamily::Pack => "pack",
            ResourceFamily::Action => "action",
            ResourceFamily::Rule => "rule",
            ResourceFamily::Sensor => "sensor",
            ResourceFamily::Trigger => "trigger",
            ResourceFamily::Webhook => "webhook",
        }
    }

    /// Human label used in caller-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceFamily::Pack => "pack",
            ResourceFamily::Action => "action",
            ResourceFamily::Rule => "rule",
            ResourceFamily::Sensor => "sensor",
            ResourceFamily::Trigger => "trigger",
            ResourceFamily::Webhook => "webhook",
        }
    }

    pub fn scheme(&self) -> AddressingScheme {
        match self {
            ResourceFamily::Pack => AddressingScheme::Root,
            ResourceFamily::Action
            | ResourceFamily::Rule
            | ResourceFamily::Sensor
            | ResourceFamily::Trigger => AddressingScheme::PackScoped,
            ResourceFamily::Webhook => AddressingScheme::Flat,
        }
    }

    /// Check that `id` is syntactically valid for this family.
    pub fn validate_id(&self, id: &str) -> DomainResult<()> {
        if id.is_empty() {
            return Err(DomainError::malformed_address(format!(
                "{} identifier must not be empty",
                self.as_str()
            )));
        }
        if id.chars().any(char::is_whitespace) {
            return Err(DomainError::malformed_address(format!(
                "{} identifier '{id}' must not contain whitespace",
                self.as_str()
            )));
        }

        match self.scheme() {
            AddressingScheme::Root => {
                if id.contains('.') || id.contains(':') {
                    return Err(DomainError::malformed_address(format!(
                        "{} identifier '{id}' must be a single name",
                        self.as_str()
                    )));
                }
            }
            AddressingScheme::PackScoped => match id.split_once('.') {
                Some((pack, name)) if !pack.is_empty() && !name.is_empty() => {}
                _ => {
                    return Err(DomainError::malformed_address(format!(
                        "{} identifier '{id}' must have the form <pack>.<name>",
                        self.as_str()
                    )));
                }
            },
            AddressingScheme::Flat => {}
        }

        Ok(())
    }
}

impl core::fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceFamily {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceFamily::ALL
            .into_iter()
            .find(|family| family.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown resource family '{s}'")))
    }
}

/// Address of a single resource instance.
///
/// Immutable once constructed; construction validates the identifier against
/// the family's addressing scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceAddress {
    family: ResourceFamily,
    id: String,
}

impl ResourceAddress {
    pub fn new(family: ResourceFamily, id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        family.validate_id(&id)?;
        Ok(Self { family, id })
    }

    pub fn pack(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(ResourceFamily::Pack, name)
    }

    pub fn action(reference: impl Into<String>) -> DomainResult<Self> {
        Self::new(ResourceFamily::Action, reference)
    }

    pub fn rule(reference: impl Into<String>) -> DomainResult<Self> {
        Self::new(ResourceFamily::Rule, reference)
    }

    pub fn webhook(name: impl Into<String>) -> DomainResult<Self> {
        Self::new(ResourceFamily::Webhook, name)
    }

    /// Parse a `<family>:<id>` uid.
    pub fn parse_uid(uid: &str) -> DomainResult<Self> {
        let (family, rest) = uid.split_once(':').ok_or_else(|| {
            DomainError::malformed_address(format!("uid '{uid}' has no family prefix"))
        })?;
        let family: ResourceFamily = family
            .parse()
            .map_err(|_| DomainError::malformed_address(format!("uid '{uid}' has an unknown family")))?;

        let id = match (family.scheme(), rest.split_once(':')) {
            (AddressingScheme::PackScoped, Some((pack, name))) => format!("{pack}.{name}"),
            _ => rest.to_string(),
        };

        Self::new(family, id)
    }

    pub fn family(&self) -> ResourceFamily {
        self.family
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `<family>:<id>` form.
    pub fn uid(&self) -> String {
        format!("{}:{}", self.family.as_str(), self.id)
    }

    /// Name of the containing pack, for pack-scoped families.
    pub fn pack_prefix(&self) -> Option<&str> {
        match self.family.scheme() {
            AddressingScheme::PackScoped => self.id.split_once('.').map(|(pack, _)| pack),
            AddressingScheme::Root | AddressingScheme::Flat => None,
        }
    }
}

impl core::fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.family.as_str(), self.id)
    }
}

impl FromStr for ResourceAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_uid(s)
    }
}

impl TryFrom<String> for ResourceAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_uid(&value)
    }
}

impl From<ResourceAddress> for String {
    fn from(value: ResourceAddress) -> Self {
        value.uid()
    }
}
