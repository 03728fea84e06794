//! Configuration loading.
//!
//! Environment variables:
//! - `RBAC_ENABLE` (bool, default `true`)
//! - `RBAC_PERMISSION_ISOLATION` (bool, default `false`)
//! - `RBAC_ELEVATED_ROLES` (comma separated, default `system_admin,admin`)

use anyhow::{Context, bail};
use tracing::warn;

use rulegate_auth::{RbacConfig, Role};

pub const ENV_ENABLE: &str = "RBAC_ENABLE";
pub const ENV_PERMISSION_ISOLATION: &str = "RBAC_PERMISSION_ISOLATION";
pub const ENV_ELEVATED_ROLES: &str = "RBAC_ELEVATED_ROLES";

/// Build the configuration from the process environment.
pub fn load_from_env() -> anyhow::Result<RbacConfig> {
    load_with(|key| std::env::var(key).ok())
}

/// Build the configuration from an arbitrary key lookup.
pub fn load_with<F>(lookup: F) -> anyhow::Result<RbacConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RbacConfig::default();

    if let Some(raw) = lookup(ENV_ENABLE) {
        config.enable = parse_bool(&raw).with_context(|| format!("invalid {ENV_ENABLE}"))?;
        if !config.enable {
            warn!("RBAC is disabled; every request will be allowed");
        }
    }

    if let Some(raw) = lookup(ENV_PERMISSION_ISOLATION) {
        config.permission_isolation =
            parse_bool(&raw).with_context(|| format!("invalid {ENV_PERMISSION_ISOLATION}"))?;
    }

    if let Some(raw) = lookup(ENV_ELEVATED_ROLES) {
        let roles: Vec<Role> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Role::new(s.to_string()))
            .collect();
        if roles.is_empty() {
            warn!("{ENV_ELEVATED_ROLES} is empty; only universal roles may list without a limit");
        }
        config.elevated_roles = roles;
    }

    Ok(config)
}

fn parse_bool(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}
