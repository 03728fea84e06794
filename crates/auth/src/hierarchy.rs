//! Resource hierarchy: which containers a resource lives in.
//!
//! Containment is a lookup table keyed by family. A grant on any ancestor
//! returned here cascades onto the resource.

use rulegate_core::{ResourceAddress, ResourceFamily};
use tracing::warn;

/// `(child family, container family)` pairs.
///
/// Webhooks and packs have no container.
const CONTAINERS: &[(ResourceFamily, ResourceFamily)] = &[
    (ResourceFamily::Action, ResourceFamily::Pack),
    (ResourceFamily::Rule, ResourceFamily::Pack),
    (ResourceFamily::Sensor, ResourceFamily::Pack),
    (ResourceFamily::Trigger, ResourceFamily::Pack),
];

/// Container family of `family`, if it has one.
pub fn container_of(family: ResourceFamily) -> Option<ResourceFamily> {
    CONTAINERS
        .iter()
        .find(|(child, _)| *child == family)
        .map(|(_, container)| *container)
}

/// Ancestors of `address`, innermost first.
pub fn ancestors_of(address: &ResourceAddress) -> Vec<ResourceAddress> {
    let mut ancestors = Vec::new();
    let mut current = address.clone();

    while let Some(container) = container_of(current.family()) {
        let Some(prefix) = current.pack_prefix() else {
            break;
        };
        match ResourceAddress::new(container, prefix) {
            Ok(parent) => {
                ancestors.push(parent.clone());
                current = parent;
            }
            Err(err) => {
                warn!(resource = %address, error = %err, "container prefix is not a valid address");
                break;
            }
        }
    }

    ancestors
}
