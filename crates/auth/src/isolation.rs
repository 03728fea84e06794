//! Ownership-based visibility filtering for listings.
//!
//! Applied after the list permission has been granted. Independent of the
//! grant model: no grant widens what a principal sees while isolation is on.

use tracing::debug;

use rulegate_core::Owned;

use crate::{PrincipalName, RbacConfig};

/// Keep only the candidates `principal` created, when isolation is on.
pub fn filter_visible<T: Owned>(
    config: &RbacConfig,
    principal: &PrincipalName,
    candidates: Vec<T>,
) -> Vec<T> {
    if !config.enable || !config.permission_isolation {
        return candidates;
    }

    let total = candidates.len();
    let visible: Vec<T> = candidates
        .into_iter()
        .filter(|c| c.ownership().is_owned_by(principal.as_str()))
        .collect();

    debug!(principal = %principal, total, visible = visible.len(), "isolation filter applied");
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rulegate_core::ResourceOwnership;

    fn owned(by: &str) -> ResourceOwnership {
        ResourceOwnership::new(by, Utc::now())
    }

    #[test]
    fn isolation_keeps_only_own_resources() {
        let config = RbacConfig::default().with_isolation(true);
        let items = vec![owned("admin"), owned("alice"), owned("alice")];

        let alice = filter_visible(&config, &PrincipalName::new("alice"), items.clone());
        assert_eq!(alice.len(), 2);

        let admin = filter_visible(&config, &PrincipalName::new("admin"), items);
        assert_eq!(admin.len(), 1);
    }

    #[test]
    fn isolation_off_returns_everything() {
        let config = RbacConfig::default();
        let items = vec![owned("admin"), owned("alice")];
        let visible = filter_visible(&config, &PrincipalName::new("bob"), items);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn filter_works_over_borrowed_candidates() {
        let config = RbacConfig::default().with_isolation(true);
        let items = [owned("alice"), owned("bob")];
        let visible = filter_visible(&config, &PrincipalName::new("bob"), items.iter().collect());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].created_by, "bob");
    }
}
