//! Edge derivation shared by the backend sorters

use std::collections::HashSet;

use crate::core::{ChangeSet, PackageOp};
use crate::model::{PackageId, Pool, Requirement};

/// Relation priority for pre-requirements; never broken before ordinary ones.
pub(crate) const PRE_REQUIREMENT_PRIORITY: u32 = 0;

/// Relation priority for ordinary requirements; first to go when a loop
/// must break.
pub(crate) const ORDINARY_REQUIREMENT_PRIORITY: u32 = 1;

/// Providers whose installation must be ordered before the requirement's
/// owner, or `None` when the requirement needs no ordering at all because
/// an installed provider stays available (not scheduled for removal).
pub(crate) fn installing_providers(
    pool: &Pool,
    changes: &ChangeSet,
    requirement: &Requirement,
) -> Option<Vec<PackageId>> {
    let providers = pool.providers(requirement.capability);
    let satisfied = providers.iter().any(|&provider| {
        pool.installed(provider) && changes.operation(provider) != Some(PackageOp::Remove)
    });
    if satisfied {
        return None;
    }
    Some(
        providers
            .iter()
            .copied()
            .filter(|&provider| changes.operation(provider) == Some(PackageOp::Install))
            .collect(),
    )
}

/// Packages scheduled for removal that installing `package` supersedes:
/// whatever upgrades a capability `package` provides, plus the providers of
/// whatever `package` itself upgrades.
pub(crate) fn upgrade_removals(
    pool: &Pool,
    changes: &ChangeSet,
    package: PackageId,
) -> Vec<PackageId> {
    let mut seen = HashSet::new();
    let mut removals = Vec::new();
    for &capability in pool.provides(package) {
        for &other in pool.upgraded_by(capability) {
            push_scheduled_removal(changes, package, other, &mut seen, &mut removals);
        }
    }
    for &capability in pool.upgrades(package) {
        for &other in pool.providers(capability) {
            push_scheduled_removal(changes, package, other, &mut seen, &mut removals);
        }
    }
    removals
}

/// Packages scheduled for removal that installing `package` collides with:
/// providers of capabilities `package` conflicts with, plus packages whose
/// conflict descriptors target a capability `package` provides.
pub(crate) fn conflict_removals(
    pool: &Pool,
    changes: &ChangeSet,
    package: PackageId,
) -> Vec<PackageId> {
    let mut seen = HashSet::new();
    let mut removals = Vec::new();
    for &capability in pool.conflicts(package) {
        for &other in pool.providers(capability) {
            push_scheduled_removal(changes, package, other, &mut seen, &mut removals);
        }
    }
    for &capability in pool.provides(package) {
        for &other in pool.conflicted_by(capability) {
            push_scheduled_removal(changes, package, other, &mut seen, &mut removals);
        }
    }
    removals
}

fn push_scheduled_removal(
    changes: &ChangeSet,
    package: PackageId,
    other: PackageId,
    seen: &mut HashSet<PackageId>,
    removals: &mut Vec<PackageId>,
) {
    if other == package {
        return;
    }
    if changes.operation(other) != Some(PackageOp::Remove) {
        return;
    }
    if seen.insert(other) {
        removals.push(other);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_provider_satisfies_requirement() {
        let mut pool = Pool::new();
        let app = pool.add_package("app", "1.0");
        let lib = pool.add_package("lib", "1.0");
        let alt = pool.add_package("alt-lib", "1.0");
        pool.set_installed(lib, true);
        pool.add_provides(lib, "libdep");
        pool.add_provides(alt, "libdep");
        pool.add_requires(app, "libdep", false);

        // The installed provider stays, so even the scheduled alternative
        // adds no ordering.
        let mut changes = ChangeSet::new();
        changes.set(app, PackageOp::Install);
        changes.set(alt, PackageOp::Install);
        let requirement = pool.requires(app)[0];
        assert_eq!(installing_providers(&pool, &changes, &requirement), None);
    }

    #[test]
    fn test_removed_provider_no_longer_satisfies() {
        let mut pool = Pool::new();
        let app = pool.add_package("app", "1.0");
        let lib = pool.add_package("lib", "1.0");
        let alt = pool.add_package("alt-lib", "2.0");
        pool.set_installed(lib, true);
        pool.add_provides(lib, "libdep");
        pool.add_provides(alt, "libdep");
        pool.add_requires(app, "libdep", true);

        let mut changes = ChangeSet::new();
        changes.set(app, PackageOp::Install);
        changes.set(lib, PackageOp::Remove);
        changes.set(alt, PackageOp::Install);
        let requirement = pool.requires(app)[0];
        assert_eq!(
            installing_providers(&pool, &changes, &requirement),
            Some(vec![alt])
        );
    }

    #[test]
    fn test_upgrade_removals_cover_both_directions() {
        let mut pool = Pool::new();
        let new = pool.add_package("tool", "2.0");
        let old = pool.add_package("tool", "1.0");
        let legacy = pool.add_package("tool-legacy", "0.9");
        pool.add_provides(old, "tool");
        pool.add_provides(new, "tool-api");
        pool.add_upgrades(new, "tool");
        pool.add_upgrades(legacy, "tool-api");

        let mut changes = ChangeSet::new();
        changes.set(new, PackageOp::Install);
        changes.set(old, PackageOp::Remove);
        changes.set(legacy, PackageOp::Remove);
        assert_eq!(upgrade_removals(&pool, &changes, new), vec![legacy, old]);
    }

    #[test]
    fn test_conflict_removals_skip_unscheduled_packages() {
        let mut pool = Pool::new();
        let new = pool.add_package("mta-b", "1.0");
        let old = pool.add_package("mta-a", "1.0");
        pool.add_provides(old, "mta");
        pool.add_conflicts(new, "mta");

        let changes = ChangeSet::new();
        assert_eq!(conflict_removals(&pool, &changes, new), vec![]);
    }
}
