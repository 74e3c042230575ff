//! Arena-backed package relation model
//!
//! Packages and the capabilities they exchange live in two flat arenas,
//! cross-referenced by integer handles. The logical graph is cyclic
//! (providers know their requirers and vice versa) but ownership stays
//! acyclic, so the whole model is plain owned data.
//!
//! The pool is assembled up front and consumed read-only by the sorter
//! layer; nothing here mutates during transaction planning.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Handle to a package record in a [`Pool`].
///
/// Handles index the pool that minted them; mixing pools is a caller bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(u32);

/// Handle to an interned capability (a named thing packages provide,
/// require, conflict with, or upgrade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(u32);

/// A single dependency of a package on a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub capability: CapabilityId,
    /// Pre-requirements must be fully in place strictly before the dependent
    /// package; ordinary requirements are softer and break first under
    /// dependency loops.
    pub pre: bool,
}

#[derive(Debug)]
struct PackageRecord {
    name: String,
    version: String,
    installed: bool,
    requires: Vec<Requirement>,
    provides: Vec<CapabilityId>,
    conflicts: Vec<CapabilityId>,
    upgrades: Vec<CapabilityId>,
}

#[derive(Debug, Default)]
struct CapabilityRecord {
    name: String,
    providers: Vec<PackageId>,
    required_by: Vec<PackageId>,
    conflicted_by: Vec<PackageId>,
    upgraded_by: Vec<PackageId>,
}

/// The package relation model: every package the planner can see, with
/// forward relation lists per package and back-references per capability.
#[derive(Debug, Default)]
pub struct Pool {
    packages: Vec<PackageRecord>,
    capabilities: Vec<CapabilityRecord>,
    capability_index: HashMap<String, CapabilityId>,
}

impl Pool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package. Packages are never deduplicated: two records with
    /// the same name model two versions, the way an upgrade transaction sees
    /// the installed and the candidate package side by side.
    pub fn add_package(&mut self, name: &str, version: &str) -> PackageId {
        let id = PackageId(self.packages.len() as u32);
        self.packages.push(PackageRecord {
            name: name.to_string(),
            version: version.to_string(),
            installed: false,
            requires: Vec::new(),
            provides: Vec::new(),
            conflicts: Vec::new(),
            upgrades: Vec::new(),
        });
        id
    }

    pub fn set_installed(&mut self, package: PackageId, installed: bool) {
        self.packages[package.0 as usize].installed = installed;
    }

    pub fn add_provides(&mut self, package: PackageId, capability: &str) {
        let cap = self.intern(capability);
        self.packages[package.0 as usize].provides.push(cap);
        self.capabilities[cap.0 as usize].providers.push(package);
    }

    pub fn add_requires(&mut self, package: PackageId, capability: &str, pre: bool) {
        let cap = self.intern(capability);
        self.packages[package.0 as usize]
            .requires
            .push(Requirement { capability: cap, pre });
        self.capabilities[cap.0 as usize].required_by.push(package);
    }

    pub fn add_conflicts(&mut self, package: PackageId, capability: &str) {
        let cap = self.intern(capability);
        self.packages[package.0 as usize].conflicts.push(cap);
        self.capabilities[cap.0 as usize].conflicted_by.push(package);
    }

    pub fn add_upgrades(&mut self, package: PackageId, capability: &str) {
        let cap = self.intern(capability);
        self.packages[package.0 as usize].upgrades.push(cap);
        self.capabilities[cap.0 as usize].upgraded_by.push(package);
    }

    fn intern(&mut self, capability: &str) -> CapabilityId {
        if let Some(&cap) = self.capability_index.get(capability) {
            return cap;
        }
        let cap = CapabilityId(self.capabilities.len() as u32);
        self.capabilities.push(CapabilityRecord {
            name: capability.to_string(),
            ..CapabilityRecord::default()
        });
        self.capability_index.insert(capability.to_string(), cap);
        cap
    }

    #[must_use]
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn capability_count(&self) -> usize {
        self.capabilities.len()
    }

    #[must_use]
    pub fn name(&self, package: PackageId) -> &str {
        &self.packages[package.0 as usize].name
    }

    #[must_use]
    pub fn version(&self, package: PackageId) -> &str {
        &self.packages[package.0 as usize].version
    }

    #[must_use]
    pub fn installed(&self, package: PackageId) -> bool {
        self.packages[package.0 as usize].installed
    }

    #[must_use]
    pub fn requires(&self, package: PackageId) -> &[Requirement] {
        &self.packages[package.0 as usize].requires
    }

    #[must_use]
    pub fn provides(&self, package: PackageId) -> &[CapabilityId] {
        &self.packages[package.0 as usize].provides
    }

    #[must_use]
    pub fn conflicts(&self, package: PackageId) -> &[CapabilityId] {
        &self.packages[package.0 as usize].conflicts
    }

    #[must_use]
    pub fn upgrades(&self, package: PackageId) -> &[CapabilityId] {
        &self.packages[package.0 as usize].upgrades
    }

    #[must_use]
    pub fn capability(&self, name: &str) -> Option<CapabilityId> {
        self.capability_index.get(name).copied()
    }

    #[must_use]
    pub fn capability_name(&self, capability: CapabilityId) -> &str {
        &self.capabilities[capability.0 as usize].name
    }

    /// Packages providing `capability`.
    #[must_use]
    pub fn providers(&self, capability: CapabilityId) -> &[PackageId] {
        &self.capabilities[capability.0 as usize].providers
    }

    /// Packages with a requirement on `capability`.
    #[must_use]
    pub fn required_by(&self, capability: CapabilityId) -> &[PackageId] {
        &self.capabilities[capability.0 as usize].required_by
    }

    /// Packages whose conflict descriptors target `capability`.
    #[must_use]
    pub fn conflicted_by(&self, capability: CapabilityId) -> &[PackageId] {
        &self.capabilities[capability.0 as usize].conflicted_by
    }

    /// Packages whose upgrade descriptors target `capability`.
    #[must_use]
    pub fn upgraded_by(&self, capability: CapabilityId) -> &[PackageId] {
        &self.capabilities[capability.0 as usize].upgraded_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_interning_is_shared() {
        let mut pool = Pool::new();
        let a = pool.add_package("a", "1.0");
        let b = pool.add_package("b", "2.0");
        pool.add_provides(a, "libfoo");
        pool.add_requires(b, "libfoo", false);
        assert_eq!(pool.capability_count(), 1);

        let cap = pool.capability("libfoo").expect("interned");
        assert_eq!(pool.providers(cap), &[a]);
        assert_eq!(pool.required_by(cap), &[b]);
        assert_eq!(pool.capability_name(cap), "libfoo");
    }

    #[test]
    fn test_back_references_navigate_both_ways() {
        let mut pool = Pool::new();
        let old = pool.add_package("tool", "1.0");
        let new = pool.add_package("tool", "2.0");
        pool.set_installed(old, true);
        pool.add_provides(old, "tool");
        pool.add_upgrades(new, "tool");
        pool.add_conflicts(new, "tool");

        let cap = pool.capability("tool").expect("interned");
        assert_eq!(pool.upgraded_by(cap), &[new]);
        assert_eq!(pool.conflicted_by(cap), &[new]);
        assert_eq!(pool.upgrades(new), &[cap]);
        assert!(pool.installed(old));
        assert!(!pool.installed(new));
        assert_eq!(pool.version(new), "2.0");
    }

    #[test]
    fn test_same_name_packages_stay_distinct() {
        let mut pool = Pool::new();
        let v1 = pool.add_package("pkg", "1.0");
        let v2 = pool.add_package("pkg", "2.0");
        assert_ne!(v1, v2);
        assert_eq!(pool.package_count(), 2);
        assert_eq!(pool.name(v1), pool.name(v2));
    }
}
