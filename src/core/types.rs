//! Common types used throughout the ordering engine

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::PackageId;

/// Operation requested for one package in a change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageOp {
    Install,
    Remove,
}

impl fmt::Display for PackageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for PackageOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "install" => Ok(Self::Install),
            "remove" => Ok(Self::Remove),
            _ => Err(format!("Unknown operation: {s}")),
        }
    }
}

/// One schedulable unit of a single-phase transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageStep {
    pub package: PackageId,
    pub op: PackageOp,
}

impl PackageStep {
    #[must_use]
    pub const fn install(package: PackageId) -> Self {
        Self {
            package,
            op: PackageOp::Install,
        }
    }

    #[must_use]
    pub const fn remove(package: PackageId) -> Self {
        Self {
            package,
            op: PackageOp::Remove,
        }
    }
}

/// The packages a transaction will touch, each mapped to its operation.
///
/// Entries keep their insertion order so graph population, and with it the
/// final linearization, is deterministic from run to run. Scheduling a
/// package twice replaces its earlier operation.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    entries: Vec<(PackageId, PackageOp)>,
    index: HashMap<PackageId, usize>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `package` for `op`, replacing any earlier entry.
    pub fn set(&mut self, package: PackageId, op: PackageOp) {
        if let Some(&slot) = self.index.get(&package) {
            self.entries[slot].1 = op;
        } else {
            self.index.insert(package, self.entries.len());
            self.entries.push((package, op));
        }
    }

    #[must_use]
    pub fn operation(&self, package: PackageId) -> Option<PackageOp> {
        self.index.get(&package).map(|&slot| self.entries[slot].1)
    }

    #[must_use]
    pub fn contains(&self, package: PackageId) -> bool {
        self.index.contains_key(&package)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PackageId, PackageOp)> + '_ {
        self.entries.iter().copied()
    }
}
