//! Two-phase transaction sorter for dpkg-style backends
//!
//! An installation splits into unpack and configure steps; a pre-dependency
//! must be configured before its dependent is even unpacked, while an
//! ordinary dependency only has to be configured before the dependent's
//! configure step.

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::backends::SorterBackend;
use crate::backends::common::{
    ORDINARY_REQUIREMENT_PRIORITY, PRE_REQUIREMENT_PRIORITY, conflict_removals,
    installing_providers, upgrade_removals,
};
use crate::core::{ChangeSet, PackageOp};
use crate::model::{PackageId, Pool};
use crate::sorter::RelationGraph;

/// Execution phase of a dpkg step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DpkgPhase {
    Unpack,
    Configure,
    Remove,
}

impl fmt::Display for DpkgPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpack => write!(f, "unpack"),
            Self::Configure => write!(f, "configure"),
            Self::Remove => write!(f, "remove"),
        }
    }
}

/// One schedulable unit of a two-phase transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DpkgStep {
    pub package: PackageId,
    pub phase: DpkgPhase,
}

impl DpkgStep {
    #[must_use]
    pub const fn unpack(package: PackageId) -> Self {
        Self {
            package,
            phase: DpkgPhase::Unpack,
        }
    }

    #[must_use]
    pub const fn configure(package: PackageId) -> Self {
        Self {
            package,
            phase: DpkgPhase::Configure,
        }
    }

    #[must_use]
    pub const fn remove(package: PackageId) -> Self {
        Self {
            package,
            phase: DpkgPhase::Remove,
        }
    }
}

/// Orders unpack/configure/remove steps.
#[derive(Debug, Default, Clone, Copy)]
pub struct DpkgBackend;

impl DpkgBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SorterBackend for DpkgBackend {
    type Step = DpkgStep;

    fn name(&self) -> &'static str {
        "dpkg"
    }

    fn expected_elements(&self, changes: &ChangeSet) -> usize {
        changes
            .iter()
            .map(|(_, op)| match op {
                PackageOp::Install => 2,
                PackageOp::Remove => 1,
            })
            .sum()
    }

    fn describe(&self, pool: &Pool, step: &DpkgStep) -> String {
        format!("{} {}", step.phase, pool.name(step.package))
    }

    fn populate(
        &self,
        pool: &Pool,
        changes: &ChangeSet,
        graph: &mut RelationGraph<DpkgStep>,
    ) -> Result<()> {
        for (package, op) in changes.iter() {
            match op {
                PackageOp::Install => {
                    let unpack = DpkgStep::unpack(package);
                    let configure = DpkgStep::configure(package);
                    graph.add_element(unpack);
                    graph.add_element(configure);
                    graph.add_relation(&unpack, &configure, PRE_REQUIREMENT_PRIORITY);

                    for requirement in pool.requires(package) {
                        let Some(providers) = installing_providers(pool, changes, requirement)
                        else {
                            continue;
                        };
                        for provider in providers {
                            if provider == package {
                                continue;
                            }
                            let provider_ready = DpkgStep::configure(provider);
                            if requirement.pre {
                                graph.add_relation(
                                    &provider_ready,
                                    &unpack,
                                    PRE_REQUIREMENT_PRIORITY,
                                );
                            } else {
                                graph.add_relation(
                                    &provider_ready,
                                    &configure,
                                    ORDINARY_REQUIREMENT_PRIORITY,
                                );
                            }
                        }
                    }

                    for removed in upgrade_removals(pool, changes, package) {
                        graph.add_relation(&DpkgStep::remove(removed), &unpack, 0);
                    }
                    for removed in conflict_removals(pool, changes, package) {
                        graph.add_relation(&DpkgStep::remove(removed), &unpack, 0);
                    }
                }
                PackageOp::Remove => {
                    let remove = DpkgStep::remove(package);
                    graph.add_element(remove);

                    for requirement in pool.requires(package) {
                        let Some(providers) = installing_providers(pool, changes, requirement)
                        else {
                            continue;
                        };
                        let priority = if requirement.pre {
                            PRE_REQUIREMENT_PRIORITY
                        } else {
                            ORDINARY_REQUIREMENT_PRIORITY
                        };
                        for provider in providers {
                            if provider == package {
                                continue;
                            }
                            graph.add_relation(&DpkgStep::configure(provider), &remove, priority);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
