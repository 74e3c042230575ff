//! Single-phase transaction sorter for alpm-style backends
//!
//! Installs and removals are one step each, so the graph carries exactly
//! one element per change-set entry. Requirement edges order a provider's
//! installation before its dependents, and upgrade/conflict edges order a
//! superseded package's removal before the incoming installation.

use anyhow::Result;

use crate::backends::SorterBackend;
use crate::backends::common::{
    ORDINARY_REQUIREMENT_PRIORITY, PRE_REQUIREMENT_PRIORITY, conflict_removals,
    installing_providers, upgrade_removals,
};
use crate::core::{ChangeSet, PackageOp, PackageStep};
use crate::model::Pool;
use crate::sorter::RelationGraph;

/// Orders one element per change-set entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct PacmanBackend;

impl PacmanBackend {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SorterBackend for PacmanBackend {
    type Step = PackageStep;

    fn name(&self) -> &'static str {
        "pacman"
    }

    fn expected_elements(&self, changes: &ChangeSet) -> usize {
        changes.len()
    }

    fn describe(&self, pool: &Pool, step: &PackageStep) -> String {
        format!("{} {}", step.op, pool.name(step.package))
    }

    fn populate(
        &self,
        pool: &Pool,
        changes: &ChangeSet,
        graph: &mut RelationGraph<PackageStep>,
    ) -> Result<()> {
        for (package, op) in changes.iter() {
            let element = PackageStep { package, op };
            graph.add_element(element);

            for requirement in pool.requires(package) {
                let Some(providers) = installing_providers(pool, changes, requirement) else {
                    continue;
                };
                let priority = if requirement.pre {
                    PRE_REQUIREMENT_PRIORITY
                } else {
                    ORDINARY_REQUIREMENT_PRIORITY
                };
                for provider in providers {
                    // A package satisfying its own requirement imposes no ordering.
                    if provider == package {
                        continue;
                    }
                    graph.add_relation(&PackageStep::install(provider), &element, priority);
                }
            }

            if op == PackageOp::Install {
                for removed in upgrade_removals(pool, changes, package) {
                    graph.add_relation(&PackageStep::remove(removed), &element, 0);
                }
                for removed in conflict_removals(pool, changes, package) {
                    graph.add_relation(&PackageStep::remove(removed), &element, 0);
                }
            }
        }
        Ok(())
    }
}
