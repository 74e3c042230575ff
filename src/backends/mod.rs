//! Backend-specific transaction sorters
//!
//! Each backend maps a change-set onto its own step granularity and feeds
//! the shared [`RelationGraph`]; [`plan_transaction`] drives the whole
//! pipeline for an executor.

#[cfg(feature = "debian")]
pub mod dpkg;
#[cfg(feature = "arch")]
pub mod pacman;

mod common;
mod traits;

#[cfg(feature = "debian")]
pub use dpkg::{DpkgBackend, DpkgPhase, DpkgStep};
#[cfg(feature = "arch")]
pub use pacman::PacmanBackend;
pub use traits::SorterBackend;

use crate::core::{ChangeSet, LoopError, SortError};
use crate::model::Pool;
use crate::sorter::RelationGraph;

/// Order a change-set for execution: populate the relation graph, check the
/// element-count invariant, and linearize.
///
/// When linearization cannot cover every element (which a correct builder
/// and loop breaker never produce, but a custom backend can), the remaining
/// loops come back as a [`LoopError`] with rendered step cycles, ready for
/// user diagnostics.
pub fn plan_transaction<B: SorterBackend>(
    backend: &B,
    pool: &Pool,
    changes: &ChangeSet,
) -> anyhow::Result<Vec<B::Step>> {
    let mut graph = RelationGraph::new();
    backend.populate(pool, changes, &mut graph)?;

    let expected = backend.expected_elements(changes);
    if graph.len() != expected {
        return Err(SortError::ElementCount {
            expected,
            found: graph.len(),
        }
        .into());
    }
    tracing::debug!(
        backend = backend.name(),
        elements = graph.len(),
        relations = graph.relation_count(),
        "transaction graph populated"
    );

    match graph.linearize() {
        Ok(order) => Ok(order),
        Err(SortError::Incomplete { .. }) => {
            graph.enable_all_relations();
            let mut rendered = Vec::new();
            for lp in graph.find_all_loops() {
                for path in graph.loop_paths(&lp) {
                    rendered.push(
                        path.iter()
                            .map(|step| backend.describe(pool, step))
                            .collect(),
                    );
                }
            }
            Err(LoopError { loops: rendered }.into())
        }
        Err(other) => Err(other.into()),
    }
}
