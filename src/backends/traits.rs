//! Backend trait definition

use anyhow::Result;

use crate::core::ChangeSet;
use crate::model::Pool;
use crate::sorter::{Element, RelationGraph};

/// Trait for backend-specific transaction sorters.
///
/// Each backend chooses its own step granularity (a pacman-style backend
/// installs in one step, a dpkg-style backend unpacks and configures
/// separately) and derives the ordering relations for it; the
/// [`RelationGraph`] contract underneath is shared.
pub trait SorterBackend {
    /// Schedulable unit this backend orders.
    type Step: Element;

    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Derive the graph elements and ordering relations for a change-set.
    fn populate(
        &self,
        pool: &Pool,
        changes: &ChangeSet,
        graph: &mut RelationGraph<Self::Step>,
    ) -> Result<()>;

    /// Number of graph elements a well-formed population must produce for
    /// this change-set.
    fn expected_elements(&self, changes: &ChangeSet) -> usize;

    /// Human-readable rendering of one step, for diagnostics.
    fn describe(&self, pool: &Pool, step: &Self::Step) -> String;
}
