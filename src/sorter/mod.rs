//! Constrained topological sorting over prioritized relations
//!
//! [`RelationGraph`] is the generic layer: it orders opaque elements under
//! directed "must-come-before" relations, detects dependency loops, and
//! breaks them by disabling the fewest, lowest-strength relations it can
//! before running the final topological sort. It knows nothing about
//! packages; the [`crate::backends`] layer feeds it.

mod graph;
mod loops;

pub use graph::{Element, RelationGraph};
pub use loops::Loop;
