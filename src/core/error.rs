//! Error types for the ordering engine

use std::fmt;

use thiserror::Error;

/// Convenience Result type for ordering operations
pub type Result<T> = std::result::Result<T, SortError>;

#[derive(Error, Debug)]
pub enum SortError {
    /// The relation is unknown or already disabled. A caller defect in a
    /// custom graph builder, not a runtime transaction failure.
    #[error("cannot disable relation {0}: not present or already disabled")]
    Disable(String),

    /// The relation is unknown or not currently disabled.
    #[error("cannot enable relation {0}: not currently disabled")]
    Enable(String),

    /// The graph was already linearized and must be reset before reuse.
    #[error("relation graph already linearized; reset() before reuse")]
    Consumed,

    /// Linearization covered fewer elements than are registered. A defect in
    /// loop breaking or graph construction, never a user-facing condition.
    #[error("linearization kept {sorted} of {total} elements; a cycle survived loop breaking")]
    Incomplete { sorted: usize, total: usize },

    /// A backend produced a different number of graph elements than the
    /// change-set calls for.
    #[error("change-set calls for {expected} graph elements, builder produced {found}")]
    ElementCount { expected: usize, found: usize },

    #[error(transparent)]
    Loops(#[from] LoopError),
}

/// Diagnostic for a transaction the engine cannot order: the dependency
/// loops that remain, each rendered as one or more step cycles.
#[derive(Debug, Clone)]
pub struct LoopError {
    /// One entry per rendered cycle, each a sequence of step descriptions
    /// ending where it started.
    pub loops: Vec<Vec<String>>,
}

impl fmt::Display for LoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transaction ordering is unresolvable; {} dependency loop(s) remain",
            self.loops.len()
        )?;
        for path in &self.loops {
            write!(f, "\n  {}", path.join(" -> "))?;
        }
        Ok(())
    }
}

impl std::error::Error for LoopError {}
