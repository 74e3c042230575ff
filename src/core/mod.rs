//! Core module - shared types and errors

mod error;
mod types;

pub use error::{LoopError, Result, SortError};
pub use types::{ChangeSet, PackageOp, PackageStep};
