//! Package relation model consumed by the sorters

mod pool;

pub use pool::{CapabilityId, PackageId, Pool, Requirement};
