//! Ordo - transaction ordering engine for a multi-backend package manager
//!
//! Given a change-set (packages to install or remove) and the relations
//! between packages (requires/provides/conflicts/upgrades), this library
//! produces a linear execution order that respects every ordering constraint
//! it can. Real package graphs contain dependency cycles that cannot all be
//! satisfied at once; the sorter detects them and disables the fewest,
//! least-important relations needed to make the graph acyclic before
//! ordering it.
//!
//! The crate splits into a generic layer and a domain layer:
//! - [`sorter`] knows nothing about packages: elements, prioritized
//!   "must-come-before" relations, loop analysis, loop breaking, and the
//!   final linearization.
//! - [`backends`] turns a change-set plus the [`model`] pool into sorter
//!   input, one backend per step granularity (single-phase pacman-style,
//!   two-phase dpkg-style).

// Production-ready clippy configuration
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::suspicious)]
// Allow documentation lints - internal code, not public API
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Allow some pedantic lints that are too strict for this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]

pub mod backends;
pub mod core;
pub mod model;
pub mod sorter;
