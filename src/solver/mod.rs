//! The reachability solver.
//!
//! This module provides the breadth-first fixpoint over the typed call graph:
//! - [`TypeSet`] - borrowed set view with an inlined singleton case
//! - [`TypeflowHistory`] - cache-line-sized per-typeflow observation record
//! - [`Bfs`] - the coupled method/typeflow worklist fixpoint
//!
//! The solver is single-threaded, performs no I/O, and defines no recoverable
//! errors: malformed graphs are programmer errors and panic.

mod bfs;
mod history;
mod typeset;

pub use bfs::{Bfs, SolverResult};
pub use history::{TypeflowHistory, DIST_UNREACHED, SATURATION_CUTOFF};
pub use typeset::{TypeSet, TypeSetIter};

use crate::graph::{Adjacency, MethodId};

/// Runs one reachability fixpoint over `adj`.
///
/// Convenience over [`Bfs::new`] + [`Bfs::run`] for one-shot callers; reuse
/// the [`Bfs`] when running several hypotheses over the same graph.
pub fn run(adj: &Adjacency, purged_methods: &[MethodId], dist_matters: bool) -> SolverResult {
    Bfs::new(adj).run(purged_methods, dist_matters)
}
