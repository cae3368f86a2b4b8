//! Reachability analysis over typed call graphs.
//!
//! `subreach` models a whole program as methods (call-graph nodes) and
//! typeflows (nodes carrying the set of runtime types that may occur there),
//! then runs a breadth-first fixpoint that simultaneously propagates method
//! reachability and per-typeflow type sets:
//! - [`graph`] - id handles, the immutable [`Adjacency`], and its builder
//! - [`bitset`] - dense type-id sets backing filters
//! - [`solver`] - the fixpoint: histories, saturation, the [`Bfs`] driver
//! - [`purge`] - "what breaks if this method is cut" hypothesis queries
//! - [`cli`] - graph file loading, reporting, and the `subreach` binary glue

pub mod bitset;
pub mod cli;
pub mod graph;
pub mod purge;
pub mod solver;

pub use bitset::Bitset;
pub use graph::{Adjacency, AdjacencyBuilder, FilterId, MethodId, MethodRole, TypeId, TypeflowId};
pub use purge::{purge_impact, purge_sweep, PurgeImpact};
pub use solver::{Bfs, SolverResult, TypeSet, TypeflowHistory, DIST_UNREACHED, SATURATION_CUTOFF};
