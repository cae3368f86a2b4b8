//! Purge hypothesis queries.
//!
//! A purge query asks: which methods stop being reachable when a given set
//! of methods is treated as cut out of the program? Each query is one fresh
//! solver run diffed against a baseline; the sweep fans independent runs out
//! across threads with rayon (the solver itself stays single-threaded).

use rayon::prelude::*;
use serde::Serialize;

use crate::graph::MethodId;
use crate::solver::{Bfs, SolverResult};

/// The fallout of purging one candidate method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PurgeImpact {
    /// The purged candidate.
    pub candidate: MethodId,
    /// Every method reachable in the baseline but not under the purge,
    /// including the candidate itself.
    pub unreachable: Vec<MethodId>,
}

/// Methods reachable in `baseline` that become unreachable when `purged`
/// are cut. The purged methods themselves are included when they were
/// reachable before.
pub fn purge_impact(bfs: &Bfs<'_>, baseline: &SolverResult, purged: &[MethodId]) -> Vec<MethodId> {
    let hypothesis = bfs.run(purged, false);
    baseline
        .method_visited
        .iter()
        .zip(&hypothesis.method_visited)
        .enumerate()
        .filter(|(_, (&was, &is))| was && !is)
        .map(|(i, _)| MethodId(i as u32))
        .collect()
}

/// Runs a single-purge impact query for every candidate, in parallel.
///
/// Results come back in candidate order regardless of scheduling.
pub fn purge_sweep(
    bfs: &Bfs<'_>,
    baseline: &SolverResult,
    candidates: &[MethodId],
) -> Vec<PurgeImpact> {
    candidates
        .par_iter()
        .map(|&candidate| PurgeImpact {
            candidate,
            unreachable: purge_impact(bfs, baseline, &[candidate]),
        })
        .collect()
}
