//! The breadth-first reachability fixpoint.
//!
//! Two coupled worklists drive the solve: a method worklist drained in BFS
//! layers (two swapped vectors) and a FIFO typeflow worklist. Typeflows gain
//! types from their predecessors through per-typeflow filters; a typeflow
//! with a `Reaching` role wakes its method, a `Dependent` one stays silent
//! until its method has been reached. Histories that overflow
//! [`SATURATION_CUTOFF`](crate::solver::SATURATION_CUTOFF) distinct types
//! saturate, after which their
//! successors are fed from the global instantiated set: each growth of that
//! set is replayed as a delta against the saturation-uses list of every
//! filter.

use std::collections::VecDeque;

use crate::bitset::Bitset;
use crate::graph::{Adjacency, FilterId, MethodId, MethodRole, TypeId, TypeflowId};
use crate::solver::history::{TypeflowHistory, DIST_UNREACHED};
use crate::solver::typeset::TypeSet;

/// Outcome of one solver run.
///
/// Vectors are indexed by the raw method/typeflow ids of the input graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverResult {
    /// Per-typeflow observation record.
    pub typeflow_visited: Vec<TypeflowHistory>,
    /// BFS distance per method; [`DIST_UNREACHED`] if never dequeued. All
    /// zero for reached methods when distances were not requested.
    pub method_history: Vec<u8>,
    /// True iff the method is reachable and was not purged.
    pub method_visited: Vec<bool>,
}

impl SolverResult {
    pub fn is_method_reachable(&self, m: MethodId) -> bool {
        self.method_visited[m.index()]
    }

    pub fn method_distance(&self, m: MethodId) -> Option<u8> {
        let dist = self.method_history[m.index()];
        (dist != DIST_UNREACHED).then_some(dist)
    }

    pub fn reachable_method_count(&self) -> usize {
        self.method_visited.iter().filter(|&&v| v).count()
    }

    pub fn history(&self, t: TypeflowId) -> &TypeflowHistory {
        &self.typeflow_visited[t.index()]
    }
}

/// Reusable solver state for one graph: the canonical filter tables.
///
/// Construction resolves every interned filter to one [`TypeSet`] and maps
/// each typeflow to its filter's canonical set, so singleton-vs-bitset
/// dispatch is decided once per filter rather than per probe.
pub struct Bfs<'a> {
    adj: &'a Adjacency,
    /// Canonical set per interned filter, indexed by `FilterId`.
    filter_sets: Vec<TypeSet<'a>>,
    /// Canonical set of each typeflow's filter, indexed by `TypeflowId`.
    flow_filters: Vec<TypeSet<'a>>,
}

impl<'a> Bfs<'a> {
    pub fn new(adj: &'a Adjacency) -> Self {
        let filter_sets: Vec<TypeSet<'a>> = (0..adj.n_filters())
            .map(|i| TypeSet::from_bitset(adj.filter(FilterId(i as u32))))
            .collect();
        let flow_filters = (0..adj.n_typeflows())
            .map(|i| filter_sets[adj.flow(TypeflowId(i as u32)).filter.index()])
            .collect();
        Self { adj, filter_sets, flow_filters }
    }

    pub fn adjacency(&self) -> &'a Adjacency {
        self.adj
    }

    /// Runs the fixpoint.
    ///
    /// `purged_methods` are treated as unreachable regardless of incoming
    /// edges (they are marked visited internally so nothing relaxes through
    /// them, and reset to unvisited in the result). With `dist_matters`
    /// false, BFS layers are coalesced for speed and every reached method
    /// reports distance 0.
    pub fn run(&self, purged_methods: &[MethodId], dist_matters: bool) -> SolverResult {
        let adj = self.adj;
        let n_methods = adj.n_methods();
        let n_typeflows = adj.n_typeflows();

        let mut method_visited = vec![false; n_methods];
        let mut method_history = vec![DIST_UNREACHED; n_methods];
        let mut typeflow_visited = vec![TypeflowHistory::new(); n_typeflows];

        let mut all_instantiated = Bitset::new(adj.n_types());

        method_visited[MethodId::ROOT.index()] = true;
        method_history[MethodId::ROOT.index()] = 0;
        for &purged in purged_methods {
            method_visited[purged.index()] = true;
        }

        let mut method_worklist: Vec<MethodId> = vec![MethodId::ROOT];
        let mut next_method_worklist: Vec<MethodId> = Vec::new();
        let mut typeflow_worklist: VecDeque<TypeflowId> = VecDeque::new();

        // White-hole successors get every type their filter admits. Seeding
        // is gated: a successor dependent on an unreached method receives its
        // seed later, when the method phase first dequeues that method.
        let mut whitehole_successor = vec![false; n_typeflows];
        let mut whitehole_seeded = vec![false; n_typeflows];
        for &v in &adj.flow(TypeflowId::WHITE_HOLE).forward_edges {
            whitehole_successor[v.index()] = true;
            if !gate_open(adj.flow(v).method, &method_history) {
                continue;
            }
            whitehole_seeded[v.index()] = true;
            let changed = seed_from_filter(
                &mut typeflow_visited[v.index()],
                self.flow_filters[v.index()],
                0,
            );
            if changed && adj.flow(v).method.dependent().is_none() {
                typeflow_worklist.push_back(v);
            }
        }

        let mut instantiated_since_last_iteration: Vec<TypeId> = Vec::new();
        let mut saturation_uses_by_filter: Vec<Vec<TypeflowId>> =
            vec![Vec::new(); self.filter_sets.len()];
        let mut included_in_saturation_uses = vec![false; n_typeflows];

        let mut dist: u8 = 0;

        while !method_worklist.is_empty() {
            // Method phase: drain one BFS layer (or, when distances do not
            // matter, keep draining until no methods are left).
            loop {
                for &u in &method_worklist {
                    method_history[u.index()] = dist;
                    let m = adj.method(u);

                    for &v in &m.dependent_typeflows {
                        if whitehole_successor[v.index()] && !whitehole_seeded[v.index()] {
                            whitehole_seeded[v.index()] = true;
                            seed_from_filter(
                                &mut typeflow_visited[v.index()],
                                self.flow_filters[v.index()],
                                dist,
                            );
                        }
                        if typeflow_visited[v.index()].any() {
                            typeflow_worklist.push_back(v);
                        }
                    }

                    for &v in &m.forward_edges {
                        if !method_visited[v.index()] {
                            method_visited[v.index()] = true;
                            next_method_worklist.push(v);
                        }
                    }
                }
                method_worklist.clear();
                std::mem::swap(&mut method_worklist, &mut next_method_worklist);
                if dist_matters || method_worklist.is_empty() {
                    break;
                }
            }

            if dist_matters {
                // Clamp below the unreached sentinel.
                dist = (dist + 1).min(DIST_UNREACHED - 1);
            }

            // Typeflow phase.
            loop {
                while let Some(u) = typeflow_worklist.pop_front() {
                    if let Some(reaching) = adj.flow(u).method.reaching() {
                        if !method_visited[reaching.index()] {
                            method_visited[reaching.index()] = true;
                            method_worklist.push(reaching);
                        }
                    }

                    // One cache line; copying lets us mutate successors while
                    // walking the source's pairs (self-loops included).
                    let u_history = typeflow_visited[u.index()];

                    for &v in &adj.flow(u).forward_edges {
                        if Some(v) == adj.all_instantiated() {
                            for (t, _) in u_history.iter() {
                                if all_instantiated.insert(t) {
                                    instantiated_since_last_iteration.push(t);
                                }
                            }
                        }

                        if typeflow_visited[v.index()].is_saturated() {
                            continue;
                        }

                        let filter = self.flow_filters[v.index()];
                        let changed;

                        if !u_history.is_saturated() {
                            let target = &mut typeflow_visited[v.index()];
                            let mut any_change = false;
                            for (t, _) in u_history.iter() {
                                if !filter.contains(t) {
                                    continue;
                                }
                                any_change |= target.add_type(t, dist);
                                if target.is_saturated() {
                                    break;
                                }
                            }
                            changed = any_change;
                        } else {
                            // A saturated source stands for "everything in
                            // the instantiated set passing my filter"; its
                            // successor joins the saturation-uses list of
                            // its filter once, seeded from the current set.
                            if included_in_saturation_uses[v.index()] {
                                continue;
                            }
                            included_in_saturation_uses[v.index()] = true;

                            let target = &mut typeflow_visited[v.index()];
                            let mut any_change = false;
                            for t in filter.iter() {
                                if !all_instantiated.contains(t) {
                                    continue;
                                }
                                any_change |= target.add_type(t, dist);
                                if target.is_saturated() {
                                    break;
                                }
                            }
                            if !target.is_saturated() {
                                saturation_uses_by_filter[adj.flow(v).filter.index()].push(v);
                            }
                            changed = any_change;
                        }

                        if changed && gate_open(adj.flow(v).method, &method_history) {
                            typeflow_worklist.push_back(v);
                        }
                    }
                }

                // Replaying saturation uses is relatively costly; with
                // coalesced layers, prefer running the method phase first.
                if !dist_matters && !method_worklist.is_empty() {
                    break;
                }
                if instantiated_since_last_iteration.is_empty() {
                    break;
                }

                // Saturation propagation: replay the newly instantiated
                // types against every filter's saturation-uses list.
                let mut newly_filtered: Vec<TypeId> = Vec::new();
                for filter_id in 0..self.filter_sets.len() {
                    let uses = &mut saturation_uses_by_filter[filter_id];
                    if uses.is_empty() {
                        continue;
                    }
                    uses.retain(|&v| !typeflow_visited[v.index()].is_saturated());
                    if uses.is_empty() {
                        continue;
                    }

                    let filter = self.filter_sets[filter_id];
                    newly_filtered.clear();
                    if filter.count() <= 4 {
                        // Tiny filter: test its few members against the new
                        // instantiations rather than the other way around.
                        for t in filter.iter() {
                            if instantiated_since_last_iteration.contains(&t) {
                                newly_filtered.push(t);
                            }
                        }
                    } else {
                        for &t in &instantiated_since_last_iteration {
                            if filter.contains(t) {
                                newly_filtered.push(t);
                            }
                        }
                    }
                    if newly_filtered.is_empty() {
                        continue;
                    }

                    for idx in 0..uses.len() {
                        let v = uses[idx];
                        let target = &mut typeflow_visited[v.index()];
                        let mut changed = false;
                        for &t in &newly_filtered {
                            changed |= target.add_type(t, dist);
                            if target.is_saturated() {
                                break;
                            }
                        }
                        if changed && gate_open(adj.flow(v).method, &method_history) {
                            typeflow_worklist.push_back(v);
                        }
                    }
                }
                instantiated_since_last_iteration.clear();
            }
        }

        // Purged methods were visited only to block relaxation; externally
        // they are unreached.
        for &purged in purged_methods {
            method_visited[purged.index()] = false;
        }

        SolverResult { typeflow_visited, method_history, method_visited }
    }
}

/// Whether a typeflow may propagate: `Reaching` flows always may, a
/// `Dependent` one only once its gating method has been dequeued.
fn gate_open(role: MethodRole, method_history: &[u8]) -> bool {
    match role {
        MethodRole::Reaching(_) => true,
        MethodRole::Dependent(m) => method_history[m.index()] != DIST_UNREACHED,
    }
}

/// Feeds every type admitted by `filter` into `history` at `dist`, stopping
/// on saturation. Returns whether anything changed.
fn seed_from_filter(history: &mut TypeflowHistory, filter: TypeSet<'_>, dist: u8) -> bool {
    let mut changed = false;
    for t in filter.iter() {
        changed |= history.add_type(t, dist);
        if history.is_saturated() {
            break;
        }
    }
    changed
}

#[cfg(test)]
#[path = "tests/bfs_tests.rs"]
mod tests;
