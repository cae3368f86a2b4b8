//! Result reporting: human-readable text or `--json` output.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::graph::{Adjacency, MethodId};
use crate::purge::PurgeImpact;
use crate::solver::{SolverResult, DIST_UNREACHED};

/// Machine-readable run summary.
#[derive(Debug, Serialize)]
pub struct Report {
    pub n_methods: usize,
    pub n_typeflows: usize,
    pub reachable_methods: usize,
    pub unreachable_methods: Vec<MethodId>,
    pub saturated_typeflows: usize,
    /// Per-method BFS distance; absent entries are unreached. Only present
    /// when distances were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distances: Option<Vec<Option<u8>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<Vec<PurgeImpact>>,
}

impl Report {
    pub fn new(adj: &Adjacency, result: &SolverResult, with_distances: bool) -> Self {
        let unreachable_methods = result
            .method_visited
            .iter()
            .enumerate()
            .filter(|(_, &visited)| !visited)
            .map(|(i, _)| MethodId(i as u32))
            .collect();
        let saturated_typeflows = result
            .typeflow_visited
            .iter()
            .filter(|h| h.is_saturated())
            .count();
        let distances = with_distances.then(|| {
            result
                .method_history
                .iter()
                .map(|&d| (d != DIST_UNREACHED).then_some(d))
                .collect()
        });
        Self {
            n_methods: adj.n_methods(),
            n_typeflows: adj.n_typeflows(),
            reachable_methods: result.reachable_method_count(),
            unreachable_methods,
            saturated_typeflows,
            distances,
            sweep: None,
        }
    }

    pub fn with_sweep(mut self, sweep: Vec<PurgeImpact>) -> Self {
        self.sweep = Some(sweep);
        self
    }

    pub fn write_json(&self, out: &mut impl Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }

    pub fn write_text(&self, out: &mut impl Write) -> Result<()> {
        writeln!(
            out,
            "methods: {} reachable / {} total",
            self.reachable_methods, self.n_methods
        )?;
        if !self.unreachable_methods.is_empty() {
            let ids: Vec<String> = self
                .unreachable_methods
                .iter()
                .map(|m| m.0.to_string())
                .collect();
            writeln!(out, "unreachable: {}", ids.join(", "))?;
        }
        writeln!(
            out,
            "typeflows: {} total, {} saturated",
            self.n_typeflows, self.saturated_typeflows
        )?;
        if let Some(distances) = &self.distances {
            for (i, dist) in distances.iter().enumerate() {
                if let Some(d) = dist {
                    writeln!(out, "  method {i}: distance {d}")?;
                }
            }
        }
        if let Some(sweep) = &self.sweep {
            writeln!(out, "purge sweep ({} candidates):", sweep.len())?;
            for impact in sweep {
                writeln!(
                    out,
                    "  purge {} -> {} methods lost",
                    impact.candidate.0,
                    impact.unreachable.len()
                )?;
            }
        }
        Ok(())
    }
}
