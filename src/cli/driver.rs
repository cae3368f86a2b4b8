//! Wires the CLI together: load the graph, solve, report.

use std::io;

use anyhow::{ensure, Result};
use tracing::info;

use crate::cli::args::Args;
use crate::cli::{input, reporter::Report};
use crate::graph::MethodId;
use crate::purge;
use crate::solver::Bfs;

pub fn run(args: &Args) -> Result<()> {
    let adj = {
        let _span = tracing::info_span!("load_graph", path = %args.graph.display()).entered();
        input::load_graph(&args.graph)?
    };
    info!(
        n_methods = adj.n_methods(),
        n_typeflows = adj.n_typeflows(),
        n_types = adj.n_types(),
        "graph loaded"
    );

    let purged: Vec<MethodId> = args.purge.iter().map(|&m| MethodId(m)).collect();
    for &m in &purged {
        ensure!(
            m.index() < adj.n_methods(),
            "purged method {} out of range (graph has {} methods)",
            m.0,
            adj.n_methods()
        );
    }

    let bfs = Bfs::new(&adj);
    let result = {
        let _span = tracing::info_span!("solve", distances = args.distances).entered();
        bfs.run(&purged, args.distances)
    };
    info!(
        reachable = result.reachable_method_count(),
        "reachability fixpoint complete"
    );

    let mut report = Report::new(&adj, &result, args.distances);

    if args.sweep {
        let _span = tracing::info_span!("purge_sweep").entered();
        // Sweep the explicit purge list when given, otherwise every
        // reachable method except the root.
        let baseline = if purged.is_empty() { result } else { bfs.run(&[], false) };
        let candidates: Vec<MethodId> = if purged.is_empty() {
            (1..adj.n_methods() as u32)
                .map(MethodId)
                .filter(|&m| baseline.is_method_reachable(m))
                .collect()
        } else {
            purged.clone()
        };
        info!(candidates = candidates.len(), "sweeping single-purge impacts");
        report = report.with_sweep(purge::purge_sweep(&bfs, &baseline, &candidates));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        report.write_json(&mut out)
    } else {
        report.write_text(&mut out)
    }
}
