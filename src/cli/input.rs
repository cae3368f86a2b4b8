//! JSON graph description and its conversion into an [`Adjacency`].
//!
//! The file format mirrors the in-memory model: `methods[0]` is the root,
//! `typeflows[0]` is the white hole. All ids are plain indices into these
//! arrays. Range errors are reported with context here, before the builder's
//! internal assertions could ever trip.
//!
//! ```json
//! {
//!   "n_types": 16,
//!   "methods": [ { "calls": [1] }, { "calls": [] } ],
//!   "typeflows": [
//!     { "edges": [1] },
//!     { "filter": [7], "role": { "reaching": 1 } }
//!   ],
//!   "all_instantiated": null
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;

use crate::bitset::Bitset;
use crate::graph::{Adjacency, AdjacencyBuilder, MethodId, MethodRole, TypeId, TypeflowId};

#[derive(Debug, Deserialize)]
pub struct GraphFile {
    pub n_types: usize,
    pub methods: Vec<MethodEntry>,
    pub typeflows: Vec<TypeflowEntry>,
    #[serde(default)]
    pub all_instantiated: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct MethodEntry {
    #[serde(default)]
    pub calls: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TypeflowEntry {
    #[serde(default)]
    pub edges: Vec<u32>,
    #[serde(default)]
    pub filter: Vec<u16>,
    /// Required for every typeflow except the white hole (index 0), where
    /// it is ignored.
    #[serde(default)]
    pub role: Option<RoleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleEntry {
    Reaching(u32),
    Dependent(u32),
}

/// Reads and converts a graph description file.
pub fn load_graph(path: &Path) -> Result<Adjacency> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    parse_graph(&text).with_context(|| format!("invalid graph file {}", path.display()))
}

/// Converts a graph description into a validated [`Adjacency`].
pub fn parse_graph(text: &str) -> Result<Adjacency> {
    let file: GraphFile = serde_json::from_str(text).context("malformed graph JSON")?;

    ensure!(!file.methods.is_empty(), "graph must declare the root method");
    ensure!(!file.typeflows.is_empty(), "graph must declare the white-hole typeflow");
    ensure!(
        file.n_types < u16::MAX as usize + 1,
        "n_types {} exceeds the supported type domain",
        file.n_types
    );

    let n_methods = file.methods.len();
    let n_flows = file.typeflows.len();

    let mut builder = AdjacencyBuilder::new(file.n_types);

    for _ in 1..n_methods {
        builder.add_method();
    }

    for (i, entry) in file.typeflows.iter().enumerate().skip(1) {
        for &t in &entry.filter {
            ensure!(
                (t as usize) < file.n_types,
                "typeflow {i}: filter type {t} out of range"
            );
        }
        let filter = Bitset::from_types(
            file.n_types,
            &entry.filter.iter().map(|&t| TypeId(t)).collect::<Vec<_>>(),
        );
        let role = match entry.role {
            Some(RoleEntry::Reaching(m)) => MethodRole::Reaching(method_id(m, n_methods, i)?),
            Some(RoleEntry::Dependent(m)) => MethodRole::Dependent(method_id(m, n_methods, i)?),
            None => bail!("typeflow {i}: missing role"),
        };
        builder.add_typeflow(filter, role);
    }

    for (i, entry) in file.methods.iter().enumerate() {
        for &callee in &entry.calls {
            ensure!(
                (callee as usize) < n_methods,
                "method {i}: call edge target {callee} out of range"
            );
            builder.add_call_edge(MethodId(i as u32), MethodId(callee));
        }
    }

    for (i, entry) in file.typeflows.iter().enumerate() {
        for &succ in &entry.edges {
            ensure!(
                (succ as usize) < n_flows,
                "typeflow {i}: flow edge target {succ} out of range"
            );
            builder.add_flow_edge(TypeflowId(i as u32), TypeflowId(succ));
        }
    }

    if let Some(sink) = file.all_instantiated {
        ensure!(
            (sink as usize) < n_flows,
            "all_instantiated typeflow {sink} out of range"
        );
        builder.set_all_instantiated(TypeflowId(sink));
    }

    Ok(builder.build())
}

fn method_id(raw: u32, n_methods: usize, flow: usize) -> Result<MethodId> {
    ensure!(
        (raw as usize) < n_methods,
        "typeflow {flow}: role method {raw} out of range"
    );
    Ok(MethodId(raw))
}
