//! Typed call graph: id handles, node kinds, and the interning builder.
//!
//! The graph is immutable once built. Methods carry call edges and the list
//! of typeflows they gate; typeflows carry flow edges, an interned filter,
//! and the method they relate to (see [`MethodRole`]). The solver borrows an
//! [`Adjacency`] for the whole run and never mutates it.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::bitset::Bitset;

/// Handle to a concrete runtime type.
///
/// 16-bit so that per-typeflow histories stay within one cache line; the top
/// value is reserved as the unused-slot sentinel ([`TypeId::NONE`]).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(transparent)]
pub struct TypeId(pub u16);

impl TypeId {
    /// Unused-slot sentinel in typeflow histories. Never a valid type.
    pub const NONE: TypeId = TypeId(u16::MAX);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a method (call-graph node).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MethodId(pub u32);

impl MethodId {
    /// The entry point. Always reachable, distance 0.
    pub const ROOT: MethodId = MethodId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a typeflow (type-propagation node).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TypeflowId(pub u32);

impl TypeflowId {
    /// The distinguished source typeflow whose successors are seeded with
    /// every type admitted by their filter.
    pub const WHITE_HOLE: TypeflowId = TypeflowId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Canonical identity of an interned filter bitset.
///
/// Two typeflows whose filters have equal content share one `FilterId`; the
/// solver keys its saturation bookkeeping on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterId(pub u32);

impl FilterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a typeflow relates to its associated method.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodRole {
    /// Whenever the typeflow gains any type, the method becomes reachable.
    Reaching(MethodId),
    /// The typeflow is silenced until the method has been reached.
    Dependent(MethodId),
}

impl MethodRole {
    /// The method woken by this typeflow, if the role is `Reaching`.
    pub fn reaching(self) -> Option<MethodId> {
        match self {
            MethodRole::Reaching(m) => Some(m),
            MethodRole::Dependent(_) => None,
        }
    }

    /// The method gating this typeflow, if the role is `Dependent`.
    pub fn dependent(self) -> Option<MethodId> {
        match self {
            MethodRole::Reaching(_) => None,
            MethodRole::Dependent(m) => Some(m),
        }
    }

    /// The associated method regardless of role.
    pub fn method(self) -> MethodId {
        match self {
            MethodRole::Reaching(m) | MethodRole::Dependent(m) => m,
        }
    }
}

/// A call-graph node.
#[derive(Clone, Debug, Default)]
pub struct MethodNode {
    /// Direct callees.
    pub forward_edges: Vec<MethodId>,
    /// Typeflows gated by this method (`MethodRole::Dependent` back-links,
    /// maintained by the builder).
    pub dependent_typeflows: Vec<TypeflowId>,
}

/// A typeflow node.
#[derive(Clone, Debug)]
pub struct TypeflowNode {
    /// Downstream typeflows.
    pub forward_edges: Vec<TypeflowId>,
    /// Interned receiver-type filter.
    pub filter: FilterId,
    /// Associated method and role.
    pub method: MethodRole,
}

/// The immutable input graph.
///
/// Method id 0 is the root; typeflow id 0 is the white hole. Structural
/// validity (every edge target in range) is checked by
/// [`AdjacencyBuilder::build`]; violating it afterwards is a programmer
/// error and panics on access.
#[derive(Clone, Debug)]
pub struct Adjacency {
    methods: Vec<MethodNode>,
    flows: Vec<TypeflowNode>,
    filters: Vec<Bitset>,
    n_types: usize,
    all_instantiated: Option<TypeflowId>,
}

impl Adjacency {
    pub fn n_methods(&self) -> usize {
        self.methods.len()
    }

    pub fn n_typeflows(&self) -> usize {
        self.flows.len()
    }

    pub fn n_types(&self) -> usize {
        self.n_types
    }

    pub fn n_filters(&self) -> usize {
        self.filters.len()
    }

    pub fn method(&self, m: MethodId) -> &MethodNode {
        &self.methods[m.index()]
    }

    pub fn flow(&self, t: TypeflowId) -> &TypeflowNode {
        &self.flows[t.index()]
    }

    pub fn filter(&self, f: FilterId) -> &Bitset {
        &self.filters[f.index()]
    }

    /// The distinguished sink whose recorded types form the global
    /// instantiated set, if the graph declares one.
    pub fn all_instantiated(&self) -> Option<TypeflowId> {
        self.all_instantiated
    }
}

/// Builds an [`Adjacency`], interning filters by content.
///
/// The root method and the white-hole typeflow exist from the start. Edges
/// may reference nodes that have not been added yet; `build` validates the
/// whole structure at once.
pub struct AdjacencyBuilder {
    methods: Vec<MethodNode>,
    flows: Vec<TypeflowNode>,
    filters: Vec<Bitset>,
    filter_index: FxHashMap<Bitset, FilterId>,
    n_types: usize,
    all_instantiated: Option<TypeflowId>,
}

impl AdjacencyBuilder {
    pub fn new(n_types: usize) -> Self {
        assert!(
            n_types < TypeId::NONE.index() + 1,
            "type domain {n_types} exceeds the u16 id space"
        );
        let mut builder = Self {
            methods: vec![MethodNode::default()],
            flows: Vec::new(),
            filters: Vec::new(),
            filter_index: FxHashMap::default(),
            n_types,
            all_instantiated: None,
        };
        // The white hole carries an empty filter and never propagates on its
        // own behalf; the role is immaterial.
        let empty = builder.intern_filter(Bitset::new(n_types));
        builder.flows.push(TypeflowNode {
            forward_edges: Vec::new(),
            filter: empty,
            method: MethodRole::Reaching(MethodId::ROOT),
        });
        builder
    }

    pub fn add_method(&mut self) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(MethodNode::default());
        id
    }

    /// Adds a typeflow with the given filter and role. A `Dependent` role
    /// also registers the flow on its gating method.
    pub fn add_typeflow(&mut self, filter: Bitset, role: MethodRole) -> TypeflowId {
        assert_eq!(
            filter.domain_size(),
            self.n_types,
            "filter domain must match the graph's type domain"
        );
        let id = TypeflowId(self.flows.len() as u32);
        let filter = self.intern_filter(filter);
        self.flows.push(TypeflowNode {
            forward_edges: Vec::new(),
            filter,
            method: role,
        });
        if let Some(m) = role.dependent() {
            self.methods[m.index()].dependent_typeflows.push(id);
        }
        id
    }

    pub fn add_call_edge(&mut self, from: MethodId, to: MethodId) {
        self.methods[from.index()].forward_edges.push(to);
    }

    pub fn add_flow_edge(&mut self, from: TypeflowId, to: TypeflowId) {
        self.flows[from.index()].forward_edges.push(to);
    }

    /// Declares `t` as the all-instantiated sink.
    pub fn set_all_instantiated(&mut self, t: TypeflowId) {
        self.all_instantiated = Some(t);
    }

    fn intern_filter(&mut self, filter: Bitset) -> FilterId {
        if let Some(&id) = self.filter_index.get(&filter) {
            return id;
        }
        let id = FilterId(self.filters.len() as u32);
        self.filters.push(filter.clone());
        self.filter_index.insert(filter, id);
        id
    }

    /// Validates the structure and freezes it. Out-of-range ids are
    /// programmer errors and panic here rather than inside the solver.
    pub fn build(self) -> Adjacency {
        let n_methods = self.methods.len();
        let n_flows = self.flows.len();
        for (i, m) in self.methods.iter().enumerate() {
            for &v in &m.forward_edges {
                assert!(v.index() < n_methods, "method {i}: call edge to {v:?} out of range");
            }
            for &v in &m.dependent_typeflows {
                assert!(v.index() < n_flows, "method {i}: dependent typeflow {v:?} out of range");
            }
        }
        for (i, f) in self.flows.iter().enumerate() {
            for &v in &f.forward_edges {
                assert!(v.index() < n_flows, "typeflow {i}: flow edge to {v:?} out of range");
            }
            assert!(
                f.method.method().index() < n_methods,
                "typeflow {i}: associated method out of range"
            );
        }
        if let Some(t) = self.all_instantiated {
            assert!(t.index() < n_flows, "all-instantiated typeflow out of range");
        }
        Adjacency {
            methods: self.methods,
            flows: self.flows,
            filters: self.filters,
            n_types: self.n_types,
            all_instantiated: self.all_instantiated,
        }
    }
}
