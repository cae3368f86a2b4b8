use super::*;
use crate::bitset::Bitset;
use crate::graph::AdjacencyBuilder;

fn t(id: u16) -> TypeId {
    TypeId(id)
}

fn types(history: &TypeflowHistory) -> Vec<TypeId> {
    let mut out: Vec<TypeId> = history.iter().map(|(ty, _)| ty).collect();
    out.sort();
    out
}

#[test]
fn root_only_graph_terminates() {
    let adj = AdjacencyBuilder::new(4).build();
    let result = Bfs::new(&adj).run(&[], true);
    assert_eq!(result.method_visited, vec![true]);
    assert_eq!(result.method_history, vec![0]);
    assert!(!result.history(TypeflowId::WHITE_HOLE).any());
}

#[test]
fn reaching_flow_wakes_its_method() {
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let t1 = b.add_typeflow(Bitset::from_types(16, &[t(7)]), MethodRole::Reaching(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, t1);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], true);
    assert!(result.is_method_reachable(m1));
    assert_eq!(result.history(t1).iter().collect::<Vec<_>>(), vec![(t(7), 0)]);
}

#[test]
fn dependent_whitehole_successor_stays_empty_until_method_reached() {
    // No call edge to m1: the white-hole seed must never materialize.
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let t1 = b.add_typeflow(Bitset::from_types(16, &[t(7)]), MethodRole::Dependent(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, t1);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], true);
    assert!(!result.is_method_reachable(m1));
    assert!(!result.history(t1).any());
}

#[test]
fn dependent_whitehole_successor_is_seeded_when_method_arrives() {
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let m2 = b.add_method();
    b.add_call_edge(MethodId::ROOT, m1);
    let t1 = b.add_typeflow(Bitset::from_types(16, &[t(7)]), MethodRole::Dependent(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, t1);
    // Downstream of the gated flow, so we can see it propagate once open.
    let t2 = b.add_typeflow(Bitset::full(16), MethodRole::Reaching(m2));
    b.add_flow_edge(t1, t2);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], true);
    assert!(result.is_method_reachable(m1));
    assert!(result.is_method_reachable(m2));
    // Seeded at the distance m1 was dequeued, not at 0.
    assert_eq!(result.history(t1).iter().collect::<Vec<_>>(), vec![(t(7), 1)]);
    assert_eq!(types(result.history(t2)), vec![t(7)]);
}

#[test]
fn dependent_on_root_is_seeded_immediately() {
    let mut b = AdjacencyBuilder::new(16);
    let t1 = b.add_typeflow(
        Bitset::from_types(16, &[t(3)]),
        MethodRole::Dependent(MethodId::ROOT),
    );
    b.add_flow_edge(TypeflowId::WHITE_HOLE, t1);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], true);
    assert_eq!(result.history(t1).iter().collect::<Vec<_>>(), vec![(t(3), 0)]);
}

#[test]
fn filters_restrict_propagation() {
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let m2 = b.add_method();
    let src = b.add_typeflow(Bitset::from_types(16, &[t(1), t(2), t(3)]), MethodRole::Reaching(m1));
    let narrow = b.add_typeflow(Bitset::from_types(16, &[t(2)]), MethodRole::Reaching(m2));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, src);
    b.add_flow_edge(src, narrow);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], false);
    assert_eq!(types(result.history(src)), vec![t(1), t(2), t(3)]);
    assert_eq!(types(result.history(narrow)), vec![t(2)]);
}

#[test]
fn gated_flow_records_but_does_not_propagate() {
    // src feeds a dependent flow whose method is never reached; the types
    // accumulate there but must not travel further.
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let dead = b.add_method();
    let m3 = b.add_method();
    let src = b.add_typeflow(Bitset::from_types(16, &[t(1)]), MethodRole::Reaching(m1));
    let gated = b.add_typeflow(Bitset::full(16), MethodRole::Dependent(dead));
    let sink = b.add_typeflow(Bitset::full(16), MethodRole::Reaching(m3));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, src);
    b.add_flow_edge(src, gated);
    b.add_flow_edge(gated, sink);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], false);
    assert!(result.history(gated).any());
    assert!(!result.history(sink).any());
    assert!(!result.is_method_reachable(dead));
    assert!(!result.is_method_reachable(m3));
}

#[test]
fn self_loop_is_harmless() {
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let t1 = b.add_typeflow(Bitset::from_types(16, &[t(4)]), MethodRole::Reaching(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, t1);
    b.add_flow_edge(t1, t1);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], false);
    assert_eq!(result.history(t1).iter().collect::<Vec<_>>(), vec![(t(4), 0)]);
}

#[test]
fn saturated_source_feeds_successor_through_instantiated_set() {
    let n_types = 64;
    let mut b = AdjacencyBuilder::new(n_types);
    let m1 = b.add_method();
    let m2 = b.add_method();

    // 25 admissible types saturate the source at seeding time.
    let wide: Vec<TypeId> = (0..25).map(t).collect();
    let src = b.add_typeflow(Bitset::from_types(n_types, &wide), MethodRole::Reaching(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, src);

    let sink_all = b.add_typeflow(Bitset::full(n_types), MethodRole::Dependent(MethodId::ROOT));
    b.set_all_instantiated(sink_all);
    b.add_flow_edge(src, sink_all);

    let succ = b.add_typeflow(Bitset::full(n_types), MethodRole::Reaching(m2));
    b.add_flow_edge(src, succ);

    let adj = b.build();
    let result = Bfs::new(&adj).run(&[], false);

    assert!(result.history(src).is_saturated());
    // Only the 20 recorded types made it into the instantiated set; the
    // successor sees exactly those.
    assert_eq!(types(result.history(succ)), (0..20).map(t).collect::<Vec<_>>());
    assert!(result.is_method_reachable(m1));
    assert!(result.is_method_reachable(m2));
}

#[test]
fn instantiated_growth_is_replayed_onto_saturation_uses() {
    let n_types = 64;
    let mut b = AdjacencyBuilder::new(n_types);
    let m1 = b.add_method();
    let m2 = b.add_method();
    let m3 = b.add_method();

    let wide: Vec<TypeId> = (0..25).map(t).collect();
    let src = b.add_typeflow(Bitset::from_types(n_types, &wide), MethodRole::Reaching(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, src);

    let sink_all = b.add_typeflow(Bitset::full(n_types), MethodRole::Dependent(MethodId::ROOT));
    b.set_all_instantiated(sink_all);
    b.add_flow_edge(src, sink_all);

    // Joins the saturation-uses list of the full filter with 20 seed types.
    let succ = b.add_typeflow(Bitset::full(n_types), MethodRole::Reaching(m2));
    b.add_flow_edge(src, succ);

    // A later instantiation of type 40 must be replayed onto `succ`.
    let late = b.add_typeflow(Bitset::from_types(n_types, &[t(40)]), MethodRole::Reaching(m3));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, late);
    b.add_flow_edge(late, sink_all);

    let adj = b.build();
    let result = Bfs::new(&adj).run(&[], false);

    assert!(result.history(src).is_saturated());
    // 20 seeded types + the late 21st growth saturate the successor too.
    assert!(result.history(succ).is_saturated());
    assert!(result.is_method_reachable(m2));
    assert!(result.is_method_reachable(m3));
}

#[test]
fn small_filter_replay_path_delivers_the_delta() {
    let n_types = 64;
    let mut b = AdjacencyBuilder::new(n_types);
    let m1 = b.add_method();
    let m2 = b.add_method();
    let m3 = b.add_method();

    let wide: Vec<TypeId> = (0..25).map(t).collect();
    let src = b.add_typeflow(Bitset::from_types(n_types, &wide), MethodRole::Reaching(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, src);

    let sink_all = b.add_typeflow(Bitset::full(n_types), MethodRole::Dependent(MethodId::ROOT));
    b.set_all_instantiated(sink_all);
    b.add_flow_edge(src, sink_all);

    // A two-type filter (count <= 4) takes the filter-first replay path.
    // Type 40 is not among src's 20 recorded seed types, so it can only
    // arrive through delta replay.
    let succ = b.add_typeflow(Bitset::from_types(n_types, &[t(0), t(40)]), MethodRole::Reaching(m2));
    b.add_flow_edge(src, succ);

    let late = b.add_typeflow(Bitset::from_types(n_types, &[t(40)]), MethodRole::Reaching(m3));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, late);
    b.add_flow_edge(late, sink_all);

    let adj = b.build();
    let result = Bfs::new(&adj).run(&[], false);

    assert_eq!(types(result.history(succ)), vec![t(0), t(40)]);
}

#[test]
fn purged_methods_report_unreachable_but_types_still_flow() {
    let mut b = AdjacencyBuilder::new(16);
    let m1 = b.add_method();
    let t1 = b.add_typeflow(Bitset::from_types(16, &[t(7)]), MethodRole::Reaching(m1));
    b.add_flow_edge(TypeflowId::WHITE_HOLE, t1);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[m1], true);
    assert!(!result.is_method_reachable(m1));
    assert_eq!(result.method_distance(m1), None);
    assert_eq!(result.history(t1).iter().collect::<Vec<_>>(), vec![(t(7), 0)]);
}

#[test]
fn purge_blocks_relaxation_through_the_purged_method() {
    // root -> a -> b; purging a must unreach b as well.
    let mut b = AdjacencyBuilder::new(4);
    let a = b.add_method();
    let c = b.add_method();
    b.add_call_edge(MethodId::ROOT, a);
    b.add_call_edge(a, c);
    let adj = b.build();

    let baseline = Bfs::new(&adj).run(&[], false);
    assert!(baseline.is_method_reachable(c));

    let purged = Bfs::new(&adj).run(&[a], false);
    assert!(!purged.is_method_reachable(a));
    assert!(!purged.is_method_reachable(c));
}

#[test]
fn distances_follow_bfs_layers() {
    let mut b = AdjacencyBuilder::new(4);
    let m1 = b.add_method();
    let m2 = b.add_method();
    let m3 = b.add_method();
    b.add_call_edge(MethodId::ROOT, m1);
    b.add_call_edge(m1, m2);
    b.add_call_edge(m2, m3);
    // A shortcut must not inflate m2's distance.
    b.add_call_edge(MethodId::ROOT, m2);
    let adj = b.build();

    let result = Bfs::new(&adj).run(&[], true);
    assert_eq!(result.method_history, vec![0, 1, 1, 2]);

    let flat = Bfs::new(&adj).run(&[], false);
    assert_eq!(flat.method_history, vec![0, 0, 0, 0]);
    assert_eq!(flat.method_visited, result.method_visited);
}
