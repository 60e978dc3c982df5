//! Assemble extracted edges into a lineage graph.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::traverse::Edge;

/// Fold an edge sequence into a directed graph: one node per distinct
/// identifier, one graph edge per emitted lineage edge (duplicates included,
/// matching the extraction's no-dedup contract).
pub fn dependency_graph(edges: &[Edge]) -> DiGraph<String, ()> {
    let mut graph = DiGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

    for edge in edges {
        let scope = *indices
            .entry(edge.scope.as_str())
            .or_insert_with(|| graph.add_node(edge.scope.clone()));
        let target = *indices
            .entry(edge.target.as_str())
            .or_insert_with(|| graph.add_node(edge.target.clone()));
        graph.add_edge(scope, target, ());
    }

    graph
}
