// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Out-degree analysis over a graph's input references.
//!
//! For every node, how many times does its name appear (after stripping
//! `^`/`:N` decorations) inside *other* nodes' input lists? Zero means
//! structurally terminal — the raw material for sink classification.
//!
//! Control-dependency references count: a node referenced only as `^name`
//! is still referenced, and is therefore not a sink candidate. This
//! matches the source heuristic's decoration-stripped counting.

use crate::{canonical_name, GraphModel};
use std::collections::HashMap;

/// Out-degree of every node, plus dangling-reference diagnostics.
///
/// Built once per loaded graph in a single pass over all input references
/// — O(total references), no per-node rescans. Never mutated: any graph
/// change requires a rebuild.
#[derive(Debug, Clone)]
pub struct ConnectivityIndex {
    counts: HashMap<String, usize>,
    unknown: usize,
    dangling: Vec<(String, String)>,
}

impl ConnectivityIndex {
    /// Builds the index for `graph`.
    pub fn build(graph: &GraphModel) -> Self {
        let mut counts: HashMap<String, usize> = graph
            .iter_nodes()
            .map(|n| (n.name.clone(), 0))
            .collect();
        let mut unknown = 0usize;
        let mut dangling = Vec::new();

        for node in graph.iter_nodes() {
            for raw in &node.inputs {
                let target = canonical_name(raw);
                // A node referencing itself does not contribute fan-out.
                if target == node.name {
                    continue;
                }
                match counts.get_mut(target) {
                    Some(count) => *count += 1,
                    None => {
                        unknown += 1;
                        dangling.push((node.name.clone(), target.to_string()));
                    }
                }
            }
        }

        if unknown > 0 {
            tracing::warn!(
                "{unknown} input reference(s) do not resolve to any node; \
                 first: {:?}",
                dangling.first(),
            );
        }

        Self {
            counts,
            unknown,
            dangling,
        }
    }

    /// Outgoing-reference count for `name` (0 for unknown names).
    pub fn out_degree(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// `true` when the node exists and nothing references it.
    pub fn is_terminal(&self, name: &str) -> bool {
        self.counts.get(name).is_some_and(|&c| c == 0)
    }

    /// Total references into the synthetic "unknown" bucket.
    pub fn unknown_refs(&self) -> usize {
        self.unknown
    }

    /// `(referrer, target)` pairs for references to absent nodes.
    pub fn dangling(&self) -> &[(String, String)] {
        &self.dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Node;

    #[test]
    fn test_no_cross_references_means_all_terminal() {
        let g = GraphModel::new(
            "isolated",
            vec![
                Node::new("a", "Const", vec![]),
                Node::new("b", "Const", vec![]),
                Node::new("c", "Const", vec![]),
            ],
        );
        let conn = ConnectivityIndex::build(&g);
        for node in g.iter_nodes() {
            assert_eq!(conn.out_degree(&node.name), 0);
            assert!(conn.is_terminal(&node.name));
        }
        assert_eq!(conn.unknown_refs(), 0);
    }

    #[test]
    fn test_decorated_references_are_stripped() {
        let g = GraphModel::new(
            "decorated",
            vec![
                Node::new("x", "Placeholder", vec![]),
                Node::new("a", "Relu", vec!["x:0".into()]),
                Node::new("b", "Identity", vec!["^x".into(), "a:1".into()]),
            ],
        );
        let conn = ConnectivityIndex::build(&g);
        assert_eq!(conn.out_degree("x"), 2);
        assert_eq!(conn.out_degree("a"), 1);
        assert_eq!(conn.out_degree("b"), 0);
    }

    #[test]
    fn test_unknown_bucket() {
        let g = GraphModel::new(
            "dangling",
            vec![Node::new("a", "Relu", vec!["ghost".into(), "phantom:2".into()])],
        );
        let conn = ConnectivityIndex::build(&g);
        assert_eq!(conn.unknown_refs(), 2);
        assert_eq!(conn.dangling().len(), 2);
        assert_eq!(conn.out_degree("ghost"), 0);
    }

    #[test]
    fn test_self_reference_not_counted() {
        let g = GraphModel::new(
            "selfref",
            vec![Node::new("loop", "Merge", vec!["loop:1".into()])],
        );
        let conn = ConnectivityIndex::build(&g);
        assert_eq!(conn.out_degree("loop"), 0);
        assert_eq!(conn.unknown_refs(), 0);
    }

    #[test]
    fn test_fan_out_counts_every_reference() {
        let g = GraphModel::new(
            "fanout",
            vec![
                Node::new("x", "Placeholder", vec![]),
                Node::new("a", "Add", vec!["x".into(), "x".into()]),
            ],
        );
        let conn = ConnectivityIndex::build(&g);
        // Both references count, per the single-pass reference walk.
        assert_eq!(conn.out_degree("x"), 2);
    }
}
