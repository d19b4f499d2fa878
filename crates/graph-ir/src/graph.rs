// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The graph model: an ordered node sequence with derived lookups.
//!
//! Declaration order is preserved because diagnostics list "the first N
//! nodes" and classification breaks ranking ties by it — the order carries
//! no execution semantics.

use crate::{canonical_name, Node};
use std::collections::HashMap;
use std::fmt;
use tensor_meta::ConstTensor;

/// A declared computation boundary, present only in saved-model containers.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Signature {
    /// Names of the graph's declared input nodes.
    pub inputs: Vec<String>,
    /// Names of the graph's declared output nodes.
    pub outputs: Vec<String>,
}

/// An in-memory serialized computational graph.
///
/// Owned exclusively by one pipeline run; derived views such as
/// [`crate::ConnectivityIndex`] are recomputed per load, never cached
/// across reloads.
#[derive(Debug, Clone)]
pub struct GraphModel {
    /// Human-readable artifact name (file stem by default).
    pub name: String,
    nodes: Vec<Node>,
    signature: Option<Signature>,
    weights: HashMap<String, ConstTensor>,
    index: HashMap<String, usize>,
    duplicates: Vec<String>,
}

impl GraphModel {
    /// Builds a graph from parsed nodes.
    ///
    /// Duplicate names are recorded (first occurrence wins in the lookup);
    /// they are a non-fatal observation here, but endpoint binding refuses
    /// to compile through them.
    pub fn new(name: impl Into<String>, nodes: Vec<Node>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        let mut duplicates = Vec::new();
        for (i, node) in nodes.iter().enumerate() {
            if index.contains_key(node.name.as_str()) {
                tracing::warn!("duplicate node name '{}' at position {i}", node.name);
                duplicates.push(node.name.clone());
            } else {
                index.insert(node.name.clone(), i);
            }
        }
        Self {
            name: name.into(),
            nodes,
            signature: None,
            weights: HashMap::new(),
            index,
            duplicates,
        }
    }

    /// Attaches a declared signature (saved-model containers).
    pub fn with_signature(mut self, signature: Option<Signature>) -> Self {
        self.signature = signature;
        self
    }

    /// Attaches the resolved weight table (saved-model containers).
    pub fn with_weights(mut self, weights: HashMap<String, ConstTensor>) -> Self {
        self.weights = weights;
        self
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates nodes in declaration order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Looks a node up by name (first declaration wins for duplicates).
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Returns `true` when `name` resolves to a node in this graph.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns `true` when more than one node declared this name.
    pub fn is_duplicate(&self, name: &str) -> bool {
        self.duplicates.iter().any(|d| d == name)
    }

    /// Names that were declared more than once.
    pub fn duplicate_names(&self) -> &[String] {
        &self.duplicates
    }

    /// The declared signature, if the container carried one.
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Resolves a weight tensor from the container's weight file.
    pub fn weight(&self, key: &str) -> Option<&ConstTensor> {
        self.weights.get(key)
    }

    /// Input references that do not resolve to any node in this graph,
    /// as `(referrer, canonical target)` pairs. Non-fatal by design.
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for node in &self.nodes {
            for raw in &node.inputs {
                let target = canonical_name(raw);
                if !self.contains(target) {
                    out.push((node.name.clone(), target.to_string()));
                }
            }
        }
        out
    }

    /// Returns a summary string describing the graph.
    pub fn summary(&self) -> String {
        format!(
            "Graph '{}': {} nodes, signature: {}, weight tensors: {}",
            self.name,
            self.nodes.len(),
            if self.signature.is_some() { "yes" } else { "no" },
            self.weights.len(),
        )
    }
}

impl fmt::Display for GraphModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GraphModel '{}' ({} nodes):", self.name, self.nodes.len())?;
        for node in &self.nodes {
            writeln!(f, "  {}", node.summary())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> GraphModel {
        GraphModel::new(
            "chain",
            vec![
                Node::new("input", "Placeholder", vec![]),
                Node::new("conv", "Conv2D", vec!["input".into(), "w".into()]),
                Node::new("w", "Const", vec![]),
            ],
        )
    }

    #[test]
    fn test_lookup() {
        let g = chain();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.node("conv").unwrap().op, "Conv2D");
        assert!(g.node("missing").is_none());
    }

    #[test]
    fn test_duplicates_first_wins() {
        let g = GraphModel::new(
            "dup",
            vec![
                Node::new("x", "Placeholder", vec![]),
                Node::new("x", "Const", vec![]),
            ],
        );
        assert!(g.is_duplicate("x"));
        assert_eq!(g.node("x").unwrap().op, "Placeholder");
    }

    #[test]
    fn test_dangling_references() {
        let g = GraphModel::new(
            "dangle",
            vec![Node::new("a", "Relu", vec!["ghost:0".into()])],
        );
        let dangling = g.dangling_references();
        assert_eq!(dangling, vec![("a".to_string(), "ghost".to_string())]);
    }

    #[test]
    fn test_summary() {
        let g = chain();
        assert!(g.summary().contains("3 nodes"));
    }
}
