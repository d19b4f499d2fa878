// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph nodes and their attribute values.
//!
//! A node's input references carry two kinds of decoration inherited from
//! the source container:
//!
//! - a leading `^` marks a control dependency (`"^init_op"`),
//! - a trailing `:N` selects an output slot (`"conv1:1"`).
//!
//! Connectivity analysis works on *canonical* names with both decorations
//! stripped; see [`canonical_name`].

use std::collections::BTreeMap;
use tensor_meta::{ConstTensor, DType, TensorShape};

/// A single attribute value attached to a node.
///
/// Closed set: containers only ever carry these forms. Shape and dtype
/// attributes matter for placeholder introspection; tensor payloads carry
/// graph constants (inline for frozen graphs, by reference into the
/// SafeTensors file for saved-model containers).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Shape(TensorShape),
    #[serde(rename = "dtype")]
    DType(DType),
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
    Tensor(ConstTensor),
    TensorRef(String),
}

/// One node of a serialized computational graph. Immutable once parsed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Node {
    /// Unique identity within the graph.
    pub name: String,
    /// Operation kind tag, e.g. `"Placeholder"`, `"Conv2D"`, `"Add"`.
    pub op: String,
    /// Ordered input references, possibly decorated.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Attribute map. Ordered so diagnostics print deterministically.
    #[serde(default)]
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Node {
    /// Creates a node with no attributes.
    pub fn new(name: impl Into<String>, op: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            op: op.into(),
            inputs,
            attrs: BTreeMap::new(),
        }
    }

    /// Adds an attribute (builder style, used heavily by tests and the
    /// authored-architecture builder).
    pub fn with_attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// Looks up an attribute by name.
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// The declared shape, when this node carries a `shape` attribute.
    pub fn shape_attr(&self) -> Option<&TensorShape> {
        match self.attr("shape") {
            Some(AttrValue::Shape(s)) => Some(s),
            _ => None,
        }
    }

    /// The declared dtype, when this node carries a `dtype` attribute.
    pub fn dtype_attr(&self) -> Option<DType> {
        match self.attr("dtype") {
            Some(AttrValue::DType(d)) => Some(*d),
            _ => None,
        }
    }

    /// Iterates over the canonical names of data inputs, skipping control
    /// dependencies.
    pub fn data_inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .iter()
            .filter(|i| !is_control_input(i))
            .map(|i| canonical_name(i))
    }

    /// One-line description for diagnostic listings.
    pub fn summary(&self) -> String {
        format!("{} ({}) <- {:?}", self.name, self.op, self.inputs)
    }
}

/// Returns `true` for control-dependency references (`"^name"`).
pub fn is_control_input(reference: &str) -> bool {
    reference.starts_with('^')
}

/// Strips control (`^`) and output-slot (`:N`) decorations from an input
/// reference, yielding the referenced node's name.
pub fn canonical_name(reference: &str) -> &str {
    let name = reference.strip_prefix('^').unwrap_or(reference);
    match name.rsplit_once(':') {
        Some((base, slot)) if !slot.is_empty() && slot.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("conv1"), "conv1");
        assert_eq!(canonical_name("conv1:0"), "conv1");
        assert_eq!(canonical_name("conv1:12"), "conv1");
        assert_eq!(canonical_name("^init"), "init");
        assert_eq!(canonical_name("^queue:1"), "queue");
        // A colon with a non-numeric suffix is part of the name.
        assert_eq!(canonical_name("scope:weird"), "scope:weird");
    }

    #[test]
    fn test_is_control_input() {
        assert!(is_control_input("^init"));
        assert!(!is_control_input("conv1:0"));
    }

    #[test]
    fn test_data_inputs_skip_control() {
        let n = Node::new(
            "add",
            "Add",
            vec!["a:0".into(), "^ctrl".into(), "b".into()],
        );
        let data: Vec<&str> = n.data_inputs().collect();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[test]
    fn test_attrs() {
        let n = Node::new("x", "Placeholder", vec![])
            .with_attr("dtype", AttrValue::DType(tensor_meta::DType::F32))
            .with_attr(
                "shape",
                AttrValue::Shape(tensor_meta::TensorShape::from_signed(&[1, -1, -1, 1])),
            );
        assert_eq!(n.dtype_attr(), Some(tensor_meta::DType::F32));
        assert_eq!(n.shape_attr().unwrap().rank(), 4);
    }

    #[test]
    fn test_json_roundtrip() {
        let n = Node::new("x", "Placeholder", vec!["^ctrl".into()])
            .with_attr("dtype", AttrValue::DType(tensor_meta::DType::F32));
        let json = serde_json::to_string(&n).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "x");
        assert_eq!(back.op, "Placeholder");
        assert_eq!(back.inputs, vec!["^ctrl"]);
    }
}
