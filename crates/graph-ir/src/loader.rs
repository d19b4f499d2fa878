// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Graph loading from the two supported container layouts.
//!
//! - **Frozen graph**: a single JSON file holding the node list with all
//!   constants inline. No declared signature — that is what makes direct
//!   conversion fail fast on these artifacts.
//! - **Saved-model container**: a directory with `graph.json` (node list,
//!   optional signature, constants by reference) and `weights.safetensors`.
//!
//! Weight files are memory-mapped and parsed via SafeTensors; only `f32`
//! tensors are accepted since the validator executes in `f32`.

use crate::{GraphError, GraphModel, Node, Signature};
use std::collections::HashMap;
use std::path::Path;
use tensor_meta::{ConstTensor, DType};

/// Node-list file inside a saved-model directory.
const GRAPH_FILE: &str = "graph.json";

/// Weight file inside a saved-model directory.
const WEIGHTS_FILE: &str = "weights.safetensors";

/// On-disk document shape shared by both container layouts.
#[derive(Debug, serde::Deserialize)]
struct GraphDoc {
    #[serde(default)]
    name: Option<String>,
    nodes: Vec<Node>,
    #[serde(default)]
    signature: Option<Signature>,
}

/// Loads a serialized graph from disk into a [`GraphModel`].
pub struct GraphLoader;

impl GraphLoader {
    /// Loads a graph from either container layout.
    ///
    /// A directory is treated as a saved-model container, anything else as
    /// a frozen-graph file. This is a pure parse: no connectivity or
    /// endpoint validation happens here.
    pub fn load(path: &Path) -> Result<GraphModel, GraphError> {
        if path.is_dir() {
            Self::load_saved_model(path)
        } else {
            Self::load_frozen(path)
        }
    }

    /// Loads a single-file frozen graph (constants inline, no signature).
    pub fn load_frozen(path: &Path) -> Result<GraphModel, GraphError> {
        let bytes = std::fs::read(path)?;
        let doc = parse_doc(&bytes)?;
        if doc.signature.is_some() {
            tracing::warn!(
                "frozen graph '{}' carries a signature block; ignoring it",
                path.display(),
            );
        }
        let name = doc.name.unwrap_or_else(|| file_stem(path));
        tracing::debug!("loaded frozen graph '{name}' with {} nodes", doc.nodes.len());
        Ok(GraphModel::new(name, doc.nodes))
    }

    /// Loads a saved-model container directory.
    pub fn load_saved_model(dir: &Path) -> Result<GraphModel, GraphError> {
        let bytes = std::fs::read(dir.join(GRAPH_FILE))?;
        let doc = parse_doc(&bytes)?;
        let name = doc.name.unwrap_or_else(|| file_stem(dir));

        let weights_path = dir.join(WEIGHTS_FILE);
        let weights = if weights_path.exists() {
            Self::read_weights(&weights_path)?
        } else {
            tracing::warn!("saved-model container without '{WEIGHTS_FILE}'");
            HashMap::new()
        };

        tracing::debug!(
            "loaded saved-model '{name}': {} nodes, {} weight tensors",
            doc.nodes.len(),
            weights.len(),
        );
        Ok(GraphModel::new(name, doc.nodes)
            .with_signature(doc.signature)
            .with_weights(weights))
    }

    /// Reads the full weight table from a SafeTensors file.
    ///
    /// The file is memory-mapped; tensors are widened to `f32` payloads.
    fn read_weights(path: &Path) -> Result<HashMap<String, ConstTensor>, GraphError> {
        let file = std::fs::File::open(path).map_err(|e| {
            GraphError::SafeTensors(format!("cannot open '{}': {e}", path.display()))
        })?;
        let mmap = unsafe { memmap2::Mmap::map(&file) }
            .map_err(|e| GraphError::SafeTensors(format!("mmap failed: {e}")))?;
        let tensors = safetensors::SafeTensors::deserialize(&mmap)
            .map_err(|e| GraphError::SafeTensors(format!("SafeTensors parse error: {e}")))?;

        let mut weights = HashMap::new();
        for (name, view) in tensors.tensors() {
            if view.dtype() != safetensors::Dtype::F32 {
                return Err(GraphError::SafeTensors(format!(
                    "weight '{name}' has unsupported dtype {:?} (only F32 is executable)",
                    view.dtype(),
                )));
            }
            let shape: Vec<u64> = view.shape().iter().map(|&d| d as u64).collect();
            let data: Vec<f32> = view
                .data()
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            weights.insert(name.to_string(), ConstTensor::new(shape, DType::F32, data));
        }
        Ok(weights)
    }
}

/// Parses the node-list document, mapping JSON errors onto the fatal
/// malformed-artifact condition.
fn parse_doc(bytes: &[u8]) -> Result<GraphDoc, GraphError> {
    serde_json::from_slice(bytes).map_err(|e| GraphError::MalformedArtifact {
        detail: e.to_string(),
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FROZEN: &str = r#"{
        "name": "tiny",
        "nodes": [
            { "name": "input_image", "op": "Placeholder",
              "attrs": { "shape": { "shape": [1, -1, -1, 1] }, "dtype": { "dtype": "f32" } } },
            { "name": "w", "op": "Const",
              "attrs": { "value": { "tensor": { "shape": [1, 1, 1, 1], "dtype": "f32", "data": [1.0] } } } },
            { "name": "conv", "op": "Conv2D", "inputs": ["input_image", "w"] }
        ]
    }"#;

    #[test]
    fn test_load_frozen() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(FROZEN.as_bytes()).unwrap();
        let g = GraphLoader::load(f.path()).unwrap();
        assert_eq!(g.name, "tiny");
        assert_eq!(g.num_nodes(), 3);
        assert!(g.signature().is_none());
        let input = g.node("input_image").unwrap();
        assert_eq!(input.op, "Placeholder");
        assert!(!input.shape_attr().unwrap().is_fully_specified());
    }

    #[test]
    fn test_load_malformed() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{ not json").unwrap();
        let err = GraphLoader::load(f.path()).unwrap_err();
        assert!(matches!(err, GraphError::MalformedArtifact { .. }));
    }

    #[test]
    fn test_load_saved_model_without_weights() {
        let dir = tempfile::tempdir().unwrap();
        let doc = r#"{
            "nodes": [ { "name": "x", "op": "Placeholder" } ],
            "signature": { "inputs": ["x"], "outputs": ["x"] }
        }"#;
        std::fs::write(dir.path().join(GRAPH_FILE), doc).unwrap();
        let g = GraphLoader::load(dir.path()).unwrap();
        assert_eq!(g.num_nodes(), 1);
        assert_eq!(g.signature().unwrap().inputs, vec!["x"]);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = GraphLoader::load(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert!(matches!(err, GraphError::Read(_)));
    }
}
