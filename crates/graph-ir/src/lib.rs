// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # graph-ir
//!
//! An in-memory representation of serialized computational graphs, parsed
//! without ever executing them.
//!
//! - [`Node`] — one graph node: name, operation kind, input references,
//!   attribute map. Immutable once parsed.
//! - [`GraphModel`] — the ordered node sequence plus an optional declared
//!   signature and a resolved weight table.
//! - [`GraphLoader`] — loads the two supported container layouts: a single
//!   frozen-graph JSON file (constants inline) or a saved-model directory
//!   (`graph.json` + `weights.safetensors`).
//! - [`ConnectivityIndex`] — out-degree of every node, built in one pass.
//!
//! Parsing is deliberately shallow: the only fatal condition is bytes that
//! cannot be deserialized into a node sequence. Dangling input references
//! and duplicate node names are recorded as observations — deciding what
//! they *mean* is the classifier's and converter's job.
//!
//! # Example
//! ```no_run
//! use graph_ir::{ConnectivityIndex, GraphLoader};
//! use std::path::Path;
//!
//! let graph = GraphLoader::load(Path::new("./FSRCNN_x2.graph.json")).unwrap();
//! println!("{}", graph.summary());
//! let conn = ConnectivityIndex::build(&graph);
//! for node in graph.iter_nodes().take(10) {
//!     println!("  {} ({}) - out: {}", node.name, node.op, conn.out_degree(&node.name));
//! }
//! ```

mod connectivity;
mod error;
pub mod graph;
mod loader;
mod node;

pub use connectivity::ConnectivityIndex;
pub use error::GraphError;
pub use graph::{GraphModel, Signature};
pub use loader::GraphLoader;
pub use node::{canonical_name, is_control_input, AttrValue, Node};
