// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # node-classifier
//!
//! Ranks candidate entry and exit nodes for a graph whose true boundary is
//! unknown, using connectivity plus naming heuristics:
//!
//! - **Sources**: placeholder-kind nodes, boosted when their name contains
//!   an input-ish keyword.
//! - **Sinks**: structurally terminal nodes (zero out-degree), excluding
//!   bookkeeping subgraphs (checkpoint/save/init/iterator names), boosted
//!   by output-ish keywords.
//!
//! The heuristic is fragile by nature — it is data-dependent string
//! matching — so it is isolated behind this crate's interface and every
//! keyword list is injected via [`ClassifierConfig`] rather than
//! hard-coded. Swapping in a stricter signature-based lookup would touch
//! nothing outside this crate.
//!
//! Classification always returns a best-effort ranked guess; the only
//! failure is an empty candidate set ([`ClassifyError::NoCandidateFound`]).
//!
//! # Example
//! ```
//! use graph_ir::{ConnectivityIndex, GraphModel, Node};
//! use node_classifier::{classify, ClassifierConfig};
//!
//! let graph = GraphModel::new("g", vec![
//!     Node::new("input_image", "Placeholder", vec![]),
//!     Node::new("final_add", "Add", vec!["input_image".into()]),
//! ]);
//! let conn = ConnectivityIndex::build(&graph);
//! let result = classify(&graph, &conn, &ClassifierConfig::default()).unwrap();
//! assert_eq!(result.top_pair().unwrap(), ("input_image", "final_add"));
//! ```

mod classify;
mod config;
mod error;

pub use classify::{classify, CandidateRank, Classification, NodeCandidate};
pub use config::ClassifierConfig;
pub use error::{ClassifyError, Role};
