// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for graph loading.

/// Errors that can occur while loading a serialized graph.
///
/// Everything here is fatal to the pipeline: without a parsed node
/// sequence there is nothing to analyze.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The artifact file or directory could not be read.
    #[error("failed to read artifact: {0}")]
    Read(#[from] std::io::Error),

    /// The bytes could not be deserialized into a node sequence.
    #[error("malformed artifact: {detail}")]
    MalformedArtifact { detail: String },

    /// The saved-model weight file could not be parsed.
    #[error("failed to load SafeTensors weights: {0}")]
    SafeTensors(String),
}
