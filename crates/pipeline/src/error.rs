// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the pipeline crate.
//!
//! Strategy and validation failures are *not* errors here — they are
//! recorded attempt outcomes. What remains is the genuinely fatal: a graph
//! that cannot be parsed, a broken configuration, or I/O around packaging.

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input artifact could not be loaded (including the fatal
    /// malformed-artifact condition).
    #[error("graph loading failed: {0}")]
    Graph(#[from] graph_ir::GraphError),

    /// The pipeline configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing the accepted artifact or packaged assets failed.
    #[error("asset I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
