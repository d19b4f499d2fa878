// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for artifact validation.
//!
//! All of these are recoverable at the orchestrator level: a validation
//! failure sends the pipeline to the next strategy, it never aborts.

use tensor_meta::DType;

/// Reasons an artifact failed validation.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The bytes did not decode into a checkable plan.
    #[error("artifact rejected: {0}")]
    Artifact(#[from] lite_artifact::PlanError),

    /// The declared input dtype cannot be executed.
    #[error("unsupported input dtype '{0}'; the executor runs f32 only")]
    UnsupportedDType(DType),

    /// The declared input rank does not fit the NHWC executor.
    #[error("input rank {rank} unsupported; expected rank-4 NHWC")]
    UnsupportedRank { rank: usize },

    /// Dynamic input dimensions could not be filled from the defaults.
    #[error("input shape {shape} has no resolvable dimensions (defaults {defaults:?})")]
    UnresolvableShape { shape: String, defaults: Vec<u64> },

    /// The inference computation itself failed.
    #[error("execution failed at '{op}': {detail}")]
    ExecutionFailed { op: String, detail: String },

    /// The inference call exceeded its bounded timeout.
    #[error("inference exceeded {timeout_secs} s")]
    Timeout { timeout_secs: u64 },

    /// The inference worker disappeared without a result.
    #[error("inference worker terminated unexpectedly")]
    WorkerDied,
}
