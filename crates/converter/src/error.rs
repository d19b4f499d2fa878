// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for conversion strategies.
//!
//! Every variant is recoverable at the orchestrator level: a failed
//! strategy advances the chain, it never aborts the pipeline.

/// Typed failure causes for a conversion attempt.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The artifact exposes no discoverable signature, so direct
    /// conversion cannot even start.
    #[error("artifact exposes no discoverable signature")]
    UnsupportedSignature,

    /// The chosen endpoint names could not be bound inside the execution
    /// engine: unresolvable or colliding names, or an unsupported op
    /// reachable between them.
    #[error("endpoint binding failed: {detail}")]
    EndpointBindingFailed { detail: String },

    /// The converter rejected an otherwise well-formed authored
    /// architecture (or failed to serialize a compiled plan).
    #[error("converter rejected the plan: {0}")]
    ConverterRejected(String),

    /// The prebuilt-artifact download failed (transport/availability).
    #[error("failed to fetch prebuilt artifact: {0}")]
    FetchFailed(String),
}
