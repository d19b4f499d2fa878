// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for artifact encoding, decoding, and plan checking.

/// Errors raised by the artifact layer.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// The plan could not be serialized.
    #[error("failed to encode plan: {0}")]
    Encode(String),

    /// The bytes are not a decodable artifact.
    #[error("failed to decode artifact: {0}")]
    Decode(String),

    /// The artifact was produced by an incompatible format version.
    #[error("unsupported artifact version {found} (expected {expected})")]
    Version { found: u16, expected: u16 },

    /// An op consumes a tensor that no earlier op (or the input) produces.
    #[error("op '{op}' references unknown tensor '{tensor}'")]
    DanglingReference { op: String, tensor: String },

    /// An op references a constant missing from the constant table.
    #[error("op '{op}' references unknown constant '{constant}'")]
    MissingConstant { op: String, constant: String },

    /// A constant's data length disagrees with its declared shape.
    #[error("constant '{name}' data length does not match its shape")]
    InconsistentConstant { name: String },

    /// Two ops produce a tensor with the same name.
    #[error("op '{op}' produces duplicate tensor '{tensor}'")]
    DuplicateTensor { op: String, tensor: String },

    /// Shape propagation failed at an op.
    #[error("op '{op}': {detail}")]
    ShapeMismatch { op: String, detail: String },

    /// The declared output tensor is never produced by any op.
    #[error("declared output '{name}' is never produced by the plan")]
    MissingOutput { name: String },

    /// The declared output shape disagrees with the propagated one.
    #[error("declared output shape {declared} incompatible with computed {computed}")]
    OutputMismatch { declared: String, computed: String },
}
