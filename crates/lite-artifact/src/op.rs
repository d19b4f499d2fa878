// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The closed operation set a lite plan may contain.
//!
//! Ops reference tensors by name: value inputs name the plan input or an
//! earlier op's output; `weights`/`bias` name entries in the plan's
//! constant table. Everything is NHWC, matching the source containers.

/// Spatial padding mode for convolutions and pooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Output spatial extent is `ceil(in / stride)`.
    Same,
    /// No implicit padding; output is `(in - k) / stride + 1`.
    Valid,
}

/// One planned operation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteOp {
    /// 2-D convolution. Weights are `[kh, kw, in_c, out_c]`.
    Conv2d {
        name: String,
        input: String,
        weights: String,
        bias: Option<String>,
        stride: u64,
        padding: Padding,
        output: String,
    },
    /// 2-D transposed convolution (the upscaling workhorse).
    /// Weights are `[kh, kw, out_c, in_c]`; output extent is `in * stride`.
    Conv2dTranspose {
        name: String,
        input: String,
        weights: String,
        bias: Option<String>,
        stride: u64,
        output: String,
    },
    /// Adds a per-channel bias vector.
    BiasAdd {
        name: String,
        input: String,
        bias: String,
        output: String,
    },
    /// Elementwise addition of two equal-shaped tensors.
    Add {
        name: String,
        lhs: String,
        rhs: String,
        output: String,
    },
    /// Rectified linear activation.
    Relu {
        name: String,
        input: String,
        output: String,
    },
    /// 2-D max pooling with `Same` padding.
    MaxPool2d {
        name: String,
        input: String,
        kernel: u64,
        stride: u64,
        output: String,
    },
}

impl LiteOp {
    /// The op's own name (diagnostics only).
    pub fn name(&self) -> &str {
        match self {
            Self::Conv2d { name, .. }
            | Self::Conv2dTranspose { name, .. }
            | Self::BiasAdd { name, .. }
            | Self::Add { name, .. }
            | Self::Relu { name, .. }
            | Self::MaxPool2d { name, .. } => name,
        }
    }

    /// The tensor this op produces.
    pub fn output(&self) -> &str {
        match self {
            Self::Conv2d { output, .. }
            | Self::Conv2dTranspose { output, .. }
            | Self::BiasAdd { output, .. }
            | Self::Add { output, .. }
            | Self::Relu { output, .. }
            | Self::MaxPool2d { output, .. } => output,
        }
    }

    /// Value-tensor inputs (not constants).
    pub fn value_inputs(&self) -> Vec<&str> {
        match self {
            Self::Conv2d { input, .. }
            | Self::Conv2dTranspose { input, .. }
            | Self::BiasAdd { input, .. }
            | Self::Relu { input, .. }
            | Self::MaxPool2d { input, .. } => vec![input],
            Self::Add { lhs, rhs, .. } => vec![lhs, rhs],
        }
    }

    /// Constant-table references (weights and biases).
    pub fn const_refs(&self) -> Vec<&str> {
        match self {
            Self::Conv2d { weights, bias, .. }
            | Self::Conv2dTranspose { weights, bias, .. } => {
                let mut refs = vec![weights.as_str()];
                if let Some(b) = bias {
                    refs.push(b.as_str());
                }
                refs
            }
            Self::BiasAdd { bias, .. } => vec![bias.as_str()],
            Self::Add { .. } | Self::Relu { .. } | Self::MaxPool2d { .. } => vec![],
        }
    }

    /// Short kind tag for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Conv2d { .. } => "conv2d",
            Self::Conv2dTranspose { .. } => "conv2d_transpose",
            Self::BiasAdd { .. } => "bias_add",
            Self::Add { .. } => "add",
            Self::Relu { .. } => "relu",
            Self::MaxPool2d { .. } => "max_pool2d",
        }
    }
}
