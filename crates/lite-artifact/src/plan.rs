// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The plan container: specs, ops, constants, and the shape checker.

use crate::{LiteOp, Padding, PlanError};
use std::collections::HashMap;
use tensor_meta::{ConstTensor, DType, Dim, TensorShape};

/// Current artifact format version.
pub const FORMAT_VERSION: u16 = 1;

/// Declared descriptor for the plan's input or output tensor.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TensorSpec {
    /// Tensor name referenced by ops.
    pub name: String,
    /// Shape; spatial dimensions may be dynamic.
    pub shape: TensorShape,
    /// Element type.
    pub dtype: DType,
}

impl TensorSpec {
    pub fn new(name: impl Into<String>, shape: TensorShape, dtype: DType) -> Self {
        Self {
            name: name.into(),
            shape,
            dtype,
        }
    }
}

/// A complete inference artifact.
///
/// Ops are stored in execution order; every op's value inputs must be
/// produced earlier (or be the declared input tensor).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LitePlan {
    /// Format version; decoding rejects mismatches.
    pub version: u16,
    /// Human-readable plan name.
    pub name: String,
    /// Declared input descriptor.
    pub input: TensorSpec,
    /// Declared output descriptor.
    pub output: TensorSpec,
    /// Operations in execution order.
    pub ops: Vec<LiteOp>,
    /// Constant table (weights, biases).
    pub consts: HashMap<String, ConstTensor>,
}

impl LitePlan {
    /// Creates a plan at the current format version.
    pub fn new(
        name: impl Into<String>,
        input: TensorSpec,
        output: TensorSpec,
        ops: Vec<LiteOp>,
        consts: HashMap<String, ConstTensor>,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            name: name.into(),
            input,
            output,
            ops,
            consts,
        }
    }

    /// Serializes the plan to its MessagePack wire form.
    pub fn encode(&self) -> Result<Vec<u8>, PlanError> {
        rmp_serde::to_vec_named(self).map_err(|e| PlanError::Encode(e.to_string()))
    }

    /// Deserializes an artifact, rejecting unknown format versions.
    pub fn decode(bytes: &[u8]) -> Result<Self, PlanError> {
        let plan: Self =
            rmp_serde::from_slice(bytes).map_err(|e| PlanError::Decode(e.to_string()))?;
        if plan.version != FORMAT_VERSION {
            return Err(PlanError::Version {
                found: plan.version,
                expected: FORMAT_VERSION,
            });
        }
        Ok(plan)
    }

    /// Verifies reference integrity and propagates shapes from the declared
    /// input through every op, returning the computed output shape.
    ///
    /// Dynamic dimensions stay dynamic through shape-preserving and scaling
    /// ops, so a plan over `[1, ?, ?, 1]` inputs still checks.
    pub fn check(&self) -> Result<TensorShape, PlanError> {
        for (name, c) in &self.consts {
            if !c.is_consistent() {
                return Err(PlanError::InconsistentConstant { name: name.clone() });
            }
        }

        let mut shapes: HashMap<&str, TensorShape> = HashMap::new();
        shapes.insert(self.input.name.as_str(), self.input.shape.clone());

        for op in &self.ops {
            for tensor in op.value_inputs() {
                if !shapes.contains_key(tensor) {
                    return Err(PlanError::DanglingReference {
                        op: op.name().to_string(),
                        tensor: tensor.to_string(),
                    });
                }
            }
            for constant in op.const_refs() {
                if !self.consts.contains_key(constant) {
                    return Err(PlanError::MissingConstant {
                        op: op.name().to_string(),
                        constant: constant.to_string(),
                    });
                }
            }
            if shapes.contains_key(op.output()) {
                return Err(PlanError::DuplicateTensor {
                    op: op.name().to_string(),
                    tensor: op.output().to_string(),
                });
            }

            let out_shape = self.propagate(op, &shapes)?;
            shapes.insert(op.output(), out_shape);
        }

        let computed = shapes
            .get(self.output.name.as_str())
            .cloned()
            .ok_or_else(|| PlanError::MissingOutput {
                name: self.output.name.clone(),
            })?;

        if !compatible(&self.output.shape, &computed) {
            return Err(PlanError::OutputMismatch {
                declared: self.output.shape.to_string(),
                computed: computed.to_string(),
            });
        }
        Ok(computed)
    }

    /// Computes one op's output shape from its input shapes.
    fn propagate(
        &self,
        op: &LiteOp,
        shapes: &HashMap<&str, TensorShape>,
    ) -> Result<TensorShape, PlanError> {
        let mismatch = |detail: String| PlanError::ShapeMismatch {
            op: op.name().to_string(),
            detail,
        };

        match op {
            LiteOp::Conv2d {
                input,
                weights,
                stride,
                padding,
                ..
            } => {
                let (n, h, w, c) = nhwc(&shapes[input.as_str()])
                    .ok_or_else(|| mismatch("input is not rank-4 NHWC".into()))?;
                let wshape = &self.consts[weights.as_str()].shape;
                if wshape.len() != 4 {
                    return Err(mismatch(format!(
                        "conv weights must be rank 4, got {:?}",
                        wshape,
                    )));
                }
                let (in_c, out_c) = (wshape[2], wshape[3]);
                if let Dim::Fixed(c) = c {
                    if c != in_c {
                        return Err(mismatch(format!(
                            "input has {c} channels but weights expect {in_c}",
                        )));
                    }
                }
                let (oh, ow) = match padding {
                    Padding::Same => (dim_ceil_div(h, *stride), dim_ceil_div(w, *stride)),
                    Padding::Valid => (
                        dim_valid(h, wshape[0], *stride),
                        dim_valid(w, wshape[1], *stride),
                    ),
                };
                Ok(TensorShape::new(vec![n, oh, ow, Dim::Fixed(out_c)]))
            }
            LiteOp::Conv2dTranspose {
                input,
                weights,
                stride,
                ..
            } => {
                let (n, h, w, c) = nhwc(&shapes[input.as_str()])
                    .ok_or_else(|| mismatch("input is not rank-4 NHWC".into()))?;
                let wshape = &self.consts[weights.as_str()].shape;
                if wshape.len() != 4 {
                    return Err(mismatch(format!(
                        "transpose-conv weights must be rank 4, got {:?}",
                        wshape,
                    )));
                }
                let (out_c, in_c) = (wshape[2], wshape[3]);
                if let Dim::Fixed(c) = c {
                    if c != in_c {
                        return Err(mismatch(format!(
                            "input has {c} channels but weights expect {in_c}",
                        )));
                    }
                }
                Ok(TensorShape::new(vec![
                    n,
                    dim_mul(h, *stride),
                    dim_mul(w, *stride),
                    Dim::Fixed(out_c),
                ]))
            }
            LiteOp::BiasAdd { input, bias, .. } => {
                let shape = shapes[input.as_str()].clone();
                let blen = self.consts[bias.as_str()].num_elements();
                if let Some(Dim::Fixed(c)) = shape.dims().last().copied() {
                    if c != blen {
                        return Err(mismatch(format!(
                            "bias has {blen} elements but input has {c} channels",
                        )));
                    }
                }
                Ok(shape)
            }
            LiteOp::Add { lhs, rhs, .. } => {
                let a = &shapes[lhs.as_str()];
                let b = &shapes[rhs.as_str()];
                if a.rank() != b.rank() {
                    return Err(mismatch(format!("rank mismatch: {a} vs {b}")));
                }
                for (da, db) in a.dims().iter().zip(b.dims()) {
                    if let (Dim::Fixed(x), Dim::Fixed(y)) = (da, db) {
                        if x != y {
                            return Err(mismatch(format!("shape mismatch: {a} vs {b}")));
                        }
                    }
                }
                Ok(a.clone())
            }
            LiteOp::Relu { input, .. } => Ok(shapes[input.as_str()].clone()),
            LiteOp::MaxPool2d { input, stride, .. } => {
                let (n, h, w, c) = nhwc(&shapes[input.as_str()])
                    .ok_or_else(|| mismatch("input is not rank-4 NHWC".into()))?;
                Ok(TensorShape::new(vec![
                    n,
                    dim_ceil_div(h, *stride),
                    dim_ceil_div(w, *stride),
                    c,
                ]))
            }
        }
    }

    /// Returns a summary string describing the plan.
    pub fn summary(&self) -> String {
        let weight_elems: u64 = self.consts.values().map(|c| c.num_elements()).sum();
        format!(
            "LitePlan '{}': {} ops, {} constants ({} weight elements), {} {} -> {} {}",
            self.name,
            self.ops.len(),
            self.consts.len(),
            weight_elems,
            self.input.shape,
            self.input.dtype,
            self.output.shape,
            self.output.dtype,
        )
    }
}

/// Splits a rank-4 shape into NHWC dims.
fn nhwc(shape: &TensorShape) -> Option<(Dim, Dim, Dim, Dim)> {
    let d = shape.dims();
    if d.len() != 4 {
        return None;
    }
    Some((d[0], d[1], d[2], d[3]))
}

fn dim_ceil_div(d: Dim, s: u64) -> Dim {
    match d {
        Dim::Fixed(n) => Dim::Fixed(n.div_ceil(s)),
        Dim::Dynamic => Dim::Dynamic,
    }
}

fn dim_valid(d: Dim, k: u64, s: u64) -> Dim {
    match d {
        Dim::Fixed(n) => Dim::Fixed((n.saturating_sub(k)) / s + 1),
        Dim::Dynamic => Dim::Dynamic,
    }
}

fn dim_mul(d: Dim, s: u64) -> Dim {
    match d {
        Dim::Fixed(n) => Dim::Fixed(n * s),
        Dim::Dynamic => Dim::Dynamic,
    }
}

/// Declared-vs-computed compatibility: fixed dims must agree, a dynamic
/// dim on either side matches anything.
fn compatible(declared: &TensorShape, computed: &TensorShape) -> bool {
    declared.rank() == computed.rank()
        && declared
            .dims()
            .iter()
            .zip(computed.dims())
            .all(|(a, b)| match (a, b) {
                (Dim::Fixed(x), Dim::Fixed(y)) => x == y,
                _ => true,
            })
}
