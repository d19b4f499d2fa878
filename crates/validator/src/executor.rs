// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A reference NHWC executor for lite plans.
//!
//! Naive loops, `f32` only. This is not a production inference engine —
//! it exists so that validation can *measure* an artifact's behavior
//! (output extent, value range) instead of trusting converter metadata.
//! Plans are a few convolutions deep, so straightforward nested loops are
//! fast enough.
//!
//! Padding follows the source containers' `SAME` convention: total
//! padding `max((out-1)*s + k - in, 0)`, split top/left-light.

use crate::ValidationError;
use lite_artifact::{LiteOp, LitePlan, Padding};
use ndarray::Array4;
use std::collections::HashMap;
use tensor_meta::ConstTensor;

/// Executes a checked plan on one input batch, returning the output.
pub fn execute_plan(
    plan: &LitePlan,
    input: Array4<f32>,
) -> Result<Array4<f32>, ValidationError> {
    let mut env: HashMap<&str, Array4<f32>> = HashMap::new();
    env.insert(plan.input.name.as_str(), input);

    for op in &plan.ops {
        let out = match op {
            LiteOp::Conv2d {
                input,
                weights,
                bias,
                stride,
                padding,
                ..
            } => {
                let x = tensor(&env, op, input)?;
                let w = weight_array(op, &plan.consts[weights.as_str()])?;
                let b = bias
                    .as_ref()
                    .map(|b| plan.consts[b.as_str()].data.clone());
                conv2d(x, &w, b.as_deref(), *stride as usize, *padding)
            }
            LiteOp::Conv2dTranspose {
                input,
                weights,
                bias,
                stride,
                ..
            } => {
                let x = tensor(&env, op, input)?;
                let w = weight_array(op, &plan.consts[weights.as_str()])?;
                let b = bias
                    .as_ref()
                    .map(|b| plan.consts[b.as_str()].data.clone());
                conv2d_transpose(x, &w, b.as_deref(), *stride as usize)
            }
            LiteOp::BiasAdd { input, bias, .. } => {
                let x = tensor(&env, op, input)?;
                bias_add(x.clone(), &plan.consts[bias.as_str()].data)
            }
            LiteOp::Add { lhs, rhs, .. } => {
                let a = tensor(&env, op, lhs)?;
                let b = tensor(&env, op, rhs)?;
                if a.dim() != b.dim() {
                    return Err(ValidationError::ExecutionFailed {
                        op: op.name().to_string(),
                        detail: format!("shape mismatch: {:?} vs {:?}", a.dim(), b.dim()),
                    });
                }
                a + b
            }
            LiteOp::Relu { input, .. } => {
                tensor(&env, op, input)?.mapv(|v| v.max(0.0))
            }
            LiteOp::MaxPool2d {
                input,
                kernel,
                stride,
                ..
            } => max_pool2d(tensor(&env, op, input)?, *kernel as usize, *stride as usize),
        };
        env.insert(op.output(), out);
    }

    env.remove(plan.output.name.as_str())
        .ok_or_else(|| ValidationError::ExecutionFailed {
            op: plan.output.name.clone(),
            detail: "declared output tensor was never produced".into(),
        })
}

fn tensor<'e>(
    env: &'e HashMap<&str, Array4<f32>>,
    op: &LiteOp,
    name: &str,
) -> Result<&'e Array4<f32>, ValidationError> {
    env.get(name).ok_or_else(|| ValidationError::ExecutionFailed {
        op: op.name().to_string(),
        detail: format!("input tensor '{name}' is missing"),
    })
}

fn weight_array(op: &LiteOp, c: &ConstTensor) -> Result<Array4<f32>, ValidationError> {
    let dims: Vec<usize> = c.shape.iter().map(|&d| d as usize).collect();
    if dims.len() != 4 {
        return Err(ValidationError::ExecutionFailed {
            op: op.name().to_string(),
            detail: format!("weights must be rank 4, got {:?}", c.shape),
        });
    }
    Array4::from_shape_vec((dims[0], dims[1], dims[2], dims[3]), c.data.clone()).map_err(
        |e| ValidationError::ExecutionFailed {
            op: op.name().to_string(),
            detail: format!("weight buffer mismatch: {e}"),
        },
    )
}

/// 2-D convolution, NHWC, weights `[kh, kw, in_c, out_c]`.
fn conv2d(
    x: &Array4<f32>,
    w: &Array4<f32>,
    bias: Option<&[f32]>,
    stride: usize,
    padding: Padding,
) -> Array4<f32> {
    let (n, h, wd, _c) = x.dim();
    let (kh, kw, in_c, out_c) = w.dim();

    let (oh, ow, pad_top, pad_left) = match padding {
        Padding::Same => {
            let oh = h.div_ceil(stride);
            let ow = wd.div_ceil(stride);
            let pad_h = ((oh - 1) * stride + kh).saturating_sub(h);
            let pad_w = ((ow - 1) * stride + kw).saturating_sub(wd);
            (oh, ow, pad_h / 2, pad_w / 2)
        }
        Padding::Valid => (
            (h.saturating_sub(kh)) / stride + 1,
            (wd.saturating_sub(kw)) / stride + 1,
            0,
            0,
        ),
    };

    let mut out = Array4::<f32>::zeros((n, oh, ow, out_c));
    for b in 0..n {
        for oy in 0..oh {
            for ox in 0..ow {
                for oc in 0..out_c {
                    let mut acc = bias.map(|bv| bv[oc]).unwrap_or(0.0);
                    for ky in 0..kh {
                        let iy = (oy * stride + ky) as isize - pad_top as isize;
                        if iy < 0 || iy as usize >= h {
                            continue;
                        }
                        for kx in 0..kw {
                            let ix = (ox * stride + kx) as isize - pad_left as isize;
                            if ix < 0 || ix as usize >= wd {
                                continue;
                            }
                            for ic in 0..in_c {
                                acc += x[(b, iy as usize, ix as usize, ic)]
                                    * w[(ky, kx, ic, oc)];
                            }
                        }
                    }
                    out[(b, oy, ox, oc)] = acc;
                }
            }
        }
    }
    out
}

/// Transposed 2-D convolution, NHWC, weights `[kh, kw, out_c, in_c]`,
/// `SAME` padding: output extent is exactly `in * stride`.
fn conv2d_transpose(
    x: &Array4<f32>,
    w: &Array4<f32>,
    bias: Option<&[f32]>,
    stride: usize,
) -> Array4<f32> {
    let (n, h, wd, _c) = x.dim();
    let (kh, kw, out_c, in_c) = w.dim();
    let (oh, ow) = (h * stride, wd * stride);

    let pad_top = kh.saturating_sub(stride) / 2;
    let pad_left = kw.saturating_sub(stride) / 2;

    let mut out = Array4::<f32>::zeros((n, oh, ow, out_c));
    for b in 0..n {
        for iy in 0..h {
            for ix in 0..wd {
                for ky in 0..kh {
                    let oy = (iy * stride + ky) as isize - pad_top as isize;
                    if oy < 0 || oy as usize >= oh {
                        continue;
                    }
                    for kx in 0..kw {
                        let ox = (ix * stride + kx) as isize - pad_left as isize;
                        if ox < 0 || ox as usize >= ow {
                            continue;
                        }
                        for oc in 0..out_c {
                            for ic in 0..in_c {
                                out[(b, oy as usize, ox as usize, oc)] +=
                                    x[(b, iy, ix, ic)] * w[(ky, kx, oc, ic)];
                            }
                        }
                    }
                }
            }
        }
    }
    if let Some(bv) = bias {
        for b in 0..n {
            for oy in 0..oh {
                for ox in 0..ow {
                    for oc in 0..out_c {
                        out[(b, oy, ox, oc)] += bv[oc];
                    }
                }
            }
        }
    }
    out
}

fn bias_add(mut x: Array4<f32>, bias: &[f32]) -> Array4<f32> {
    let channels = x.dim().3;
    if bias.len() == 1 {
        // Scalar bias broadcasts over everything.
        x.mapv_inplace(|v| v + bias[0]);
        return x;
    }
    for b in 0..x.dim().0 {
        for y in 0..x.dim().1 {
            for xx in 0..x.dim().2 {
                for c in 0..channels.min(bias.len()) {
                    x[(b, y, xx, c)] += bias[c];
                }
            }
        }
    }
    x
}

/// Max pooling with `SAME`-style extent: `ceil(in / stride)`.
fn max_pool2d(x: &Array4<f32>, kernel: usize, stride: usize) -> Array4<f32> {
    let (n, h, w, c) = x.dim();
    let (oh, ow) = (h.div_ceil(stride), w.div_ceil(stride));
    let mut out = Array4::<f32>::from_elem((n, oh, ow, c), f32::NEG_INFINITY);
    for b in 0..n {
        for oy in 0..oh {
            for ox in 0..ow {
                for ch in 0..c {
                    let mut best = f32::NEG_INFINITY;
                    for ky in 0..kernel {
                        let iy = oy * stride + ky;
                        if iy >= h {
                            break;
                        }
                        for kx in 0..kernel {
                            let ix = ox * stride + kx;
                            if ix >= w {
                                break;
                            }
                            best = best.max(x[(b, iy, ix, ch)]);
                        }
                    }
                    out[(b, oy, ox, ch)] = best;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lite_artifact::TensorSpec;
    use std::collections::HashMap as Map;
    use tensor_meta::{DType, TensorShape};

    fn plan_with(
        ops: Vec<LiteOp>,
        consts: Map<String, ConstTensor>,
        output: &str,
    ) -> LitePlan {
        LitePlan::new(
            "exec-test",
            TensorSpec::new("in", TensorShape::from_signed(&[1, -1, -1, 1]), DType::F32),
            TensorSpec::new(output, TensorShape::from_signed(&[-1, -1, -1, -1]), DType::F32),
            ops,
            consts,
        )
    }

    #[test]
    fn test_identity_conv() {
        // 1x1 kernel with weight 1.0 passes the input through.
        let mut consts = Map::new();
        consts.insert(
            "w".into(),
            ConstTensor::new(vec![1, 1, 1, 1], DType::F32, vec![1.0]),
        );
        let plan = plan_with(
            vec![LiteOp::Conv2d {
                name: "conv".into(),
                input: "in".into(),
                weights: "w".into(),
                bias: None,
                stride: 1,
                padding: Padding::Same,
                output: "out".into(),
            }],
            consts,
            "out",
        );
        let input =
            Array4::from_shape_vec((1, 2, 2, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let out = execute_plan(&plan, input.clone()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_transpose_conv_doubles_extent() {
        // k == stride == 2 with all-ones weights: every output pixel gets
        // exactly one contribution, so values are preserved.
        let mut consts = Map::new();
        consts.insert(
            "w".into(),
            ConstTensor::new(vec![2, 2, 1, 1], DType::F32, vec![1.0; 4]),
        );
        let plan = plan_with(
            vec![LiteOp::Conv2dTranspose {
                name: "up".into(),
                input: "in".into(),
                weights: "w".into(),
                bias: None,
                stride: 2,
                output: "out".into(),
            }],
            consts,
            "out",
        );
        let input = Array4::from_elem((1, 2, 3, 1), 1.5);
        let out = execute_plan(&plan, input).unwrap();
        assert_eq!(out.dim(), (1, 4, 6, 1));
        assert!(out.iter().all(|&v| (v - 1.5).abs() < 1e-6));
    }

    #[test]
    fn test_relu_clamps() {
        let plan = plan_with(
            vec![LiteOp::Relu {
                name: "relu".into(),
                input: "in".into(),
                output: "out".into(),
            }],
            Map::new(),
            "out",
        );
        let input =
            Array4::from_shape_vec((1, 1, 2, 1), vec![-1.0, 2.0]).unwrap();
        let out = execute_plan(&plan, input).unwrap();
        assert_eq!(out.as_slice().unwrap(), &[0.0, 2.0]);
    }

    #[test]
    fn test_bias_add() {
        let mut consts = Map::new();
        consts.insert(
            "b".into(),
            ConstTensor::new(vec![1], DType::F32, vec![0.5]),
        );
        let plan = plan_with(
            vec![LiteOp::BiasAdd {
                name: "bias".into(),
                input: "in".into(),
                bias: "b".into(),
                output: "out".into(),
            }],
            consts,
            "out",
        );
        let input = Array4::from_elem((1, 1, 1, 1), 1.0);
        let out = execute_plan(&plan, input).unwrap();
        assert!((out[(0, 0, 0, 0)] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_max_pool() {
        let plan = plan_with(
            vec![LiteOp::MaxPool2d {
                name: "pool".into(),
                input: "in".into(),
                kernel: 2,
                stride: 2,
                output: "out".into(),
            }],
            Map::new(),
            "out",
        );
        let input = Array4::from_shape_vec(
            (1, 2, 2, 1),
            vec![1.0, 4.0, 3.0, 2.0],
        )
        .unwrap();
        let out = execute_plan(&plan, input).unwrap();
        assert_eq!(out.dim(), (1, 1, 1, 1));
        assert!((out[(0, 0, 0, 0)] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_add_shape_mismatch_fails() {
        let plan = plan_with(
            vec![
                LiteOp::MaxPool2d {
                    name: "pool".into(),
                    input: "in".into(),
                    kernel: 2,
                    stride: 2,
                    output: "small".into(),
                },
                LiteOp::Add {
                    name: "sum".into(),
                    lhs: "in".into(),
                    rhs: "small".into(),
                    output: "out".into(),
                },
            ],
            Map::new(),
            "out",
        );
        let input = Array4::from_elem((1, 4, 4, 1), 1.0);
        let err = execute_plan(&plan, input).unwrap_err();
        assert!(matches!(err, ValidationError::ExecutionFailed { .. }));
    }
}
