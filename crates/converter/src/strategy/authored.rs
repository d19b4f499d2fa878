// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Authored fallback architectures.
//!
//! When every graph-derived attempt has failed, synthesize a small
//! feed-forward upscaler from scratch and convert *that* instead. Two
//! variants are provided, tried in order by the default chain:
//!
//! - [`AuthoredNet::Compact`] — feature extraction (5×5), shrinking (1×1),
//!   four 3×3 mapping layers, expanding (1×1), and a strided
//!   transpose-conv upscale.
//! - [`AuthoredNet::Minimal`] — a simpler three-conv pipeline with the
//!   same transpose-conv upscale, for when even the compact plan is
//!   rejected.
//!
//! Weights are freshly initialized from a seeded RNG (fan-in scaled
//! uniform, zero biases), so the artifact upscales with untrained filters:
//! the contract being validated is *shape and scale*, not image quality.
//!
//! By construction this strategy cannot fail on endpoint ambiguity; its
//! only failure mode is the plan checker or encoder rejecting the authored
//! plan, reported as [`ConvertError::ConverterRejected`].

use crate::strategy::{ConversionAttempt, ConversionStrategy, EndpointPair};
use crate::ConvertError;
use graph_ir::GraphModel;
use lite_artifact::{LiteOp, LitePlan, Padding, TensorSpec};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashMap;
use tensor_meta::{ConstTensor, DType, TensorShape};

/// Which authored architecture to synthesize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthoredNet {
    /// Deeper compact upscaler (feature-extract/shrink/map/expand).
    Compact,
    /// Simpler three-conv upscaler.
    Minimal,
}

impl AuthoredNet {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Minimal => "minimal",
        }
    }

    /// `(name, kernel, out_channels)` for each conv+relu stage, plus the
    /// channel count entering the final upscale.
    fn conv_stages(&self) -> (Vec<(String, u64, u64)>, u64) {
        match self {
            Self::Compact => {
                let mut stages = vec![
                    ("feature_extract".to_string(), 5, 56),
                    ("shrinking".to_string(), 1, 12),
                ];
                for i in 1..=4 {
                    stages.push((format!("mapping_{i}"), 3, 12));
                }
                stages.push(("expanding".to_string(), 1, 56));
                (stages, 56)
            }
            Self::Minimal => (
                vec![
                    ("patch_extract".to_string(), 9, 64),
                    ("nonlinear_map".to_string(), 1, 32),
                    ("reconstruct".to_string(), 5, 1),
                ],
                1,
            ),
        }
    }
}

/// Synthesizes a fixed feed-forward upscaler and converts it.
#[derive(Debug, Clone)]
pub struct AuthoredStrategy {
    net: AuthoredNet,
    name: String,
    input_hw: (u64, u64),
    scale: u64,
    seed: u64,
}

impl AuthoredStrategy {
    /// Creates an authored strategy with a fixed input resolution
    /// (`(height, width)`), upscale factor, and weight seed.
    pub fn new(net: AuthoredNet, input_hw: (u64, u64), scale: u64, seed: u64) -> Self {
        Self {
            net,
            name: format!("authored-{}", net.as_str()),
            input_hw,
            scale,
            seed,
        }
    }

    /// Builds the plan for this architecture.
    pub fn build_plan(&self) -> Result<LitePlan, ConvertError> {
        let (h, w) = self.input_hw;
        if h == 0 || w == 0 || self.scale == 0 {
            return Err(ConvertError::ConverterRejected(format!(
                "degenerate authored geometry: {h}x{w} @ x{}",
                self.scale,
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut consts: HashMap<String, ConstTensor> = HashMap::new();
        let mut ops: Vec<LiteOp> = Vec::new();

        let mut prev_tensor = "input_image".to_string();
        let mut prev_channels = 1u64;

        let (stages, upscale_in_c) = self.net.conv_stages();
        for (stage, kernel, out_c) in &stages {
            let weights_key = format!("{stage}/weights");
            let bias_key = format!("{stage}/bias");
            consts.insert(
                weights_key.clone(),
                init_conv_weights(&mut rng, *kernel, prev_channels, *out_c),
            );
            consts.insert(bias_key.clone(), zero_bias(*out_c));

            ops.push(LiteOp::Conv2d {
                name: stage.clone(),
                input: prev_tensor.clone(),
                weights: weights_key,
                bias: Some(bias_key),
                stride: 1,
                padding: Padding::Same,
                output: stage.clone(),
            });
            ops.push(LiteOp::Relu {
                name: format!("{stage}/relu"),
                input: stage.clone(),
                output: format!("{stage}_act"),
            });
            prev_tensor = format!("{stage}_act");
            prev_channels = *out_c;
        }
        debug_assert_eq!(prev_channels, upscale_in_c);

        consts.insert(
            "upscale/weights".to_string(),
            init_deconv_weights(&mut rng, 9, 1, upscale_in_c),
        );
        ops.push(LiteOp::Conv2dTranspose {
            name: "upscale".to_string(),
            input: prev_tensor,
            weights: "upscale/weights".to_string(),
            bias: None,
            stride: self.scale,
            output: "upscale".to_string(),
        });

        let plan = LitePlan::new(
            format!("authored_{}_x{}", self.net.as_str(), self.scale),
            TensorSpec::new(
                "input_image",
                TensorShape::fixed(&[1, h, w, 1]),
                DType::F32,
            ),
            TensorSpec::new(
                "upscale",
                TensorShape::fixed(&[1, h * self.scale, w * self.scale, 1]),
                DType::F32,
            ),
            ops,
            consts,
        );

        plan.check()
            .map_err(|e| ConvertError::ConverterRejected(e.to_string()))?;
        Ok(plan)
    }

    fn convert(&self) -> Result<Vec<u8>, ConvertError> {
        tracing::info!(
            "authoring {} upscaler: {}x{} -> x{}",
            self.net.as_str(),
            self.input_hw.0,
            self.input_hw.1,
            self.scale,
        );
        let plan = self.build_plan()?;
        plan.encode()
            .map_err(|e| ConvertError::ConverterRejected(e.to_string()))
    }
}

impl ConversionStrategy for AuthoredStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(
        &self,
        _graph: Option<&GraphModel>,
        _endpoints: Option<&EndpointPair>,
    ) -> ConversionAttempt {
        ConversionAttempt::from_result(self.convert())
    }
}

/// Fan-in scaled uniform init for `[k, k, in_c, out_c]` conv weights.
fn init_conv_weights(rng: &mut StdRng, k: u64, in_c: u64, out_c: u64) -> ConstTensor {
    let bound = 1.0 / ((k * k * in_c) as f32).sqrt();
    let len = (k * k * in_c * out_c) as usize;
    let data: Vec<f32> = (0..len).map(|_| rng.gen_range(-bound..bound)).collect();
    ConstTensor::new(vec![k, k, in_c, out_c], DType::F32, data)
}

/// Transpose-conv weights are `[k, k, out_c, in_c]`.
fn init_deconv_weights(rng: &mut StdRng, k: u64, out_c: u64, in_c: u64) -> ConstTensor {
    let bound = 1.0 / ((k * k * in_c) as f32).sqrt();
    let len = (k * k * out_c * in_c) as usize;
    let data: Vec<f32> = (0..len).map(|_| rng.gen_range(-bound..bound)).collect();
    ConstTensor::new(vec![k, k, out_c, in_c], DType::F32, data)
}

fn zero_bias(channels: u64) -> ConstTensor {
    ConstTensor::new(vec![channels], DType::F32, vec![0.0; channels as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_meta::Dim;

    #[test]
    fn test_compact_plan_checks_and_scales() {
        let strategy = AuthoredStrategy::new(AuthoredNet::Compact, (192, 256), 2, 42);
        let plan = strategy.build_plan().unwrap();
        let out = plan.check().unwrap();
        assert_eq!(out.dims()[1], Dim::Fixed(384));
        assert_eq!(out.dims()[2], Dim::Fixed(512));
        assert_eq!(out.dims()[3], Dim::Fixed(1));
        // Conv stages + relus + the upscale.
        assert_eq!(plan.ops.len(), 7 * 2 + 1);
    }

    #[test]
    fn test_minimal_plan_checks() {
        let strategy = AuthoredStrategy::new(AuthoredNet::Minimal, (48, 64), 3, 7);
        let plan = strategy.build_plan().unwrap();
        let out = plan.check().unwrap();
        assert_eq!(out.dims()[1], Dim::Fixed(144));
        assert_eq!(out.dims()[2], Dim::Fixed(192));
    }

    #[test]
    fn test_seeded_weights_are_deterministic() {
        let a = AuthoredStrategy::new(AuthoredNet::Minimal, (48, 64), 2, 42)
            .build_plan()
            .unwrap();
        let b = AuthoredStrategy::new(AuthoredNet::Minimal, (48, 64), 2, 42)
            .build_plan()
            .unwrap();
        assert_eq!(
            a.consts["patch_extract/weights"].data,
            b.consts["patch_extract/weights"].data,
        );
    }

    #[test]
    fn test_degenerate_geometry_is_rejected_typed() {
        let strategy = AuthoredStrategy::new(AuthoredNet::Compact, (0, 256), 2, 42);
        let attempt = strategy.attempt(None, None);
        assert!(matches!(
            attempt,
            ConversionAttempt::Failure(ConvertError::ConverterRejected(_)),
        ));
    }

    #[test]
    fn test_attempt_ignores_graph() {
        let strategy = AuthoredStrategy::new(AuthoredNet::Minimal, (24, 32), 2, 1);
        assert!(strategy.attempt(None, None).is_success());
        assert!(!strategy.needs_graph());
    }
}
