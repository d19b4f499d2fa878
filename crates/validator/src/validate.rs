// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The validator: decode, synthesize, execute once, measure.

use crate::{execute_plan, ValidationError, ValidationReport};
use lite_artifact::LitePlan;
use ndarray::Array4;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tensor_meta::DType;

/// Absolute tolerance on each measured scale ratio.
pub const SCALE_TOLERANCE: f64 = 0.1;

/// Knobs for the validator.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Positional fallback extents for dynamic input dimensions
    /// (batch, height, width, channels).
    pub default_input_dims: Vec<u64>,
    /// Bound on the single inference call.
    pub inference_timeout: Duration,
    /// Seed for the synthetic input, keeping repeated runs reproducible.
    pub seed: u64,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            default_input_dims: vec![1, 192, 256, 1],
            inference_timeout: Duration::from_secs(30),
            seed: 42,
        }
    }
}

/// Loads a produced artifact and verifies it functionally.
#[derive(Debug, Clone, Default)]
pub struct ArtifactValidator {
    options: ValidatorOptions,
}

impl ArtifactValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self { options }
    }

    /// Validates artifact bytes against the expected upscale factor.
    ///
    /// Runs exactly one inference. The artifact is accepted
    /// (`meets_contract`) only when both measured spatial ratios are
    /// within [`SCALE_TOLERANCE`] of `expected_scale` — completing the
    /// run is never sufficient on its own.
    pub fn validate(
        &self,
        artifact: &[u8],
        expected_scale: f64,
    ) -> Result<ValidationReport, ValidationError> {
        let plan = LitePlan::decode(artifact)?;
        plan.check()?;

        if plan.input.dtype != DType::F32 {
            return Err(ValidationError::UnsupportedDType(plan.input.dtype));
        }
        if plan.input.shape.rank() != 4 {
            return Err(ValidationError::UnsupportedRank {
                rank: plan.input.shape.rank(),
            });
        }

        let dims = plan
            .input
            .shape
            .resolved_with(&self.options.default_input_dims)
            .ok_or_else(|| ValidationError::UnresolvableShape {
                shape: plan.input.shape.to_string(),
                defaults: self.options.default_input_dims.clone(),
            })?;
        tracing::debug!("synthetic input: {:?} ({})", dims, plan.input.dtype);

        let input = self.synthetic_input(&dims);
        let input_dtype = plan.input.dtype;
        let (output, duration) = self.run_guarded(plan, input)?;

        let out_dims: Vec<u64> = output.shape().iter().map(|&d| d as u64).collect();
        let scale_h = out_dims[1] as f64 / dims[1] as f64;
        let scale_w = out_dims[2] as f64 / dims[2] as f64;
        let meets_contract = (scale_h - expected_scale).abs() <= SCALE_TOLERANCE
            && (scale_w - expected_scale).abs() <= SCALE_TOLERANCE;

        let (mut output_min, mut output_max) = (f32::INFINITY, f32::NEG_INFINITY);
        for &v in output.iter() {
            output_min = output_min.min(v);
            output_max = output_max.max(v);
        }
        if output.is_empty() {
            output_min = 0.0;
            output_max = 0.0;
        }

        let report = ValidationReport {
            input_shape: dims,
            output_shape: out_dims,
            dtype: input_dtype,
            output_min,
            output_max,
            scale_h,
            scale_w,
            inference_duration: duration,
            meets_contract,
        };
        tracing::info!("validation: {}", report.summary());
        Ok(report)
    }

    /// Uniformly distributed values in [0, 1), seeded for reproducibility.
    fn synthetic_input(&self, dims: &[u64]) -> Array4<f32> {
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        let shape = (
            dims[0] as usize,
            dims[1] as usize,
            dims[2] as usize,
            dims[3] as usize,
        );
        Array4::from_shape_simple_fn(shape, || rng.gen_range(0.0..1.0))
    }

    /// Runs the inference on a worker thread behind the bounded timeout.
    ///
    /// On timeout the worker is detached — it finishes (or not) on its
    /// own, but its interpreter state is never handed to a later attempt.
    fn run_guarded(
        &self,
        plan: LitePlan,
        input: Array4<f32>,
    ) -> Result<(Array4<f32>, Duration), ValidationError> {
        let timeout = self.options.inference_timeout;
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let started = Instant::now();
            let result = execute_plan(&plan, input).map(|out| (out, started.elapsed()));
            // The receiver may have given up on us; nothing to do then.
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(ValidationError::Timeout {
                timeout_secs: timeout.as_secs(),
            }),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ValidationError::WorkerDied),
        }
    }
}
