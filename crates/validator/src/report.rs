// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The validation report.

use std::time::Duration;
use tensor_meta::DType;

/// Everything measured during one synthetic inference.
///
/// `meets_contract` is the acceptance bit: both spatial scale ratios
/// within tolerance of the expected factor. Duration and value range are
/// informational.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ValidationReport {
    /// Concrete input extent used for the inference (defaults substituted
    /// for dynamic dimensions).
    pub input_shape: Vec<u64>,
    /// Measured output extent.
    pub output_shape: Vec<u64>,
    /// Declared element type of the artifact's input.
    pub dtype: DType,
    /// Smallest output value.
    pub output_min: f32,
    /// Largest output value.
    pub output_max: f32,
    /// Measured height ratio: output rows / input rows.
    pub scale_h: f64,
    /// Measured width ratio: output cols / input cols.
    pub scale_w: f64,
    /// Wall-clock time of the single inference call. Reporting only.
    pub inference_duration: Duration,
    /// `true` iff both axes are within tolerance of the expected scale.
    pub meets_contract: bool,
}

impl ValidationReport {
    /// Returns a summary string describing the measurement.
    pub fn summary(&self) -> String {
        format!(
            "{:?} -> {:?} ({}), scale {:.2}x/{:.2}x, range [{:.3}, {:.3}], {:.1} ms, contract: {}",
            self.input_shape,
            self.output_shape,
            self.dtype,
            self.scale_h,
            self.scale_w,
            self.output_min,
            self.output_max,
            self.inference_duration.as_secs_f64() * 1000.0,
            if self.meets_contract { "met" } else { "NOT met" },
        )
    }
}
