// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Constant tensor payloads.
//!
//! Graph constants and artifact weight tables both carry small dense
//! buffers. Data is held as `f32` regardless of the declared [`DType`]:
//! the validator executes in `f32` only, and conversion happens at load
//! time.

use crate::DType;

/// A dense constant tensor with a fully specified shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConstTensor {
    /// Extent of each dimension.
    pub shape: Vec<u64>,
    /// Declared element type of the source data.
    pub dtype: DType,
    /// Element data in row-major order, widened to `f32`.
    pub data: Vec<f32>,
}

impl ConstTensor {
    /// Creates a constant, without checking data length.
    pub fn new(shape: Vec<u64>, dtype: DType, data: Vec<f32>) -> Self {
        Self { shape, dtype, data }
    }

    /// Total number of elements implied by the shape.
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product::<u64>().max(1)
    }

    /// Returns `true` when the data length matches the shape.
    pub fn is_consistent(&self) -> bool {
        self.data.len() as u64 == self.num_elements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistency() {
        let t = ConstTensor::new(vec![2, 3], DType::F32, vec![0.0; 6]);
        assert!(t.is_consistent());
        assert_eq!(t.num_elements(), 6);

        let bad = ConstTensor::new(vec![2, 3], DType::F32, vec![0.0; 5]);
        assert!(!bad.is_consistent());
    }

    #[test]
    fn test_scalar_constant() {
        let t = ConstTensor::new(vec![], DType::F32, vec![1.5]);
        assert!(t.is_consistent());
    }
}
