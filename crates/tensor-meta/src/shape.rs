// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Possibly-dynamic tensor shape descriptors.
//!
//! Serialized graphs frequently leave spatial dimensions unspecified (a
//! super-resolution network may accept any image size), so a dimension is
//! either [`Dim::Fixed`] or [`Dim::Dynamic`]. On the wire a shape is a list
//! of signed integers where `-1` marks a dynamic dimension, which is the
//! convention the source containers use.

use std::fmt;

/// A single dimension: known or left open by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Dimension left unspecified by the artifact.
    Dynamic,
    /// Dimension with a concrete extent.
    Fixed(u64),
}

impl Dim {
    /// Returns the extent if fixed.
    pub fn fixed(&self) -> Option<u64> {
        match self {
            Self::Fixed(n) => Some(*n),
            Self::Dynamic => None,
        }
    }
}

/// Describes the dimensionality of a tensor, allowing unspecified entries.
///
/// Shapes are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorShape {
    dims: Vec<Dim>,
}

impl TensorShape {
    /// Creates a shape from explicit dimensions.
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims }
    }

    /// Creates a fully specified shape.
    ///
    /// # Examples
    /// ```
    /// use tensor_meta::TensorShape;
    /// let s = TensorShape::fixed(&[1, 192, 256, 1]);
    /// assert!(s.is_fully_specified());
    /// assert_eq!(s.num_elements(), Some(49152));
    /// ```
    pub fn fixed(dims: &[u64]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Dim::Fixed(d)).collect(),
        }
    }

    /// Creates a shape from the signed wire convention: `-1` (or any
    /// negative value) marks a dynamic dimension.
    pub fn from_signed(dims: &[i64]) -> Self {
        Self {
            dims: dims
                .iter()
                .map(|&d| {
                    if d < 0 {
                        Dim::Dynamic
                    } else {
                        Dim::Fixed(d as u64)
                    }
                })
                .collect(),
        }
    }

    /// Converts back to the signed wire convention.
    pub fn to_signed(&self) -> Vec<i64> {
        self.dims
            .iter()
            .map(|d| match d {
                Dim::Dynamic => -1,
                Dim::Fixed(n) => *n as i64,
            })
            .collect()
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Returns a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<Dim> {
        self.dims.get(index).copied()
    }

    /// Returns `true` when no dimension is dynamic.
    pub fn is_fully_specified(&self) -> bool {
        self.dims.iter().all(|d| matches!(d, Dim::Fixed(_)))
    }

    /// Total number of elements, or `None` while any dimension is dynamic.
    ///
    /// A rank-0 shape has one element.
    pub fn num_elements(&self) -> Option<u64> {
        self.dims.iter().try_fold(1u64, |acc, d| match d {
            Dim::Fixed(n) => Some(acc * n),
            Dim::Dynamic => None,
        })
    }

    /// Memory footprint in bytes for the given dtype, when fully specified.
    pub fn size_bytes(&self, dtype: super::DType) -> Option<u64> {
        self.num_elements()
            .map(|n| n * dtype.size_bytes() as u64)
    }

    /// Resolves dynamic dimensions positionally against `fallback`.
    ///
    /// Returns `None` when a dynamic dimension has no fallback entry at its
    /// position. Fixed dimensions always win over the fallback.
    pub fn resolved_with(&self, fallback: &[u64]) -> Option<Vec<u64>> {
        self.dims
            .iter()
            .enumerate()
            .map(|(i, d)| match d {
                Dim::Fixed(n) => Some(*n),
                Dim::Dynamic => fallback.get(i).copied(),
            })
            .collect()
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match d {
                Dim::Dynamic => write!(f, "?")?,
                Dim::Fixed(n) => write!(f, "{n}")?,
            }
        }
        write!(f, "]")
    }
}

impl From<Vec<u64>> for TensorShape {
    fn from(dims: Vec<u64>) -> Self {
        Self::fixed(&dims)
    }
}

// On the wire a shape is the signed-integer list (`-1` = dynamic), keeping
// graph JSON and artifact payloads readable.
impl serde::Serialize for TensorShape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_signed().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for TensorShape {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let dims = Vec::<i64>::deserialize(deserializer)?;
        Ok(Self::from_signed(&dims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DType;

    #[test]
    fn test_fixed_shape() {
        let s = TensorShape::fixed(&[1, 192, 256, 1]);
        assert_eq!(s.rank(), 4);
        assert_eq!(s.num_elements(), Some(192 * 256));
        assert_eq!(s.size_bytes(DType::F32), Some(192 * 256 * 4));
        assert!(s.is_fully_specified());
    }

    #[test]
    fn test_dynamic_shape() {
        let s = TensorShape::from_signed(&[1, -1, -1, 1]);
        assert_eq!(s.rank(), 4);
        assert_eq!(s.num_elements(), None);
        assert!(!s.is_fully_specified());
        assert_eq!(s.dim(1), Some(Dim::Dynamic));
    }

    #[test]
    fn test_resolved_with() {
        let s = TensorShape::from_signed(&[1, -1, -1, 1]);
        assert_eq!(
            s.resolved_with(&[1, 192, 256, 1]),
            Some(vec![1, 192, 256, 1]),
        );

        // Fixed dims win over the fallback.
        let t = TensorShape::from_signed(&[1, 64, -1, 1]);
        assert_eq!(
            t.resolved_with(&[1, 192, 256, 1]),
            Some(vec![1, 64, 256, 1]),
        );
    }

    #[test]
    fn test_resolved_with_short_fallback() {
        let s = TensorShape::from_signed(&[-1, -1, -1, -1, -1]);
        assert_eq!(s.resolved_with(&[1, 192, 256, 1]), None);
    }

    #[test]
    fn test_scalar() {
        let s = TensorShape::fixed(&[]);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.num_elements(), Some(1));
    }

    #[test]
    fn test_display() {
        let s = TensorShape::from_signed(&[-1, 192, 256, 1]);
        assert_eq!(format!("{s}"), "[?, 192, 256, 1]");
    }

    #[test]
    fn test_serde_roundtrip() {
        let s = TensorShape::from_signed(&[1, -1, 256, 1]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "[1,-1,256,1]");
        let back: TensorShape = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
