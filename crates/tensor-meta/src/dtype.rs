// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Numeric element types for tensors.

/// The element type of a tensor.
///
/// The validator executes plans in `F32` only; the other variants exist so
/// that artifacts can be *introspected* faithfully even when they cannot be
/// executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    F32,
    F16,
    I8,
    U8,
    I32,
    I64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
            Self::F16 => 2,
            Self::I8 | Self::U8 => 1,
            Self::I64 => 8,
        }
    }

    /// Parses a dtype from a container string.
    ///
    /// Accepts the short forms (`"f32"`) and the verbose forms serialized
    /// graphs tend to carry (`"float32"`, `"DT_FLOAT"`).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "f32" | "float" | "float32" | "dt_float" => Some(Self::F32),
            "f16" | "half" | "float16" | "dt_half" => Some(Self::F16),
            "i8" | "int8" | "dt_int8" => Some(Self::I8),
            "u8" | "uint8" | "dt_uint8" => Some(Self::U8),
            "i32" | "int32" | "dt_int32" => Some(Self::I32),
            "i64" | "int64" | "dt_int64" => Some(Self::I64),
            _ => None,
        }
    }

    /// Returns the canonical short label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::F16 => "f16",
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
