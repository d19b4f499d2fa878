// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-meta
//!
//! Shape and data-type descriptors shared by every srlite crate.
//!
//! Unlike a tensor library, this crate holds *metadata only*: there is no
//! buffer type here. Graphs arrive with partially specified shapes (a
//! serialized model may declare its spatial dimensions as "unknown"), so
//! [`TensorShape`] models each dimension as either [`Dim::Fixed`] or
//! [`Dim::Dynamic`] and provides helpers for resolving the dynamic ones
//! against configured defaults.
//!
//! - [`DType`] — numeric element type of a tensor.
//! - [`Dim`] / [`TensorShape`] — possibly-dynamic dimension list.
//! - [`ConstTensor`] — the one exception to "metadata only": a small dense
//!   payload used for graph constants and artifact weight tables.
//!
//! # Example
//! ```
//! use tensor_meta::TensorShape;
//!
//! let s = TensorShape::from_signed(&[-1, 192, 256, 1]);
//! assert_eq!(s.rank(), 4);
//! assert!(!s.is_fully_specified());
//! assert_eq!(s.resolved_with(&[1, 192, 256, 1]), Some(vec![1, 192, 256, 1]));
//! assert_eq!(format!("{s}"), "[?, 192, 256, 1]");
//! ```

mod constant;
mod dtype;
mod shape;

pub use constant::ConstTensor;
pub use dtype::DType;
pub use shape::{Dim, TensorShape};
