// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # validator
//!
//! Functional validation of produced artifacts. A conversion that "ran
//! without throwing" proves nothing — acceptance requires:
//!
//! 1. the artifact decodes and its plan checks,
//! 2. a synthetic uniform-[0,1] input (dynamic dimensions filled from
//!    configured defaults) runs through exactly one inference,
//! 3. the measured output/input spatial ratios sit within ±0.1 of the
//!    expected scale on **both** axes.
//!
//! The inference runs on a worker thread behind a bounded timeout, since a
//! plan of pathological size is the one external-ish resource this crate
//! touches. Wall-clock duration and the output value range are recorded
//! for reporting only — they are not correctness criteria.

mod error;
mod executor;
mod report;
mod validate;

pub use error::ValidationError;
pub use executor::execute_plan;
pub use report::ValidationReport;
pub use validate::{ArtifactValidator, ValidatorOptions, SCALE_TOLERANCE};
