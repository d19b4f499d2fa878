// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pipeline
//!
//! The orchestrator: owns one analysis pass over a loaded graph and drives
//! the conversion fallback chain, gating every produced artifact through
//! functional validation.
//!
//! ```text
//! Idle → AnalyzingGraph → Converting(i) → Validating(i) → Accepted
//!                              │                │
//!                              └── failure ─────┴──→ Converting(i+1) … → AllFailed
//! ```
//!
//! Failure routing follows the error taxonomy: a malformed artifact aborts
//! immediately (there is nothing to analyze); missing endpoint candidates
//! skip only the graph-derived strategies; every conversion or validation
//! failure advances the chain and is recorded with its specific cause, so
//! an `AllFailed` outcome is a list of reasons, never one opaque error.
//!
//! # Example
//! ```no_run
//! use pipeline::{Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let config = PipelineConfig::default();
//! let scale = config.expected_scale;
//! let pipeline = Pipeline::new(config);
//! let outcome = pipeline.run(Path::new("./FSRCNN_x2.graph.json"), scale).unwrap();
//! println!("{}", outcome.summary());
//! ```

mod config;
mod error;
mod orchestrator;
mod package;
mod report;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use orchestrator::{Pipeline, PipelineState};
pub use package::{AssetPackager, PackagedAsset};
pub use report::{AttemptOutcome, AttemptRecord, PipelineOutcome};
