// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared CLI plumbing.

pub mod convert;
pub mod inspect;
pub mod validate;

use pipeline::PipelineConfig;
use std::path::PathBuf;

/// Initializes tracing from the `-v` count, deferring to `RUST_LOG` when
/// it is set.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Loads the pipeline config file if one was given, defaults otherwise.
pub fn load_config(path: Option<PathBuf>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(&p)
            .map_err(|e| anyhow::anyhow!("cannot load config '{}': {e}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Truncates a string for fixed-width table columns.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
