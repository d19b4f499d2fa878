// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Injected keyword configuration for the classifier.
//!
//! Keyword order matters: earlier entries produce stronger ranks, so exact
//! domain terms ("input", "image") come before generic ones ("x", "data").
//! Matching is case-insensitive substring matching against node names —
//! deliberately preserved from the source heuristic, warts included.

/// Keyword lists driving source/sink classification.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClassifierConfig {
    /// Operation kinds that mark a node as an external input slot.
    #[serde(default = "default_placeholder_ops")]
    pub placeholder_ops: Vec<String>,

    /// Input-ish name keywords, strongest first.
    #[serde(default = "default_source_keywords")]
    pub source_keywords: Vec<String>,

    /// Output-ish name keywords, strongest first.
    #[serde(default = "default_sink_keywords")]
    pub sink_keywords: Vec<String>,

    /// Name fragments marking bookkeeping subgraphs that must never be
    /// proposed as the true output, however terminal they look.
    #[serde(default = "default_sink_exclusions")]
    pub sink_exclusions: Vec<String>,
}

fn default_placeholder_ops() -> Vec<String> {
    vec!["Placeholder".into(), "PlaceholderWithDefault".into()]
}

fn default_source_keywords() -> Vec<String> {
    vec!["input".into(), "image".into(), "x".into(), "data".into()]
}

fn default_sink_keywords() -> Vec<String> {
    vec!["output".into(), "result".into(), "conv".into(), "add".into()]
}

fn default_sink_exclusions() -> Vec<String> {
    vec!["save".into(), "init".into(), "iterator".into()]
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            placeholder_ops: default_placeholder_ops(),
            source_keywords: default_source_keywords(),
            sink_keywords: default_sink_keywords(),
            sink_exclusions: default_sink_exclusions(),
        }
    }
}
