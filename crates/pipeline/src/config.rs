// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pipeline configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! expected_scale = 2.0
//! authored_height = 192
//! authored_width = 256
//! default_input_dims = [1, 192, 256, 1]
//! fallback_url = "https://github.com/dkafetzis/srlite-models/releases/download/v1/sr_x2_backup.srl"
//! fetch_timeout_secs = 30
//! inference_timeout_secs = 30
//! seed = 42
//!
//! [classifier]
//! source_keywords = ["input", "image", "x", "data"]
//! sink_exclusions = ["save", "init", "iterator"]
//! ```

use converter::{
    AuthoredNet, AuthoredStrategy, ConversionStrategy, DirectConversion, FrozenEndpoints,
    PrebuiltFetch,
};
use node_classifier::ClassifierConfig;
use std::path::Path;
use std::time::Duration;
use validator::ValidatorOptions;

/// Known-good prebuilt artifact used by the last-resort fetch strategy.
const DEFAULT_FALLBACK_URL: &str =
    "https://github.com/dkafetzis/srlite-models/releases/download/v1/sr_x2_backup.srl";

/// Configuration for one pipeline run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PipelineConfig {
    /// Expected output/input spatial ratio on both axes.
    #[serde(default = "default_scale")]
    pub expected_scale: f64,

    /// Fixed input height for authored fallback architectures.
    #[serde(default = "default_height")]
    pub authored_height: u64,

    /// Fixed input width for authored fallback architectures.
    #[serde(default = "default_width")]
    pub authored_width: u64,

    /// Fallback extents for dynamic input dimensions during validation
    /// (batch, height, width, channels).
    #[serde(default = "default_input_dims")]
    pub default_input_dims: Vec<u64>,

    /// URL of the known-good prebuilt artifact.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Bound on the prebuilt-artifact download.
    #[serde(default = "default_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Bound on the validation inference call.
    #[serde(default = "default_timeout_secs")]
    pub inference_timeout_secs: u64,

    /// Seed for authored weights and synthetic validation inputs.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Keyword lists injected into the node classifier.
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

fn default_scale() -> f64 {
    2.0
}
fn default_height() -> u64 {
    192
}
fn default_width() -> u64 {
    256
}
fn default_input_dims() -> Vec<u64> {
    vec![1, 192, 256, 1]
}
fn default_fallback_url() -> String {
    DEFAULT_FALLBACK_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_seed() -> u64 {
    42
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            expected_scale: default_scale(),
            authored_height: default_height(),
            authored_width: default_width(),
            default_input_dims: default_input_dims(),
            fallback_url: default_fallback_url(),
            fetch_timeout_secs: default_timeout_secs(),
            inference_timeout_secs: default_timeout_secs(),
            seed: default_seed(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::PipelineError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| super::PipelineError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::PipelineError::Config(format!("TOML serialise error: {e}")))
    }

    /// The upscale factor authored architectures are built with.
    pub fn authored_scale(&self) -> u64 {
        (self.expected_scale.round() as u64).max(1)
    }

    /// Builds the default strategy chain in trial order.
    pub fn create_strategies(&self) -> Vec<Box<dyn ConversionStrategy>> {
        let hw = (self.authored_height, self.authored_width);
        let scale = self.authored_scale();
        vec![
            Box::new(DirectConversion::new()),
            Box::new(FrozenEndpoints::new()),
            Box::new(AuthoredStrategy::new(AuthoredNet::Compact, hw, scale, self.seed)),
            Box::new(AuthoredStrategy::new(AuthoredNet::Minimal, hw, scale, self.seed)),
            Box::new(PrebuiltFetch::new(
                self.fallback_url.clone(),
                Duration::from_secs(self.fetch_timeout_secs),
            )),
        ]
    }

    /// Validator knobs derived from this config.
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            default_input_dims: self.default_input_dims.clone(),
            inference_timeout: Duration::from_secs(self.inference_timeout_secs),
            seed: self.seed,
        }
    }
}
