// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Asset packaging for an accepted artifact.
//!
//! A thin collaborator outside the analysis core: copies the accepted
//! artifact into the fixed target layout (`<target>/models/<file>`) and
//! emits a usage document generated from the validation report. Only an
//! *accepted* artifact is ever packaged, so a partial or failed conversion
//! can never end up in the deployment layout.

use crate::PipelineError;
use std::path::{Path, PathBuf};
use validator::ValidationReport;

/// Paths produced by one packaging step.
#[derive(Debug, Clone)]
pub struct PackagedAsset {
    /// The deployed artifact file.
    pub model_path: PathBuf,
    /// The generated usage document.
    pub instructions_path: PathBuf,
}

/// Copies accepted artifacts into the deployment layout.
#[derive(Debug, Clone)]
pub struct AssetPackager {
    target_dir: PathBuf,
}

impl AssetPackager {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }

    /// Writes `<target>/models/<file_name>` and `<target>/INSTRUCTIONS.md`.
    pub fn package(
        &self,
        file_name: &str,
        artifact: &[u8],
        report: &ValidationReport,
    ) -> Result<PackagedAsset, PipelineError> {
        let models_dir = self.target_dir.join("models");
        std::fs::create_dir_all(&models_dir)?;

        let model_path = models_dir.join(file_name);
        std::fs::write(&model_path, artifact)?;

        let instructions_path = self.target_dir.join("INSTRUCTIONS.md");
        std::fs::write(&instructions_path, render_instructions(file_name, report))?;

        tracing::info!(
            "packaged {} ({} bytes) into {}",
            file_name,
            artifact.len(),
            self.target_dir.display(),
        );
        Ok(PackagedAsset {
            model_path,
            instructions_path,
        })
    }
}

fn render_instructions(file_name: &str, report: &ValidationReport) -> String {
    format!(
        "# Super-Resolution Artifact\n\
         \n\
         ## Deployment\n\
         1. Ship the `models/` folder with your application assets.\n\
         2. Load `models/{file_name}` with the lite-plan runtime.\n\
         \n\
         ## Measured Model Details\n\
         - Input: {:?} ({})\n\
         - Output: {:?}\n\
         - Scale: {:.2}x height, {:.2}x width\n\
         - Output range on synthetic input: [{:.3}, {:.3}]\n\
         - Validation inference time: {:.1} ms\n\
         \n\
         Values above were measured during validation, not copied from\n\
         converter metadata.\n",
        report.input_shape,
        report.dtype,
        report.output_shape,
        report.scale_h,
        report.scale_w,
        report.output_min,
        report.output_max,
        report.inference_duration.as_secs_f64() * 1000.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tensor_meta::DType;

    fn report() -> ValidationReport {
        ValidationReport {
            input_shape: vec![1, 192, 256, 1],
            output_shape: vec![1, 384, 512, 1],
            dtype: DType::F32,
            output_min: -0.1,
            output_max: 0.9,
            scale_h: 2.0,
            scale_w: 2.0,
            inference_duration: Duration::from_millis(21),
            meets_contract: true,
        }
    }

    #[test]
    fn test_package_layout() {
        let dir = tempfile::tempdir().unwrap();
        let packager = AssetPackager::new(dir.path());
        let asset = packager
            .package("sr_x2.srl", b"artifact-bytes", &report())
            .unwrap();

        assert!(asset.model_path.ends_with("models/sr_x2.srl"));
        assert_eq!(std::fs::read(&asset.model_path).unwrap(), b"artifact-bytes");

        let doc = std::fs::read_to_string(&asset.instructions_path).unwrap();
        assert!(doc.contains("models/sr_x2.srl"));
        assert!(doc.contains("2.00x height"));
    }
}
