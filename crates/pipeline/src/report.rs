// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Attempt records and the final pipeline outcome.
//!
//! Every strategy that runs (or is deliberately skipped) leaves a record
//! carrying its specific cause, so total failure reads as a list of
//! reasons rather than a single opaque error.

use converter::ConvertError;
use validator::{ValidationError, ValidationReport};

/// What happened to one strategy in the chain.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Not tried: classification found no endpoints for a graph-derived
    /// strategy.
    Skipped { reason: String },
    /// The strategy itself returned a typed failure.
    ConversionFailed { cause: ConvertError },
    /// Conversion produced bytes, but validation raised an error.
    ValidationFailed { cause: ValidationError },
    /// Validation ran but the measured scale missed the contract.
    ContractUnmet { report: ValidationReport },
    /// Converted, validated, accepted.
    Accepted { report: ValidationReport },
}

impl AttemptOutcome {
    /// One-line cause for listings.
    pub fn describe(&self) -> String {
        match self {
            Self::Skipped { reason } => format!("skipped: {reason}"),
            Self::ConversionFailed { cause } => format!("conversion failed: {cause}"),
            Self::ValidationFailed { cause } => format!("validation failed: {cause}"),
            Self::ContractUnmet { report } => format!(
                "contract unmet: measured {:.2}x/{:.2}x",
                report.scale_h, report.scale_w,
            ),
            Self::Accepted { report } => format!("accepted: {}", report.summary()),
        }
    }
}

/// One entry in the attempt log.
#[derive(Debug)]
pub struct AttemptRecord {
    /// Strategy name.
    pub strategy: String,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Terminal result of a pipeline run.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// A strategy produced an artifact that met the contract.
    Accepted {
        /// Name of the winning strategy.
        strategy: String,
        /// The accepted artifact bytes (not yet written anywhere).
        artifact: Vec<u8>,
        /// The accepting validation report.
        report: ValidationReport,
        /// Full attempt log, the winner included.
        attempts: Vec<AttemptRecord>,
    },
    /// Every strategy failed; the log says exactly how.
    AllFailed {
        attempts: Vec<AttemptRecord>,
    },
}

impl PipelineOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The attempt log, regardless of outcome.
    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::Accepted { attempts, .. } | Self::AllFailed { attempts } => attempts,
        }
    }

    /// Returns a summary string describing the outcome.
    pub fn summary(&self) -> String {
        match self {
            Self::Accepted {
                strategy, report, ..
            } => format!("accepted via '{strategy}': {}", report.summary()),
            Self::AllFailed { attempts } => {
                let causes: Vec<String> = attempts
                    .iter()
                    .map(|a| format!("{}: {}", a.strategy, a.outcome.describe()))
                    .collect();
                format!("all strategies failed: [{}]", causes.join("; "))
            }
        }
    }
}
