// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for endpoint classification.

/// Which endpoint role a candidate search was filling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Sink,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Source => "source",
            Self::Sink => "sink",
        })
    }
}

/// Errors that can occur during classification.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// The candidate set for a role is empty; graph-derived conversion
    /// cannot proceed, but authored fallbacks still can.
    #[error("no {role} candidate found in graph")]
    NoCandidateFound { role: Role },
}
