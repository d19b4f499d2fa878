// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Prebuilt-artifact fetch: the last resort.
//!
//! Downloads a known-good artifact over HTTP with a bounded timeout. Its
//! failure mode is purely transport/availability — graph analysis plays no
//! part here — and the downloaded bytes still go through full validation
//! before anyone trusts them.

use crate::strategy::{ConversionAttempt, ConversionStrategy, EndpointPair};
use crate::ConvertError;
use graph_ir::GraphModel;
use std::time::Duration;

/// Default bound on the whole download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a known-good prebuilt artifact from a URL.
#[derive(Debug, Clone)]
pub struct PrebuiltFetch {
    url: String,
    timeout: Duration,
}

impl PrebuiltFetch {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    fn fetch(&self) -> Result<Vec<u8>, ConvertError> {
        tracing::info!("fetching prebuilt artifact from {}", self.url);
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ConvertError::FetchFailed(e.to_string()))?;
        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| ConvertError::FetchFailed(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ConvertError::FetchFailed(format!(
                "{} returned HTTP {}",
                self.url,
                response.status(),
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|e| ConvertError::FetchFailed(e.to_string()))?;
        tracing::info!("downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

impl ConversionStrategy for PrebuiltFetch {
    fn name(&self) -> &str {
        "prebuilt-fetch"
    }

    fn attempt(
        &self,
        _graph: Option<&GraphModel>,
        _endpoints: Option<&EndpointPair>,
    ) -> ConversionAttempt {
        ConversionAttempt::from_result(self.fetch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_endpoint_is_fetch_failed() {
        // Reserved TEST-NET address; connection refused/timeout either way.
        let strategy = PrebuiltFetch::new(
            "http://192.0.2.1/sr_x2_backup.srl",
            Duration::from_millis(250),
        );
        let attempt = strategy.attempt(None, None);
        assert!(matches!(
            attempt,
            ConversionAttempt::Failure(ConvertError::FetchFailed(_)),
        ));
    }

    #[test]
    fn test_does_not_need_graph() {
        let strategy = PrebuiltFetch::new("http://example.invalid/a.srl", DEFAULT_FETCH_TIMEOUT);
        assert!(!strategy.needs_graph());
    }
}
