// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Frozen-graph conversion with explicitly bound endpoints.
//!
//! Runs after direct conversion has failed: the classifier's top-ranked
//! `(source, sink)` pair becomes the computation boundary. Everything
//! that can go wrong is an [`ConvertError::EndpointBindingFailed`] —
//! unresolvable names, collisions, or unsupported ops on the path.

use crate::strategy::{ConversionAttempt, ConversionStrategy, EndpointPair};
use crate::{compile_subgraph, ConvertError};
use graph_ir::GraphModel;

/// Converts by binding classifier-chosen endpoint nodes.
#[derive(Debug, Clone, Default)]
pub struct FrozenEndpoints;

impl FrozenEndpoints {
    pub fn new() -> Self {
        Self
    }

    fn convert(
        &self,
        graph: &GraphModel,
        endpoints: &EndpointPair,
    ) -> Result<Vec<u8>, ConvertError> {
        tracing::info!(
            "frozen-graph conversion with bound endpoints: {} -> {}",
            endpoints.source,
            endpoints.sink,
        );
        let plan = compile_subgraph(graph, &endpoints.source, &endpoints.sink)?;
        plan.encode()
            .map_err(|e| ConvertError::ConverterRejected(e.to_string()))
    }
}

impl ConversionStrategy for FrozenEndpoints {
    fn name(&self) -> &str {
        "frozen-endpoints"
    }

    fn needs_graph(&self) -> bool {
        true
    }

    fn attempt(
        &self,
        graph: Option<&GraphModel>,
        endpoints: Option<&EndpointPair>,
    ) -> ConversionAttempt {
        match (graph, endpoints) {
            (Some(g), Some(e)) => ConversionAttempt::from_result(self.convert(g, e)),
            _ => ConversionAttempt::Failure(ConvertError::EndpointBindingFailed {
                detail: "no graph or endpoint pair bound".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_ir::Node;
    use lite_artifact::LitePlan;

    fn graph() -> GraphModel {
        GraphModel::new(
            "g",
            vec![
                Node::new("input_image", "Placeholder", vec![]),
                Node::new("final_add", "Relu", vec!["input_image".into()]),
            ],
        )
    }

    #[test]
    fn test_bound_pair_is_used() {
        let endpoints = EndpointPair::new("input_image", "final_add");
        let attempt = FrozenEndpoints::new().attempt(Some(&graph()), Some(&endpoints));
        match attempt {
            ConversionAttempt::Success { artifact, .. } => {
                let plan = LitePlan::decode(&artifact).unwrap();
                assert_eq!(plan.input.name, "input_image");
                assert_eq!(plan.output.name, "final_add");
            }
            ConversionAttempt::Failure(e) => panic!("unexpected failure: {e}"),
        }
    }

    #[test]
    fn test_missing_endpoints_fail_typed() {
        let attempt = FrozenEndpoints::new().attempt(Some(&graph()), None);
        assert!(matches!(
            attempt,
            ConversionAttempt::Failure(ConvertError::EndpointBindingFailed { .. }),
        ));
    }

    #[test]
    fn test_unresolvable_sink_fails_typed() {
        let endpoints = EndpointPair::new("input_image", "ghost");
        let attempt = FrozenEndpoints::new().attempt(Some(&graph()), Some(&endpoints));
        assert!(matches!(
            attempt,
            ConversionAttempt::Failure(ConvertError::EndpointBindingFailed { .. }),
        ));
    }
}
