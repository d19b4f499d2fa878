// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Direct conversion from the graph's own declared signature.
//!
//! The happy path for saved-model containers: no manual node selection at
//! all. Frozen graphs carry no signature, so this strategy fails fast on
//! them with [`ConvertError::UnsupportedSignature`] and hands over to
//! endpoint binding.

use crate::strategy::{ConversionAttempt, ConversionStrategy, EndpointPair};
use crate::{compile_subgraph, ConvertError};
use graph_ir::GraphModel;

/// Converts using the artifact's declared signature.
#[derive(Debug, Clone, Default)]
pub struct DirectConversion;

impl DirectConversion {
    pub fn new() -> Self {
        Self
    }

    fn convert(&self, graph: &GraphModel) -> Result<Vec<u8>, ConvertError> {
        let signature = graph.signature().ok_or(ConvertError::UnsupportedSignature)?;
        let (source, sink) = match (signature.inputs.first(), signature.outputs.first()) {
            (Some(src), Some(snk)) => (src.as_str(), snk.as_str()),
            _ => return Err(ConvertError::UnsupportedSignature),
        };
        tracing::info!("direct conversion via declared signature: {source} -> {sink}");
        let plan = compile_subgraph(graph, source, sink)?;
        plan.encode()
            .map_err(|e| ConvertError::ConverterRejected(e.to_string()))
    }
}

impl ConversionStrategy for DirectConversion {
    fn name(&self) -> &str {
        "direct-signature"
    }

    fn needs_graph(&self) -> bool {
        true
    }

    fn attempt(
        &self,
        graph: Option<&GraphModel>,
        _endpoints: Option<&EndpointPair>,
    ) -> ConversionAttempt {
        match graph {
            None => ConversionAttempt::Failure(ConvertError::UnsupportedSignature),
            Some(g) => ConversionAttempt::from_result(self.convert(g)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_ir::Node;

    #[test]
    fn test_no_signature_fails_fast() {
        let graph = GraphModel::new(
            "frozen",
            vec![Node::new("input_image", "Placeholder", vec![])],
        );
        let attempt = DirectConversion::new().attempt(Some(&graph), None);
        assert!(matches!(
            attempt,
            ConversionAttempt::Failure(ConvertError::UnsupportedSignature),
        ));
    }

    #[test]
    fn test_empty_signature_fails_fast() {
        let graph = GraphModel::new(
            "odd",
            vec![Node::new("input_image", "Placeholder", vec![])],
        )
        .with_signature(Some(graph_ir::Signature::default()));
        let attempt = DirectConversion::new().attempt(Some(&graph), None);
        assert!(matches!(
            attempt,
            ConversionAttempt::Failure(ConvertError::UnsupportedSignature),
        ));
    }

    #[test]
    fn test_signature_drives_compilation() {
        let graph = GraphModel::new(
            "signed",
            vec![
                Node::new("input_image", "Placeholder", vec![]),
                Node::new("result", "Relu", vec!["input_image".into()]),
            ],
        )
        .with_signature(Some(graph_ir::Signature {
            inputs: vec!["input_image".into()],
            outputs: vec!["result".into()],
        }));
        let attempt = DirectConversion::new().attempt(Some(&graph), None);
        assert!(attempt.is_success());
    }
}
