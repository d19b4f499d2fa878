// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Candidate ranking for source and sink endpoints.

use crate::{ClassifierConfig, ClassifyError, Role};
use graph_ir::{ConnectivityIndex, GraphModel};

/// Ordinal confidence for a candidate — not a probability.
///
/// The derived ordering is the ranking: an earlier keyword beats a later
/// one, any keyword beats a kind-only match, and kind beats the positional
/// fallback. Ties are broken by declaration order (the sort is stable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CandidateRank {
    /// Name contains the keyword at this position in the configured list.
    Keyword(usize),
    /// Operation kind matches (placeholder-kind sources).
    Kind,
    /// Nothing matched; first-in-classification-order fallback.
    Positional,
}

impl std::fmt::Display for CandidateRank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(i) => write!(f, "keyword#{i}"),
            Self::Kind => f.write_str("kind"),
            Self::Positional => f.write_str("positional"),
        }
    }
}

/// A ranked endpoint candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCandidate {
    pub name: String,
    pub rank: CandidateRank,
}

/// Ranked source and sink candidate lists, both non-empty.
#[derive(Debug, Clone)]
pub struct Classification {
    pub sources: Vec<NodeCandidate>,
    pub sinks: Vec<NodeCandidate>,
}

impl Classification {
    /// The top-ranked `(source, sink)` pair.
    pub fn top_pair(&self) -> Option<(&str, &str)> {
        match (self.sources.first(), self.sinks.first()) {
            (Some(src), Some(snk)) => Some((src.name.as_str(), snk.name.as_str())),
            _ => None,
        }
    }
}

/// Classifies endpoint candidates from connectivity plus naming heuristics.
///
/// - Sources: every placeholder-kind node, ranked by `source_keywords`.
/// - Sinks: every zero-out-degree node not matching `sink_exclusions`,
///   ranked by `sink_keywords`.
///
/// Always returns a best-effort guess; only an empty candidate set on
/// either side is an error.
pub fn classify(
    graph: &GraphModel,
    connectivity: &ConnectivityIndex,
    config: &ClassifierConfig,
) -> Result<Classification, ClassifyError> {
    let mut sources: Vec<NodeCandidate> = graph
        .iter_nodes()
        .filter(|n| config.placeholder_ops.iter().any(|op| op == &n.op))
        .map(|n| NodeCandidate {
            rank: keyword_rank(&n.name, &config.source_keywords).unwrap_or(CandidateRank::Kind),
            name: n.name.clone(),
        })
        .collect();

    let mut sinks: Vec<NodeCandidate> = graph
        .iter_nodes()
        .filter(|n| connectivity.is_terminal(&n.name))
        .filter(|n| !is_excluded(&n.name, &config.sink_exclusions))
        .map(|n| NodeCandidate {
            rank: keyword_rank(&n.name, &config.sink_keywords)
                .unwrap_or(CandidateRank::Positional),
            name: n.name.clone(),
        })
        .collect();

    if sources.is_empty() {
        return Err(ClassifyError::NoCandidateFound { role: Role::Source });
    }
    if sinks.is_empty() {
        return Err(ClassifyError::NoCandidateFound { role: Role::Sink });
    }

    // Stable sorts: declaration order breaks ties within a rank.
    sources.sort_by_key(|c| c.rank);
    sinks.sort_by_key(|c| c.rank);

    tracing::debug!(
        "classified {} source and {} sink candidate(s); best guess: {:?}",
        sources.len(),
        sinks.len(),
        (sources.first().map(|c| &c.name), sinks.first().map(|c| &c.name)),
    );

    Ok(Classification { sources, sinks })
}

/// First matching keyword (case-insensitive substring), if any.
fn keyword_rank(name: &str, keywords: &[String]) -> Option<CandidateRank> {
    let lower = name.to_lowercase();
    keywords
        .iter()
        .position(|k| lower.contains(&k.to_lowercase()))
        .map(CandidateRank::Keyword)
}

fn is_excluded(name: &str, exclusions: &[String]) -> bool {
    let lower = name.to_lowercase();
    exclusions.iter().any(|e| lower.contains(&e.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use graph_ir::Node;

    fn classify_default(nodes: Vec<Node>) -> Result<Classification, ClassifyError> {
        let graph = GraphModel::new("test", nodes);
        let conn = ConnectivityIndex::build(&graph);
        classify(&graph, &conn, &ClassifierConfig::default())
    }

    #[test]
    fn test_keyworded_placeholder_and_single_sink_rank_first() {
        let result = classify_default(vec![
            Node::new("input_image", "Placeholder", vec![]),
            Node::new("w", "Const", vec![]),
            Node::new("final_add", "Add", vec!["input_image".into(), "w".into()]),
        ])
        .unwrap();

        assert_eq!(result.sources[0].name, "input_image");
        assert_eq!(result.sources[0].rank, CandidateRank::Keyword(0));
        assert_eq!(result.sinks[0].name, "final_add");
        assert_eq!(result.top_pair().unwrap(), ("input_image", "final_add"));
    }

    #[test]
    fn test_excluded_sinks_never_rank_first() {
        // "save/restore_all" is structurally terminal but must never be
        // proposed as the true output.
        let result = classify_default(vec![
            Node::new("input_image", "Placeholder", vec![]),
            Node::new("save/restore_all", "NoOp", vec![]),
            Node::new("init_all_tables", "NoOp", vec![]),
            Node::new("upscale", "Conv2D", vec!["input_image".into()]),
        ])
        .unwrap();

        assert_eq!(result.sinks.len(), 1);
        assert_eq!(result.sinks[0].name, "upscale");
    }

    #[test]
    fn test_only_excluded_sinks_is_no_candidate() {
        let err = classify_default(vec![
            Node::new("input_image", "Placeholder", vec![]),
            Node::new("save/control", "NoOp", vec!["input_image".into()]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::NoCandidateFound { role: Role::Sink }
        ));
    }

    #[test]
    fn test_no_placeholder_is_no_candidate() {
        let err = classify_default(vec![
            Node::new("w", "Const", vec![]),
            Node::new("out", "Conv2D", vec!["w".into()]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::NoCandidateFound { role: Role::Source }
        ));
    }

    #[test]
    fn test_positional_fallback_without_keywords() {
        // Neither placeholder name carries a keyword; declaration order
        // decides.
        let result = classify_default(vec![
            Node::new("frame", "Placeholder", vec![]),
            Node::new("frame_b", "Placeholder", vec![]),
            Node::new("relu_out", "Relu", vec!["frame".into(), "frame_b".into()]),
        ])
        .unwrap();

        assert_eq!(result.sources[0].name, "frame");
        assert_eq!(result.sources[0].rank, CandidateRank::Kind);
        // "relu_out" contains no configured keyword ("output" is not a
        // substring of it), so it lands on the positional fallback.
        assert_eq!(result.sinks[0].name, "relu_out");
        assert_eq!(result.sinks[0].rank, CandidateRank::Positional);
    }

    #[test]
    fn test_keyword_order_beats_declaration_order() {
        // "data_feed" matches keyword #3, "image_in" matches keyword #1:
        // the later-declared node still wins on keyword strength.
        let result = classify_default(vec![
            Node::new("data_feed", "Placeholder", vec![]),
            Node::new("image_in", "Placeholder", vec![]),
            Node::new("sum", "Add", vec!["data_feed".into(), "image_in".into()]),
        ])
        .unwrap();

        assert_eq!(result.sources[0].name, "image_in");
        assert_eq!(result.sources[1].name, "data_feed");
    }

    #[test]
    fn test_sink_keyword_ranking() {
        let result = classify_default(vec![
            Node::new("input_image", "Placeholder", vec![]),
            Node::new("some_tail", "Mul", vec!["input_image".into()]),
            Node::new("net_output", "Conv2D", vec!["input_image".into()]),
        ])
        .unwrap();

        // Both are terminal, but only "net_output" matches a keyword.
        assert_eq!(result.sinks[0].name, "net_output");
        assert_eq!(result.sinks[0].rank, CandidateRank::Keyword(0));
        assert_eq!(result.sinks[1].rank, CandidateRank::Positional);
    }
}
