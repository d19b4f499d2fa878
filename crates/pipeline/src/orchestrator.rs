// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The orchestrator state machine.
//!
//! Thin control glue over the other crates: load → analyze → walk the
//! strategy chain, validating every produced artifact, stopping at the
//! first acceptance. Structural conversion success is never enough —
//! validation is authoritative.

use crate::{AttemptOutcome, AttemptRecord, PipelineConfig, PipelineError, PipelineOutcome};
use converter::{ConversionAttempt, ConversionStrategy, EndpointPair};
use graph_ir::{ConnectivityIndex, GraphLoader, GraphModel};
use node_classifier::classify;
use std::path::Path;
use validator::ArtifactValidator;

/// Explicit pipeline states, logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    AnalyzingGraph,
    Converting(usize),
    Validating(usize),
    Accepted,
    AllFailed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::AnalyzingGraph => f.write_str("analyzing-graph"),
            Self::Converting(i) => write!(f, "converting({i})"),
            Self::Validating(i) => write!(f, "validating({i})"),
            Self::Accepted => f.write_str("accepted"),
            Self::AllFailed => f.write_str("all-failed"),
        }
    }
}

/// How many leading nodes the diagnostic listing prints.
const DIAGNOSTIC_HEAD: usize = 10;

/// Owns one pipeline run: the graph, the strategy chain, the validator.
pub struct Pipeline {
    config: PipelineConfig,
    strategies: Vec<Box<dyn ConversionStrategy>>,
    validator: ArtifactValidator,
}

impl Pipeline {
    /// Creates a pipeline with the default strategy chain from `config`.
    pub fn new(config: PipelineConfig) -> Self {
        let strategies = config.create_strategies();
        let validator = ArtifactValidator::new(config.validator_options());
        Self {
            config,
            strategies,
            validator,
        }
    }

    /// Creates a pipeline with an injected strategy chain.
    ///
    /// The seam the chain-behavior tests script against.
    pub fn with_strategies(
        config: PipelineConfig,
        strategies: Vec<Box<dyn ConversionStrategy>>,
    ) -> Self {
        let validator = ArtifactValidator::new(config.validator_options());
        Self {
            config,
            strategies,
            validator,
        }
    }

    /// The single entry point: load, analyze, convert, validate.
    ///
    /// A malformed input artifact aborts with an error; everything else
    /// resolves into a [`PipelineOutcome`].
    pub fn run(
        &self,
        graph_path: &Path,
        expected_scale: f64,
    ) -> Result<PipelineOutcome, PipelineError> {
        let graph = GraphLoader::load(graph_path)?;
        Ok(self.run_loaded(&graph, expected_scale))
    }

    /// Runs the pipeline over an already-loaded graph.
    pub fn run_loaded(&self, graph: &GraphModel, expected_scale: f64) -> PipelineOutcome {
        let mut state = PipelineState::Idle;
        transition(&mut state, PipelineState::AnalyzingGraph);

        tracing::info!("{}", graph.summary());
        let connectivity = ConnectivityIndex::build(graph);
        for node in graph.iter_nodes().take(DIAGNOSTIC_HEAD) {
            tracing::debug!(
                "  {} ({}) - out-degree {}",
                node.name,
                node.op,
                connectivity.out_degree(&node.name),
            );
        }

        let (endpoints, skip_reason) =
            match classify(graph, &connectivity, &self.config.classifier) {
                Ok(classification) => {
                    let pair = classification
                        .top_pair()
                        .map(|(src, snk)| EndpointPair::new(src, snk));
                    (pair, None)
                }
                Err(e) => {
                    tracing::warn!("classification failed: {e}; graph-derived strategies skipped");
                    (None, Some(e.to_string()))
                }
            };

        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for (i, strategy) in self.strategies.iter().enumerate() {
            transition(&mut state, PipelineState::Converting(i));

            if strategy.needs_graph() {
                if let Some(reason) = &skip_reason {
                    attempts.push(AttemptRecord {
                        strategy: strategy.name().to_string(),
                        outcome: AttemptOutcome::Skipped {
                            reason: reason.clone(),
                        },
                    });
                    continue;
                }
            }

            // The attempt's artifact lives only in this scope: a failed
            // attempt leaks nothing into the next one.
            match strategy.attempt(Some(graph), endpoints.as_ref()) {
                ConversionAttempt::Failure(cause) => {
                    tracing::warn!("strategy '{}' failed: {cause}", strategy.name());
                    attempts.push(AttemptRecord {
                        strategy: strategy.name().to_string(),
                        outcome: AttemptOutcome::ConversionFailed { cause },
                    });
                }
                ConversionAttempt::Success {
                    artifact,
                    size_bytes,
                } => {
                    tracing::info!(
                        "strategy '{}' produced {size_bytes} bytes; validating",
                        strategy.name(),
                    );
                    transition(&mut state, PipelineState::Validating(i));

                    match self.validator.validate(&artifact, expected_scale) {
                        Err(cause) => {
                            tracing::warn!(
                                "artifact from '{}' failed validation: {cause}",
                                strategy.name(),
                            );
                            attempts.push(AttemptRecord {
                                strategy: strategy.name().to_string(),
                                outcome: AttemptOutcome::ValidationFailed { cause },
                            });
                        }
                        Ok(report) if !report.meets_contract => {
                            tracing::warn!(
                                "artifact from '{}' runs but misses the scale contract \
                                 ({:.2}x/{:.2}x vs expected {expected_scale:.2}x)",
                                strategy.name(),
                                report.scale_h,
                                report.scale_w,
                            );
                            attempts.push(AttemptRecord {
                                strategy: strategy.name().to_string(),
                                outcome: AttemptOutcome::ContractUnmet { report },
                            });
                        }
                        Ok(report) => {
                            transition(&mut state, PipelineState::Accepted);
                            let strategy_name = strategy.name().to_string();
                            attempts.push(AttemptRecord {
                                strategy: strategy_name.clone(),
                                outcome: AttemptOutcome::Accepted {
                                    report: report.clone(),
                                },
                            });
                            return PipelineOutcome::Accepted {
                                strategy: strategy_name,
                                artifact,
                                report,
                                attempts,
                            };
                        }
                    }
                }
            }
        }

        transition(&mut state, PipelineState::AllFailed);
        PipelineOutcome::AllFailed { attempts }
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    tracing::debug!("pipeline state: {state} -> {next}");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use converter::{AuthoredNet, AuthoredStrategy, ConvertError};
    use graph_ir::Node;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A stub strategy with a scripted outcome and a call counter. Handed
    /// to the pipeline as an `Arc` clone so tests keep a handle for
    /// assertions.
    struct Scripted {
        name: String,
        succeed: bool,
        needs_graph: bool,
        calls: AtomicUsize,
        seen_endpoints: Mutex<Option<EndpointPair>>,
    }

    impl Scripted {
        fn new(name: &str, succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                succeed,
                needs_graph: false,
                calls: AtomicUsize::new(0),
                seen_endpoints: Mutex::new(None),
            })
        }

        fn graph_bound(name: &str, succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                name: name.into(),
                succeed,
                needs_graph: true,
                calls: AtomicUsize::new(0),
                seen_endpoints: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// A small valid artifact so validation can accept it.
        fn valid_artifact() -> Vec<u8> {
            AuthoredStrategy::new(AuthoredNet::Minimal, (24, 32), 2, 1)
                .build_plan()
                .unwrap()
                .encode()
                .unwrap()
        }
    }

    impl ConversionStrategy for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        fn needs_graph(&self) -> bool {
            self.needs_graph
        }

        fn attempt(
            &self,
            _graph: Option<&GraphModel>,
            endpoints: Option<&EndpointPair>,
        ) -> ConversionAttempt {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_endpoints.lock().unwrap() = endpoints.cloned();
            if self.succeed {
                ConversionAttempt::success(Scripted::valid_artifact())
            } else {
                ConversionAttempt::Failure(ConvertError::ConverterRejected(
                    "scripted failure".into(),
                ))
            }
        }
    }

    /// Boxes a shared `Scripted` handle as a `dyn ConversionStrategy`.
    ///
    /// `ConversionStrategy` and `Arc` are both foreign to this crate, so the
    /// trait cannot be implemented on `Arc<Scripted>` directly (orphan rule);
    /// this local newtype forwards to the shared handle instead.
    struct SharedScripted(Arc<Scripted>);

    impl ConversionStrategy for SharedScripted {
        fn name(&self) -> &str {
            self.0.name()
        }

        fn needs_graph(&self) -> bool {
            self.0.needs_graph()
        }

        fn attempt(
            &self,
            graph: Option<&GraphModel>,
            endpoints: Option<&EndpointPair>,
        ) -> ConversionAttempt {
            self.0.attempt(graph, endpoints)
        }
    }

    /// Boxes a shared `Scripted` handle for injection into a pipeline.
    fn boxed(s: Arc<Scripted>) -> Box<dyn ConversionStrategy> {
        Box::new(SharedScripted(s))
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            default_input_dims: vec![1, 24, 32, 1],
            ..Default::default()
        }
    }

    fn simple_graph() -> GraphModel {
        GraphModel::new(
            "simple",
            vec![
                Node::new("input_image", "Placeholder", vec![]),
                Node::new("final_add", "Add", vec!["input_image".into()]),
            ],
        )
    }

    #[test]
    fn test_chain_stops_at_first_success() {
        // Fail, Fail, Succeed, (never reached): exactly 3 calls.
        let s1 = Scripted::new("one", false);
        let s2 = Scripted::new("two", false);
        let s3 = Scripted::new("three", true);
        let s4 = Scripted::new("four", true);

        let pipeline = Pipeline::with_strategies(
            test_config(),
            vec![
                boxed(s1.clone()),
                boxed(s2.clone()),
                boxed(s3.clone()),
                boxed(s4.clone()),
            ],
        );
        let outcome = pipeline.run_loaded(&simple_graph(), 2.0);

        assert_eq!(s1.calls(), 1);
        assert_eq!(s2.calls(), 1);
        assert_eq!(s3.calls(), 1);
        assert_eq!(s4.calls(), 0);
        match &outcome {
            PipelineOutcome::Accepted { strategy, attempts, .. } => {
                assert_eq!(strategy, "three");
                assert_eq!(attempts.len(), 3);
            }
            PipelineOutcome::AllFailed { .. } => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_classifier_endpoints_reach_the_strategy() {
        let probe = Scripted::graph_bound("probe", true);
        let pipeline =
            Pipeline::with_strategies(test_config(), vec![boxed(probe.clone())]);
        let outcome = pipeline.run_loaded(&simple_graph(), 2.0);
        assert!(outcome.is_accepted());
        let seen = probe.seen_endpoints.lock().unwrap().clone();
        assert_eq!(seen, Some(EndpointPair::new("input_image", "final_add")));
    }

    #[test]
    fn test_no_candidates_skips_graph_derived_strategies() {
        // No placeholder anywhere: classification fails, graph-derived
        // strategies are skipped but the authored-style one still runs.
        let graph = GraphModel::new(
            "no-placeholders",
            vec![Node::new("w", "Const", vec![])],
        );
        let bound = Scripted::graph_bound("bound", true);
        let free = Scripted::new("free", true);
        let pipeline = Pipeline::with_strategies(
            test_config(),
            vec![boxed(bound.clone()), boxed(free.clone())],
        );
        let outcome = pipeline.run_loaded(&graph, 2.0);

        assert_eq!(bound.calls(), 0);
        assert_eq!(free.calls(), 1);
        match &outcome {
            PipelineOutcome::Accepted { attempts, .. } => {
                assert!(matches!(
                    attempts[0].outcome,
                    AttemptOutcome::Skipped { .. },
                ));
            }
            PipelineOutcome::AllFailed { .. } => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_contract_miss_advances_the_chain() {
        // First strategy produces a valid artifact with the wrong scale;
        // the pipeline must keep going instead of accepting it.
        struct WrongScale;
        impl ConversionStrategy for WrongScale {
            fn name(&self) -> &str {
                "wrong-scale"
            }
            fn attempt(
                &self,
                _g: Option<&GraphModel>,
                _e: Option<&EndpointPair>,
            ) -> ConversionAttempt {
                let plan = AuthoredStrategy::new(AuthoredNet::Minimal, (24, 32), 3, 1)
                    .build_plan()
                    .unwrap();
                ConversionAttempt::success(plan.encode().unwrap())
            }
        }

        let good = boxed(Scripted::new("good", true));
        let pipeline =
            Pipeline::with_strategies(test_config(), vec![Box::new(WrongScale), good]);
        let outcome = pipeline.run_loaded(&simple_graph(), 2.0);
        match &outcome {
            PipelineOutcome::Accepted { strategy, attempts, .. } => {
                assert_eq!(strategy, "good");
                assert!(matches!(
                    attempts[0].outcome,
                    AttemptOutcome::ContractUnmet { .. },
                ));
            }
            PipelineOutcome::AllFailed { .. } => panic!("expected acceptance"),
        }
    }

    #[test]
    fn test_all_failed_reports_every_cause() {
        let pipeline = Pipeline::with_strategies(
            test_config(),
            vec![
                boxed(Scripted::new("one", false)),
                boxed(Scripted::new("two", false)),
            ],
        );
        let outcome = pipeline.run_loaded(&simple_graph(), 2.0);
        match &outcome {
            PipelineOutcome::AllFailed { attempts } => {
                assert_eq!(attempts.len(), 2);
                for a in attempts {
                    assert!(matches!(
                        a.outcome,
                        AttemptOutcome::ConversionFailed { .. },
                    ));
                }
            }
            PipelineOutcome::Accepted { .. } => panic!("expected total failure"),
        }
        assert!(outcome.summary().contains("one"));
        assert!(outcome.summary().contains("two"));
    }
}
