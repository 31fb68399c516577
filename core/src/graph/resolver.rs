use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crate::graph::node::{Derived, DerivedParameter, NodeInputs};
use crate::graph::registry::NodeRegistry;
use crate::prelude::{DeriveError, Settings};
use crate::recording::{Channel, Recording};
use crate::telemetry::{LogManager, MetricsRecorder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A channel of the same name was already recorded.
    AlreadyRecorded,
    MissingInputs { missing: Vec<String> },
    NotImplemented,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeStatus {
    Derived { inputs: Vec<String> },
    Skipped(SkipReason),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOutcome {
    pub name: String,
    pub status: NodeStatus,
}

/// What happened to every registered node for one recording.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub outcomes: Vec<NodeOutcome>,
}

impl ResolutionReport {
    pub fn status(&self, name: &str) -> Option<&NodeStatus> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.name == name)
            .map(|outcome| &outcome.status)
    }

    pub fn derived(&self) -> Vec<&str> {
        self.filter(|status| matches!(status, NodeStatus::Derived { .. }))
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.filter(|status| matches!(status, NodeStatus::Skipped(_)))
    }

    pub fn failed(&self) -> Vec<&str> {
        self.filter(|status| matches!(status, NodeStatus::Failed { .. }))
    }

    fn filter(&self, keep: impl Fn(&NodeStatus) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| keep(&outcome.status))
            .map(|outcome| outcome.name.as_str())
            .collect()
    }
}

enum Evaluation {
    Publish(Derived, Vec<String>),
    Skip(SkipReason),
    Fail(DeriveError),
}

/// Walks a registry over a recording, publishing every derivable output.
pub struct Resolver<'r> {
    registry: &'r NodeRegistry,
    settings: Settings,
    parallel: bool,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r NodeRegistry, settings: Settings) -> Self {
        Self {
            registry,
            settings,
            parallel: false,
            logger: LogManager::for_component("resolver"),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Runs the nodes of each wave on scoped threads.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Derives every computable node into `recording`.
    ///
    /// Unavailable or unimplemented nodes are skipped; a node whose derivation
    /// fails is reported and the walk continues without its output.
    pub fn resolve(&self, recording: &mut Recording) -> ResolutionReport {
        let mut report = ResolutionReport::default();

        for wave in self.registry.wave_indices() {
            let available = recording.available();
            let nodes: Vec<&dyn DerivedParameter> =
                wave.iter().map(|&idx| self.registry.node(idx)).collect();

            let shared: &Recording = recording;
            let evaluations: Vec<Evaluation> = if self.parallel && nodes.len() > 1 {
                thread::scope(|scope| {
                    let handles: Vec<_> = nodes
                        .iter()
                        .map(|&node| {
                            let available = &available;
                            scope.spawn(move || self.evaluate_isolated(node, shared, available))
                        })
                        .collect();
                    handles
                        .into_iter()
                        .zip(&nodes)
                        .map(|(handle, node)| {
                            handle.join().unwrap_or_else(|_| panicked(*node))
                        })
                        .collect()
                })
            } else {
                nodes
                    .iter()
                    .map(|&node| self.evaluate_isolated(node, shared, &available))
                    .collect()
            };

            for (node, evaluation) in nodes.into_iter().zip(evaluations) {
                let status = self.publish(node, evaluation, recording);
                report.outcomes.push(NodeOutcome {
                    name: node.name().to_string(),
                    status,
                });
            }
        }

        let counts = self.metrics.snapshot();
        self.logger.record(&format!(
            "resolution finished: {} derived, {} skipped, {} failed",
            counts.derived, counts.skipped, counts.failed
        ));
        report
    }

    /// A panicking node fails on its own instead of unwinding the walk.
    fn evaluate_isolated(
        &self,
        node: &dyn DerivedParameter,
        recording: &Recording,
        available: &BTreeSet<String>,
    ) -> Evaluation {
        panic::catch_unwind(AssertUnwindSafe(|| self.evaluate(node, recording, available)))
            .unwrap_or_else(|_| panicked(node))
    }

    fn evaluate(
        &self,
        node: &dyn DerivedParameter,
        recording: &Recording,
        available: &BTreeSet<String>,
    ) -> Evaluation {
        if available.contains(node.name()) {
            return Evaluation::Skip(SkipReason::AlreadyRecorded);
        }
        let deps = node.dependencies();
        if !node.can_operate(available) {
            let missing = deps
                .all()
                .filter(|name| !available.contains(*name))
                .map(str::to_string)
                .collect();
            return Evaluation::Skip(SkipReason::MissingInputs { missing });
        }

        let inputs = NodeInputs::new(node.name(), &deps, recording, &self.settings);
        let used = inputs.present().into_iter().map(str::to_string).collect();
        match node.derive(&inputs) {
            Ok(derived) => Evaluation::Publish(derived, used),
            Err(DeriveError::NotImplemented(_)) => Evaluation::Skip(SkipReason::NotImplemented),
            Err(DeriveError::Unavailable(what)) => Evaluation::Skip(SkipReason::MissingInputs {
                missing: vec![what],
            }),
            Err(err) => Evaluation::Fail(err),
        }
    }

    fn publish(
        &self,
        node: &dyn DerivedParameter,
        evaluation: Evaluation,
        recording: &mut Recording,
    ) -> NodeStatus {
        match evaluation {
            Evaluation::Publish(derived, inputs) => {
                self.metrics.record_derived();
                self.logger.detail(&format!(
                    "derived '{}' ({} samples at {} Hz) from {:?}",
                    node.name(),
                    derived.array.len(),
                    derived.timebase.hz,
                    inputs
                ));
                recording.insert_channel(Channel::new(node.name(), derived.timebase, derived.array));
                NodeStatus::Derived { inputs }
            }
            Evaluation::Skip(reason) => {
                self.metrics.record_skipped();
                self.logger
                    .detail(&format!("skipped '{}': {:?}", node.name(), reason));
                NodeStatus::Skipped(reason)
            }
            Evaluation::Fail(err) => {
                self.metrics.record_failed();
                self.logger
                    .warn(&format!("derivation of '{}' failed: {}", node.name(), err));
                NodeStatus::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}

fn panicked(node: &dyn DerivedParameter) -> Evaluation {
    Evaluation::Fail(DeriveError::InvalidInput(format!(
        "{} panicked during derivation",
        node.name()
    )))
}
