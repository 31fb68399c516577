use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use flightcore::graph::{NodeStatus, ResolutionReport, Resolver};
use flightcore::math::stats::{StatsHelper, ValidStats};
use flightcore::parameters::standard_registry;
use flightcore::recording::Recording;
use flightcore::telemetry::Metrics;
use serde::{Deserialize, Serialize};

/// Shape and value range of one derived channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub hz: f64,
    pub offset: f64,
    pub samples: usize,
    pub masked: usize,
    pub stats: Option<ValidStats>,
}

pub struct WorkflowResult {
    pub report: ResolutionReport,
    pub metrics: Metrics,
    pub derived: Vec<ChannelSummary>,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Derives every computable parameter of `recording`.
    pub fn execute(&self, mut recording: Recording) -> anyhow::Result<WorkflowResult> {
        let registry = standard_registry().context("planning derived parameter registry")?;
        let resolver =
            Resolver::new(&registry, self.config.settings.clone()).parallel(self.config.parallel);
        let report = resolver.resolve(&mut recording);

        let derived = report
            .outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, NodeStatus::Derived { .. }))
            .filter_map(|outcome| recording.channel(&outcome.name))
            .map(|channel| ChannelSummary {
                name: channel.name.clone(),
                hz: channel.hz(),
                offset: channel.offset(),
                samples: channel.len(),
                masked: channel.array.count_masked(),
                stats: StatsHelper::valid(&channel.array),
            })
            .collect();

        Ok(WorkflowResult {
            report,
            metrics: resolver.metrics().snapshot(),
            derived,
        })
    }
}
