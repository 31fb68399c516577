use anyhow::Context;
use clap::Parser;
use generator::profile::build_recording_from_config;
use gui_bridge::bridge::GuiBridge;
use gui_bridge::model::SummaryModel;
use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Derived flight parameter workflow driver")]
struct Args {
    /// Derive parameters for one synthetic flight and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Length of the synthetic flight in seconds
    #[arg(long, default_value_t = 3600.0)]
    duration: f64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Evaluate independent nodes of each wave concurrently
    #[arg(long, default_value_t = false)]
    parallel: bool,
    /// Keep the HTTP bridge alive for incoming recordings
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.duration, args.seed, args.parallel)
    };

    let runner = Runner::new(workflow_config.clone());
    let gui_bridge = GuiBridge::new(Arc::new(runner.clone()));

    if args.offline {
        let recording = build_recording_from_config(&workflow_config.generator)
            .context("generating synthetic flight")?;
        let result = runner.execute(recording)?;

        println!(
            "Offline run -> derived {}, skipped {}, failed {}",
            result.metrics.derived, result.metrics.skipped, result.metrics.failed
        );
        for summary in &result.derived {
            match summary.stats {
                Some(stats) => info!(
                    "{}: {} samples at {} Hz, {} masked, range {:.2}..{:.2}",
                    summary.name, summary.samples, summary.hz, summary.masked, stats.min, stats.max
                ),
                None => info!("{}: every sample masked", summary.name),
            }
        }

        let model =
            SummaryModel::from_result(&result, workflow_config.generator.scenario.clone());
        gui_bridge.publish(&model);
        gui_bridge.publish_status("Offline derivation results ready.");

        let report = format!("{}\n", serde_json::to_string(&model)?);
        let report_path = PathBuf::from("tools/data/offline_derivation.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(report_path)?;
        file.write_all(report.as_bytes())?;
    }
    if args.serve {
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    Ok(())
}
