use crate::generator::profile::{build_recording_from_config, GeneratorConfig};
use crate::gui_bridge::model::{IngestPayload, SummaryModel};
use crate::workflow::runner::Runner;
use flightcore::recording::Recording;
use log::{info, warn};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

type SharedModel = Arc<RwLock<SummaryModel>>;
type JsonReply = warp::reply::WithStatus<warp::reply::Json>;

pub fn bridge_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Runs the workflow over an ingested recording and stores the summary.
fn derive_and_store(
    state: &SharedModel,
    runner: &Runner,
    recording: anyhow::Result<Recording>,
    scenario: Option<String>,
) -> JsonReply {
    match recording.and_then(|recording| runner.execute(recording)) {
        Ok(result) => {
            let model = SummaryModel::from_result(&result, scenario);
            if let Some(name) = model.scenario.as_ref() {
                info!("scenario {} -> {} derived", name, result.metrics.derived);
            }
            let body = json!({
                "status": "ok",
                "derived": result.metrics.derived,
                "skipped": result.metrics.skipped,
                "failed": result.metrics.failed,
            });
            *state.write().unwrap_or_else(PoisonError::into_inner) = model;
            warp::reply::with_status(warp::reply::json(&body), StatusCode::OK)
        }
        Err(err) => {
            warn!("ingest error: {:#}", err);
            warp::reply::with_status(
                warp::reply::json(&json!({"status": "error", "error": format!("{:#}", err)})),
                StatusCode::BAD_REQUEST,
            )
        }
    }
}

/// `GET /summary`, `POST /ingest` and `POST /ingest-config`.
pub fn routes(
    state: SharedModel,
    runner: Arc<Runner>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map(move || state.clone());
    let runner_filter = warp::any().map(move || runner.clone());

    let summary_route = warp::path("summary")
        .and(warp::path::end())
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: SharedModel| {
            let guard = state.read().unwrap_or_else(PoisonError::into_inner);
            warp::reply::json(&*guard)
        });

    let ingest_route = warp::path("ingest")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter.clone())
        .and(runner_filter.clone())
        .and_then(
            |payload: IngestPayload, state: SharedModel, runner: Arc<Runner>| async move {
                Ok::<_, warp::Rejection>(derive_and_store(
                    &state,
                    &runner,
                    payload.into_recording(),
                    None,
                ))
            },
        );

    let generator_route = warp::path("ingest-config")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(state_filter)
        .and(runner_filter)
        .and_then(
            |config: GeneratorConfig, state: SharedModel, runner: Arc<Runner>| async move {
                Ok::<_, warp::Rejection>(derive_and_store(
                    &state,
                    &runner,
                    build_recording_from_config(&config),
                    config.scenario.clone(),
                ))
            },
        );

    summary_route.or(ingest_route).or(generator_route)
}

/// Hosts the summary HTTP endpoint and derives incoming recordings.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        let state = Arc::new(RwLock::new(SummaryModel::default()));
        let filter = routes(state.clone(), runner);

        thread::spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    warn!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(filter).run(bridge_bind_address()).await;
            });
        });

        Self { state }
    }

    pub fn publish(&self, model: &SummaryModel) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *guard = model.clone();
        println!(
            "[GUI] derived parameters: {}, skipped: {}, failed: {}",
            guard.metrics.derived, guard.metrics.skipped, guard.metrics.failed
        );
    }

    pub fn publish_status(&self, message: &str) {
        println!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> SummaryModel {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_recording;
    use crate::workflow::config::WorkflowConfig;

    fn runner() -> Arc<Runner> {
        Arc::new(Runner::new(WorkflowConfig::from_args(3600.0, 5, false)))
    }

    #[test]
    fn publish_replaces_snapshot() {
        let runner = runner();
        let gui = GuiBridge::new(runner.clone());
        let result = runner.execute(build_recording(3600.0, 5).unwrap()).unwrap();
        gui.publish(&SummaryModel::from_result(&result, Some("baseline".into())));
        let snapshot = gui.snapshot();
        assert_eq!(snapshot.metrics, result.metrics);
        assert_eq!(snapshot.scenario.as_deref(), Some("baseline"));
    }

    #[tokio::test]
    async fn ingest_config_updates_summary() {
        let state = Arc::new(RwLock::new(SummaryModel::default()));
        let filter = routes(state.clone(), runner());

        let config = GeneratorConfig {
            scenario: Some("quad".into()),
            engines: 4,
            ..Default::default()
        };
        let response = warp::test::request()
            .method("POST")
            .path("/ingest-config")
            .json(&config)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = warp::test::request()
            .method("GET")
            .path("/summary")
            .reply(&filter)
            .await;
        let summary: SummaryModel = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(summary.scenario.as_deref(), Some("quad"));
        assert!(summary.derived.iter().any(|c| c.name == "Eng N1 Average"));
    }

    #[tokio::test]
    async fn ingest_reports_bad_payload() {
        let state = Arc::new(RwLock::new(SummaryModel::default()));
        let filter = routes(state.clone(), runner());
        let body = json!({"channels": [{"name": "Roll", "hz": -1.0, "values": [1.0]}]});
        let response = warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&body)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.read().unwrap().metrics.derived, 0);
    }

    #[tokio::test]
    async fn ingest_derives_posted_channels() {
        let state = Arc::new(RwLock::new(SummaryModel::default()));
        let filter = routes(state.clone(), runner());
        let body = json!({
            "channels": [
                {"name": "Airspeed", "hz": 1.0, "values": [140.0, 141.0, null, 143.0]},
                {"name": "Vref", "hz": 0.25, "values": [130.0]}
            ]
        });
        let response = warp::test::request()
            .method("POST")
            .path("/ingest")
            .json(&body)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let summary = state.read().unwrap().clone();
        assert!(summary.derived.iter().any(|c| c.name == "Airspeed Minus Vref"));
        assert!(summary.report.failed().is_empty());
    }
}
