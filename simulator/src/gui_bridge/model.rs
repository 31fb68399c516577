use flightcore::graph::ResolutionReport;
use flightcore::recording::{Attribute, Channel, MaskedArray, Recording, Span, Timebase};
use flightcore::telemetry::Metrics;
use serde::{Deserialize, Serialize};

use crate::workflow::runner::{ChannelSummary, WorkflowResult};

/// Latest derivation results served to HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SummaryModel {
    pub derived: Vec<ChannelSummary>,
    pub report: ResolutionReport,
    pub metrics: Metrics,
    pub scenario: Option<String>,
}

impl SummaryModel {
    pub fn from_result(result: &WorkflowResult, scenario: Option<String>) -> Self {
        Self {
            derived: result.derived.clone(),
            report: result.report.clone(),
            metrics: result.metrics,
            scenario,
        }
    }
}

/// One recorded channel; `null` samples are masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub name: String,
    pub hz: f64,
    #[serde(default)]
    pub offset: f64,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestPayload {
    pub channels: Vec<ChannelPayload>,
    pub attributes: Vec<Attribute>,
    pub spans: Vec<Span>,
}

impl IngestPayload {
    pub fn into_recording(self) -> anyhow::Result<Recording> {
        let mut recording = Recording::new();
        for channel in self.channels {
            anyhow::ensure!(
                channel.hz > 0.0 && (0.0..1.0).contains(&channel.offset),
                "channel '{}' has invalid timebase {} Hz offset {}",
                channel.name,
                channel.hz,
                channel.offset
            );
            recording.insert_channel(Channel::new(
                channel.name,
                Timebase::new(channel.hz, channel.offset),
                MaskedArray::from_options(channel.values),
            ));
        }
        for attribute in self.attributes {
            recording.insert_attribute(attribute);
        }
        recording.insert_spans(self.spans);
        Ok(recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flightcore::recording::PhaseKind;

    #[test]
    fn payload_builds_masked_recording() {
        let json = r#"{
            "channels": [{"name": "Altitude STD", "hz": 1.0, "values": [100.0, null, 120.0]}],
            "attributes": [{"name": "Dist Gear To Tail", "value": 40.0}],
            "spans": [{"kind": "Airborne", "start": 0, "stop": 3}]
        }"#;
        let payload: IngestPayload = serde_json::from_str(json).unwrap();
        let recording = payload.into_recording().unwrap();
        let alt = recording.channel("Altitude STD").unwrap();
        assert_eq!(alt.offset(), 0.0);
        assert!(alt.array.is_masked(1));
        assert_eq!(recording.attribute("Dist Gear To Tail").unwrap().as_number(), Some(40.0));
        assert_eq!(recording.spans(PhaseKind::Airborne).len(), 1);
    }

    #[test]
    fn payload_rejects_bad_timebase() {
        let payload = IngestPayload {
            channels: vec![ChannelPayload {
                name: "Roll".into(),
                hz: 0.0,
                offset: 0.0,
                values: vec![Some(1.0)],
            }],
            ..Default::default()
        };
        assert!(payload.into_recording().is_err());
    }
}
