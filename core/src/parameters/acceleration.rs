use crate::graph::{Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::prelude::DeriveResult;
use crate::processing::{align, rate_of_change, repair_mask};
use crate::recording::{Channel, MaskedArray};

use super::{
    ACCELERATION_LATERAL, ACCELERATION_LONGITUDINAL, ACCELERATION_NORMAL, ACCELERATION_VERTICAL,
    AIRSPEED, PITCH, ROLL,
};

/// Resolves body-axis accelerations into the earth vertical.
pub struct AccelerationVertical;

impl DerivedParameter for AccelerationVertical {
    fn name(&self) -> &'static str {
        ACCELERATION_VERTICAL
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[
            ACCELERATION_NORMAL,
            ACCELERATION_LATERAL,
            ACCELERATION_LONGITUDINAL,
            PITCH,
            ROLL,
        ])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let normal = inputs.require(ACCELERATION_NORMAL)?;
        // Everything is brought onto the normal accelerometer's timebase.
        let ax = align(inputs.require(ACCELERATION_LONGITUDINAL)?, normal);
        let ay = align(inputs.require(ACCELERATION_LATERAL)?, normal);
        let pitch = align(inputs.require(PITCH)?, normal).map(f64::to_radians);
        let roll = align(inputs.require(ROLL)?, normal).map(f64::to_radians);

        let mut vertical = MaskedArray::masked(normal.len());
        for idx in 0..normal.len() {
            if let (Some(az), Some(ax), Some(ay), Some(p), Some(r)) = (
                normal.array.get(idx),
                ax.get(idx),
                ay.get(idx),
                pitch.get(idx),
                roll.get(idx),
            ) {
                let resolved_in_pitch = ax * p.sin() + az * p.cos();
                vertical.set(idx, resolved_in_pitch * r.cos() - ay * r.sin());
            }
        }
        Ok(Derived::like(normal, vertical))
    }
}

/// Acceleration along the runway, used to identify takeoff and landing
/// rolls. Aircraft without a longitudinal accelerometer fall back on the
/// rate of change of airspeed.
pub struct AccelerationForwardsForFlightPhases;

impl DerivedParameter for AccelerationForwardsForFlightPhases {
    fn name(&self) -> &'static str {
        "Acceleration Forwards For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[AIRSPEED]).with_optional(&[ACCELERATION_LONGITUDINAL])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let duration = Some(inputs.settings().repair_duration);
        if let Some(longitudinal) = inputs.channel(ACCELERATION_LONGITUDINAL) {
            let repaired = repair_mask(&longitudinal.array, longitudinal.hz(), duration);
            return Ok(Derived::like(longitudinal, repaired));
        }

        let airspeed = inputs.require(AIRSPEED)?;
        let repaired = Channel::new(
            airspeed.name.clone(),
            airspeed.timebase,
            repair_mask(&airspeed.array, airspeed.hz(), duration),
        );
        let settings = inputs.settings();
        let accel = rate_of_change(&repaired, 1).scale(settings.kts_to_fps / settings.gravity);
        Ok(Derived::like(airspeed, accel))
    }
}

/// Airspeed rate in knots per second.
pub struct AccelerationFromAirspeed;

impl DerivedParameter for AccelerationFromAirspeed {
    fn name(&self) -> &'static str {
        "Acceleration From Airspeed"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[AIRSPEED])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let airspeed = inputs.require(AIRSPEED)?;
        Ok(Derived::like(airspeed, rate_of_change(airspeed, 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeRegistry, NodeStatus, Resolver, SkipReason};
    use crate::prelude::Settings;
    use crate::recording::{Recording, Timebase};

    fn constant(name: &str, hz: f64, len: usize, value: f64) -> Channel {
        Channel::new(name, Timebase::new(hz, 0.0), MaskedArray::new(vec![value; len]))
    }

    fn registry() -> NodeRegistry {
        NodeRegistry::new(vec![Box::new(AccelerationForwardsForFlightPhases)]).unwrap()
    }

    #[test]
    fn level_flight_reads_one_g() {
        let mut recording = Recording::new();
        recording.insert_channel(constant(ACCELERATION_NORMAL, 8.0, 16, 1.0));
        recording.insert_channel(constant(ACCELERATION_LATERAL, 4.0, 8, 0.0));
        recording.insert_channel(constant(ACCELERATION_LONGITUDINAL, 4.0, 8, 0.0));
        recording.insert_channel(constant(PITCH, 2.0, 4, 0.0));
        recording.insert_channel(constant(ROLL, 2.0, 4, 0.0));

        let settings = Settings::default();
        let node = AccelerationVertical;
        let inputs = NodeInputs::new(node.name(), &node.dependencies(), &recording, &settings);
        let derived = node.derive(&inputs).unwrap();
        assert_eq!(derived.timebase.hz, 8.0);
        assert!(derived.array.iter().all(|v| v == Some(1.0)));
    }

    #[test]
    fn forwards_acceleration_falls_back_on_airspeed() {
        let mut recording = Recording::new();
        let airspeed: Vec<f64> = (0..10).map(|i| 100.0 + 2.0 * i as f64).collect();
        recording.insert_channel(Channel::new(
            AIRSPEED,
            Timebase::new(1.0, 0.0),
            MaskedArray::new(airspeed),
        ));

        let registry = registry();
        let report = Resolver::new(&registry, Settings::default()).resolve(&mut recording);
        assert_eq!(
            report.status("Acceleration Forwards For Flight Phases"),
            Some(&NodeStatus::Derived {
                inputs: vec![AIRSPEED.to_string()]
            })
        );
        let settings = Settings::default();
        let expected = 2.0 * settings.kts_to_fps / settings.gravity;
        let channel = recording.channel("Acceleration Forwards For Flight Phases").unwrap();
        assert!(channel.array.iter().all(|v| (v.unwrap() - expected).abs() < 1e-12));
    }

    #[test]
    fn forwards_acceleration_prefers_longitudinal_accelerometer() {
        let mut recording = Recording::new();
        recording.insert_channel(constant(AIRSPEED, 1.0, 10, 150.0));
        recording.insert_channel(constant(ACCELERATION_LONGITUDINAL, 4.0, 40, 0.1));

        let registry = registry();
        Resolver::new(&registry, Settings::default()).resolve(&mut recording);
        let channel = recording.channel("Acceleration Forwards For Flight Phases").unwrap();
        assert_eq!(channel.hz(), 4.0);
        assert!(channel.array.iter().all(|v| v == Some(0.1)));
    }

    #[test]
    fn single_airspeed_sample_derives_masked_rates() {
        let mut recording = Recording::new();
        recording.insert_channel(constant(AIRSPEED, 1.0, 1, 150.0));

        let registry = NodeRegistry::new(vec![
            Box::new(AccelerationFromAirspeed),
            Box::new(AccelerationForwardsForFlightPhases),
        ])
        .unwrap();
        let report = Resolver::new(&registry, Settings::default()).resolve(&mut recording);
        assert!(report.failed().is_empty());
        let rate = recording.channel("Acceleration From Airspeed").unwrap();
        assert_eq!(rate.array.count_masked(), 1);
    }

    #[test]
    fn forwards_acceleration_skipped_without_airspeed_or_accelerometer() {
        let mut recording = Recording::new();
        let registry = registry();
        let report = Resolver::new(&registry, Settings::default()).resolve(&mut recording);
        assert_eq!(
            report.status("Acceleration Forwards For Flight Phases"),
            Some(&NodeStatus::Skipped(SkipReason::MissingInputs {
                missing: vec![AIRSPEED.to_string(), ACCELERATION_LONGITUDINAL.to_string()]
            }))
        );
        assert!(recording.channel("Acceleration Forwards For Flight Phases").is_none());
    }
}
