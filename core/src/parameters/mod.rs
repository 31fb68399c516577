//! Catalog of derived flight parameters.

pub mod acceleration;
pub mod airspeed;
pub mod altitude;
pub mod attitude;
pub mod engine;
pub mod heading;
pub mod rate_of_climb;

use crate::graph::{DerivedParameter, NodeRegistry};
use crate::prelude::DeriveResult;

pub const ACCELERATION_LATERAL: &str = "Acceleration Lateral";
pub const ACCELERATION_LONGITUDINAL: &str = "Acceleration Longitudinal";
pub const ACCELERATION_NORMAL: &str = "Acceleration Normal";
pub const ACCELERATION_VERTICAL: &str = "Acceleration Vertical";
pub const AIRSPEED: &str = "Airspeed";
pub const ALTITUDE_AAL: &str = "Altitude AAL";
pub const ALTITUDE_RADIO: &str = "Altitude Radio";
pub const ALTITUDE_RADIO_SENSOR: &str = "Altitude Radio Sensor";
pub const ALTITUDE_STD: &str = "Altitude STD";
pub const HEADING_CONTINUOUS: &str = "Heading Continuous";
pub const HEADING_MAGNETIC: &str = "Heading Magnetic";
pub const MAGNETIC_DEVIATION: &str = "Magnetic Deviation";
pub const PITCH: &str = "Pitch";
pub const PITCH_1: &str = "Pitch (1)";
pub const PITCH_2: &str = "Pitch (2)";
pub const ROLL: &str = "Roll";
pub const VREF: &str = "Vref";

pub const DIST_GEAR_TO_TAIL: &str = "Dist Gear To Tail";
pub const MAIN_GEAR_TO_ALTITUDE_RADIO: &str = "Main Gear To Altitude Radio";

/// Every node shipped with the crate, in declaration order.
pub fn catalog() -> Vec<Box<dyn DerivedParameter>> {
    let mut nodes: Vec<Box<dyn DerivedParameter>> = vec![
        Box::new(acceleration::AccelerationVertical),
        Box::new(acceleration::AccelerationForwardsForFlightPhases),
        Box::new(acceleration::AccelerationFromAirspeed),
        Box::new(airspeed::AirspeedForFlightPhases),
        Box::new(airspeed::AirspeedMinusVref),
        Box::new(altitude::AltitudeAalForFlightPhases),
        Box::new(altitude::AltitudeForClimbCruiseDescent),
        Box::new(altitude::AltitudeForFlightPhases),
        Box::new(altitude::AltitudeRadio),
        Box::new(altitude::AltitudeRadioForFlightPhases),
        Box::new(altitude::AltitudeTail),
        Box::new(altitude::ClimbForFlightPhases),
        Box::new(altitude::Relief),
        Box::new(attitude::Pitch),
        Box::new(heading::HeadingContinuous),
        Box::new(heading::HeadingTrue),
        Box::new(heading::RateOfTurn),
        Box::new(rate_of_climb::RateOfClimb),
        Box::new(rate_of_climb::RateOfClimbForFlightPhases),
    ];
    nodes.extend(engine::engine_nodes());
    nodes
}

/// Registry over [`catalog`].
pub fn standard_registry() -> DeriveResult<NodeRegistry> {
    NodeRegistry::new(catalog())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_plans_without_cycles() {
        let registry = standard_registry().unwrap();
        assert_eq!(registry.len(), catalog().len());
        let waves = registry.waves();
        let position = |name: &str| waves.iter().position(|w| w.iter().any(|n| *n == name)).unwrap();
        assert!(position("Pitch") < position("Acceleration Vertical"));
        assert!(position("Acceleration Vertical") < position("Rate Of Climb"));
        assert!(position("Altitude Radio") < position("Rate Of Climb"));
        assert!(position("Heading Continuous") < position("Rate Of Turn"));
    }

    #[test]
    fn two_sample_pressure_altitude_resolves_without_failures() {
        use crate::graph::Resolver;
        use crate::prelude::Settings;
        use crate::recording::{Channel, MaskedArray, Recording, Timebase};

        let mut recording = Recording::new();
        recording.insert_channel(Channel::new(
            ALTITUDE_STD,
            Timebase::new(1.0, 0.0),
            MaskedArray::new(vec![0.0, 10.0]),
        ));
        let registry = standard_registry().unwrap();
        let report = Resolver::new(&registry, Settings::default()).resolve(&mut recording);

        assert!(report.failed().is_empty(), "{:?}", report);
        let roc = recording.channel("Rate Of Climb").unwrap();
        assert_eq!(roc.array.iter().collect::<Vec<_>>(), vec![Some(600.0), Some(600.0)]);
    }
}
