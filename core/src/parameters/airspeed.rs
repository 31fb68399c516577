use crate::graph::{Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::prelude::DeriveResult;
use crate::processing::{align_channel, hysteresis};

use super::{AIRSPEED, VREF};

pub struct AirspeedForFlightPhases;

impl DerivedParameter for AirspeedForFlightPhases {
    fn name(&self) -> &'static str {
        "Airspeed For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[AIRSPEED])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let airspeed = inputs.require(AIRSPEED)?;
        let band = inputs.settings().hysteresis_fpias;
        Ok(Derived::like(airspeed, hysteresis(&airspeed.array, band)))
    }
}

pub struct AirspeedMinusVref;

impl DerivedParameter for AirspeedMinusVref {
    fn name(&self) -> &'static str {
        "Airspeed Minus Vref"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[AIRSPEED, VREF])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let airspeed = inputs.require(AIRSPEED)?;
        let vref = align_channel(inputs.require(VREF)?, airspeed);
        Ok(Derived::like(airspeed, airspeed.combine(&vref, |a, v| a - v)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Settings;
    use crate::recording::{Channel, MaskedArray, Recording, Timebase};

    #[test]
    fn vref_is_aligned_before_subtracting() {
        let mut recording = Recording::new();
        recording.insert_channel(Channel::new(
            AIRSPEED,
            Timebase::new(2.0, 0.0),
            MaskedArray::new(vec![140.0, 141.0, 142.0, 143.0]),
        ));
        recording.insert_channel(Channel::new(
            VREF,
            Timebase::new(0.5, 0.0),
            MaskedArray::new(vec![130.0]),
        ));

        let settings = Settings::default();
        let node = AirspeedMinusVref;
        let inputs = NodeInputs::new(node.name(), &node.dependencies(), &recording, &settings);
        let derived = node.derive(&inputs).unwrap();
        let values: Vec<f64> = derived.array.iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![10.0, 11.0, 12.0, 13.0]);
    }
}
