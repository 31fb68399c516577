use crate::graph::{Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::prelude::DeriveResult;
use crate::processing::{align_channel, rate_of_change, repair_mask, straighten_headings};

use super::{HEADING_CONTINUOUS, HEADING_MAGNETIC, MAGNETIC_DEVIATION};

/// Heading without the jump through north, for all internal computation.
/// Taking it modulo 360 gives the value to display.
pub struct HeadingContinuous;

impl DerivedParameter for HeadingContinuous {
    fn name(&self) -> &'static str {
        HEADING_CONTINUOUS
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[HEADING_MAGNETIC])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let heading = inputs.require(HEADING_MAGNETIC)?;
        let straight = straighten_headings(&heading.array);
        let repaired = repair_mask(&straight, heading.hz(), Some(inputs.settings().repair_duration));
        Ok(Derived::like(heading, repaired))
    }
}

pub struct HeadingTrue;

impl DerivedParameter for HeadingTrue {
    fn name(&self) -> &'static str {
        "Heading True"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[HEADING_CONTINUOUS, MAGNETIC_DEVIATION])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let heading = inputs.require(HEADING_CONTINUOUS)?;
        let deviation = align_channel(inputs.require(MAGNETIC_DEVIATION)?, heading);
        Ok(Derived::like(heading, heading.combine(&deviation, |h, d| h + d)?))
    }
}

/// Degrees per second.
pub struct RateOfTurn;

impl DerivedParameter for RateOfTurn {
    fn name(&self) -> &'static str {
        "Rate Of Turn"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[HEADING_CONTINUOUS])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let heading = inputs.require(HEADING_CONTINUOUS)?;
        Ok(Derived::like(heading, rate_of_change(heading, 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeRegistry, Resolver};
    use crate::prelude::Settings;
    use crate::recording::{Channel, MaskedArray, Recording, Timebase};

    #[test]
    fn turn_through_north_has_steady_rate() {
        let mut recording = Recording::new();
        let raw: Vec<f64> = (0..20).map(|i| (340.0 + 3.0 * i as f64).rem_euclid(360.0)).collect();
        recording.insert_channel(Channel::new(
            HEADING_MAGNETIC,
            Timebase::new(1.0, 0.0),
            MaskedArray::new(raw),
        ));

        let registry =
            NodeRegistry::new(vec![Box::new(RateOfTurn), Box::new(HeadingContinuous)]).unwrap();
        Resolver::new(&registry, Settings::default()).resolve(&mut recording);

        let continuous = recording.channel(HEADING_CONTINUOUS).unwrap();
        assert_eq!(continuous.array.get(19), Some(397.0));
        let rate = recording.channel("Rate Of Turn").unwrap();
        assert!(rate.array.iter().all(|v| (v.unwrap() - 3.0).abs() < 1e-9));
    }
}
