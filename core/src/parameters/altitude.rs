use crate::graph::{Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::math::stats::StatsHelper;
use crate::prelude::DeriveResult;
use crate::processing::{align_channel, hysteresis, repair_mask};
use crate::recording::{Channel, MaskedArray, PhaseKind, Span};

use super::{
    ALTITUDE_AAL, ALTITUDE_RADIO, ALTITUDE_RADIO_SENSOR, ALTITUDE_STD, DIST_GEAR_TO_TAIL,
    MAIN_GEAR_TO_ALTITUDE_RADIO, PITCH,
};

/// Height above the departure or arrival airfield from pressure altitude.
///
/// Within each span, samples up to the highest point are referenced to the
/// altitude at the start of the span and the rest to the altitude at its
/// end, so the two airfields may sit at different elevations. Zero outside
/// every span.
pub fn altitude_above_airfield(altitude: &MaskedArray, spans: &[Span]) -> MaskedArray {
    let mut aal = MaskedArray::zeros(altitude.len());
    for span in spans.iter().map(|s| s.clamp_to(altitude.len())) {
        let Some(peak) = StatsHelper::argmax(altitude, span.start, span.stop) else {
            for idx in span.start..span.stop {
                aal.set_masked(idx);
            }
            continue;
        };
        let takeoff = (span.start..span.stop).find_map(|idx| altitude.get(idx));
        let landing = (span.start..span.stop).rev().find_map(|idx| altitude.get(idx));
        for idx in span.start..span.stop {
            let reference = if idx < peak { takeoff } else { landing };
            match (altitude.get(idx), reference) {
                (Some(alt), Some(datum)) => aal.set(idx, alt - datum),
                _ => aal.set_masked(idx),
            }
        }
    }
    aal
}

/// Climb since the most recent descent within each span.
///
/// The floor starts at the first sample of a span and drops to any sample
/// lower than its predecessor, where the output is zero; elsewhere the output
/// is altitude minus floor. Zero outside every span.
pub fn climb_since_descent(altitude: &MaskedArray, spans: &[Span]) -> MaskedArray {
    let mut climb = MaskedArray::zeros(altitude.len());
    for span in spans.iter().map(|s| s.clamp_to(altitude.len())) {
        let mut floor = 0.0;
        let mut previous: Option<f64> = None;
        for idx in span.start..span.stop {
            let Some(alt) = altitude.get(idx) else {
                climb.set_masked(idx);
                continue;
            };
            match previous {
                Some(prev) if alt >= prev => climb.set(idx, alt - floor),
                _ => {
                    floor = alt;
                    climb.set(idx, 0.0);
                }
            }
            previous = Some(alt);
        }
    }
    climb
}

fn repaired(channel: &Channel, inputs: &NodeInputs<'_>) -> MaskedArray {
    repair_mask(
        &channel.array,
        channel.hz(),
        Some(inputs.settings().repair_duration),
    )
}

/// Subtracts the height change from pitching about the main gear.
fn pitch_corrected(radio: &Channel, pitch: &Channel, distance: f64) -> DeriveResult<MaskedArray> {
    let pitch = align_channel(pitch, radio);
    radio.combine(&pitch, |alt, p| alt - p.to_radians().sin() * distance)
}

pub struct AltitudeAalForFlightPhases;

impl DerivedParameter for AltitudeAalForFlightPhases {
    fn name(&self) -> &'static str {
        "Altitude AAL For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_STD, PhaseKind::Fast.name()])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let alt = inputs.require(ALTITUDE_STD)?;
        let aal = altitude_above_airfield(&repaired(alt, inputs), inputs.spans(PhaseKind::Fast));
        Ok(Derived::like(alt, aal))
    }
}

pub struct ClimbForFlightPhases;

impl DerivedParameter for ClimbForFlightPhases {
    fn name(&self) -> &'static str {
        "Climb For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_STD, PhaseKind::Airborne.name()])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let alt = inputs.require(ALTITUDE_STD)?;
        let climb = climb_since_descent(&repaired(alt, inputs), inputs.spans(PhaseKind::Airborne));
        Ok(Derived::like(alt, climb))
    }
}

pub struct AltitudeForClimbCruiseDescent;

impl DerivedParameter for AltitudeForClimbCruiseDescent {
    fn name(&self) -> &'static str {
        "Altitude For Climb Cruise Descent"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_STD])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let alt = inputs.require(ALTITUDE_STD)?;
        let band = inputs.settings().hysteresis_fpalt_ccd;
        Ok(Derived::like(alt, hysteresis(&alt.array, band)))
    }
}

pub struct AltitudeForFlightPhases;

impl DerivedParameter for AltitudeForFlightPhases {
    fn name(&self) -> &'static str {
        "Altitude For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_STD])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let alt = inputs.require(ALTITUDE_STD)?;
        let band = inputs.settings().hysteresis_fpalt;
        Ok(Derived::like(alt, hysteresis(&repaired(alt, inputs), band)))
    }
}

/// Radio altitude referenced to the main wheels rather than the antenna.
/// The rigging distance is positive when the antenna is forward of the gear.
pub struct AltitudeRadio;

impl DerivedParameter for AltitudeRadio {
    fn name(&self) -> &'static str {
        ALTITUDE_RADIO
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_RADIO_SENSOR, PITCH, MAIN_GEAR_TO_ALTITUDE_RADIO])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let sensor = inputs.require(ALTITUDE_RADIO_SENSOR)?;
        let pitch = inputs.require(PITCH)?;
        let distance = inputs.require_number(MAIN_GEAR_TO_ALTITUDE_RADIO)?;
        Ok(Derived::like(sensor, pitch_corrected(sensor, pitch, distance)?))
    }
}

pub struct AltitudeRadioForFlightPhases;

impl DerivedParameter for AltitudeRadioForFlightPhases {
    fn name(&self) -> &'static str {
        "Altitude Radio For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_RADIO])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let radio = inputs.require(ALTITUDE_RADIO)?;
        let band = inputs.settings().hysteresis_fp_rad_alt;
        Ok(Derived::like(radio, hysteresis(&repaired(radio, inputs), band)))
    }
}

/// Height of the tail point most likely to scrape, from radio altitude.
pub struct AltitudeTail;

impl DerivedParameter for AltitudeTail {
    fn name(&self) -> &'static str {
        "Altitude Tail"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_RADIO, PITCH, DIST_GEAR_TO_TAIL])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let radio = inputs.require(ALTITUDE_RADIO)?;
        let pitch = inputs.require(PITCH)?;
        let distance = inputs.require_number(DIST_GEAR_TO_TAIL)?;
        Ok(Derived::like(radio, pitch_corrected(radio, pitch, distance)?))
    }
}

/// Terrain height under the aircraft relative to the airfield.
pub struct Relief;

impl DerivedParameter for Relief {
    fn name(&self) -> &'static str {
        "Relief"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_AAL, ALTITUDE_RADIO])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let aal = inputs.require(ALTITUDE_AAL)?;
        let radio = inputs.require(ALTITUDE_RADIO)?;
        let relief = align_channel(aal, radio).combine(radio, |a, r| a - r)?;
        Ok(Derived::like(radio, relief))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Settings;
    use crate::recording::{Attribute, Recording, Timebase};

    fn values(array: &MaskedArray) -> Vec<f64> {
        array.iter().map(Option::unwrap).collect()
    }

    #[test]
    fn climb_tracks_floor_after_descent() {
        let alt = MaskedArray::new(vec![100.0, 110.0, 90.0, 95.0, 120.0]);
        let spans = [Span::new(PhaseKind::Airborne, 0, 5)];
        assert_eq!(values(&climb_since_descent(&alt, &spans)), vec![0.0, 10.0, 0.0, 5.0, 30.0]);
    }

    #[test]
    fn climb_is_zero_outside_spans() {
        let alt = MaskedArray::new(vec![100.0, 200.0, 300.0, 400.0, 500.0, 600.0]);
        let spans = [Span::new(PhaseKind::Airborne, 2, 4)];
        assert_eq!(values(&climb_since_descent(&alt, &spans)), vec![0.0, 0.0, 0.0, 100.0, 0.0, 0.0]);
    }

    #[test]
    fn airfield_reference_switches_at_peak() {
        // Depart at 100 ft, climb to 1000 ft, land at 300 ft.
        let alt = MaskedArray::new(vec![90.0, 100.0, 600.0, 1000.0, 700.0, 300.0, 310.0]);
        let spans = [Span::new(PhaseKind::Fast, 1, 6)];
        let aal = altitude_above_airfield(&alt, &spans);
        assert_eq!(values(&aal), vec![0.0, 0.0, 500.0, 700.0, 400.0, 0.0, 0.0]);
    }

    #[test]
    fn aal_node_repairs_gaps_before_referencing() {
        let mut recording = Recording::new();
        let mut array = MaskedArray::new(vec![0.0, 500.0, 1000.0, 500.0, 0.0]);
        array.set_masked(3);
        recording.insert_channel(Channel::new(ALTITUDE_STD, Timebase::new(1.0, 0.0), array));
        recording.insert_spans([Span::new(PhaseKind::Fast, 0, 5)]);

        let settings = Settings::default();
        let node = AltitudeAalForFlightPhases;
        let inputs = NodeInputs::new(node.name(), &node.dependencies(), &recording, &settings);
        let derived = node.derive(&inputs).unwrap();
        assert_eq!(values(&derived.array), vec![0.0, 500.0, 1000.0, 500.0, 0.0]);
    }

    #[test]
    fn tail_height_accounts_for_pitch_on_radio_timebase() {
        let mut recording = Recording::new();
        recording.insert_channel(Channel::new(
            ALTITUDE_RADIO,
            Timebase::new(2.0, 0.0),
            MaskedArray::new(vec![20.0; 4]),
        ));
        recording.insert_channel(Channel::new(
            PITCH,
            Timebase::new(1.0, 0.0),
            MaskedArray::new(vec![30.0; 2]),
        ));
        recording.insert_attribute(Attribute::number(DIST_GEAR_TO_TAIL, 10.0));

        let settings = Settings::default();
        let node = AltitudeTail;
        let inputs = NodeInputs::new(node.name(), &node.dependencies(), &recording, &settings);
        let derived = node.derive(&inputs).unwrap();
        assert_eq!(derived.array.len(), 4);
        for value in derived.array.iter() {
            assert!((value.unwrap() - 15.0).abs() < 1e-9);
        }
    }
}
