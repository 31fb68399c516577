//! Rate of climb from pressure altitude, radio altitude and vertical
//! acceleration.
//!
//! Pressure altitude rate is used above 100 ft and radio altitude rate below
//! 50 ft, with a linear changeover between. Near the ground the pressure
//! altitude is disturbed by the flow field around the aircraft; higher up the
//! radio altimeter follows the terrain profile.
//!
//! Both altitudes are washed out before they are blended, so datum
//! differences between them never reach the changeover. The blended altitude
//! rate and the lagged, washed-out acceleration form a complementary pair.
//! Washing out the acceleration removes accelerometer bias at the cost of
//! underscaling long sustained accelerations: a steady 1 ft/s² produces a rate
//! of climb growing at about 55 fpm per second instead of 60.

use crate::graph::{Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::math::filters::{first_order_lag, first_order_washout};
use crate::prelude::{DeriveError, DeriveResult, Settings};
use crate::processing::{align, rate_of_change, repair_mask};
use crate::recording::{Channel, MaskedArray};

use super::{ACCELERATION_VERTICAL, ALTITUDE_RADIO, ALTITUDE_STD};

/// Radio altitude below which the radio-derived rate is used exclusively (ft).
pub const CHANGEOVER_LOW: f64 = 50.0;
/// Width of the linear changeover band (ft).
pub const CHANGEOVER_BAND: f64 = 50.0;

/// Weight of the pressure-altitude rate at a given radio altitude.
pub fn changeover_ratio(radio_altitude: f64) -> f64 {
    ((radio_altitude - CHANGEOVER_LOW) / CHANGEOVER_BAND).clamp(0.0, 1.0)
}

/// Blends the washed-out altitudes by the changeover ratio and removes the
/// washout gain, giving an altitude rate per second.
pub fn blend_altitude_rates(
    baro_washout: &MaskedArray,
    radio_washout: &MaskedArray,
    radio_altitude: &MaskedArray,
    time_constant: f64,
) -> DeriveResult<MaskedArray> {
    let len = baro_washout.len();
    if radio_washout.len() != len || radio_altitude.len() != len {
        return Err(DeriveError::Misaligned {
            left: ALTITUDE_STD.into(),
            right: ALTITUDE_RADIO.into(),
            detail: format!(
                "washout lengths {} and {}, radio altitude length {}",
                len,
                radio_washout.len(),
                radio_altitude.len()
            ),
        });
    }

    let mut blended = MaskedArray::masked(len);
    for idx in 0..len {
        if let (Some(baro), Some(radio), Some(height)) = (
            baro_washout.get(idx),
            radio_washout.get(idx),
            radio_altitude.get(idx),
        ) {
            let ratio = changeover_ratio(height);
            blended.set(idx, (baro * ratio + radio * (1.0 - ratio)) / time_constant);
        }
    }
    Ok(blended)
}

/// Climb rate contribution of vertical acceleration (g) in ft/s.
pub fn inertial_rate(az: &MaskedArray, hz: f64, settings: &Settings) -> DeriveResult<MaskedArray> {
    let tc = settings.rate_of_climb_lag_tc;
    let washed = first_order_washout(az, settings.az_washout_tc, hz, 1.0, az.first_valid())?;
    first_order_lag(&washed, tc, hz, settings.gravity * tc, None)
}

/// Complementary-filter rate of climb in fpm on the acceleration timebase.
pub fn complementary_rate_of_climb(
    az: &Channel,
    altitude_std: &Channel,
    altitude_radio: &Channel,
    settings: &Settings,
) -> DeriveResult<MaskedArray> {
    let hz = az.hz();
    let tc = settings.rate_of_climb_lag_tc;

    let baro = align(altitude_std, az);
    let repaired_radio = Channel::new(
        altitude_radio.name.clone(),
        altitude_radio.timebase,
        repair_mask(
            &altitude_radio.array,
            altitude_radio.hz(),
            Some(settings.repair_duration),
        ),
    );
    let radio = align(&repaired_radio, az);

    let baro_washout = first_order_washout(&baro, tc, hz, 1.0, None)?;
    let radio_washout = first_order_washout(&radio, tc, hz, 1.0, None)?;
    let altitude_rate = blend_altitude_rates(&baro_washout, &radio_washout, &radio, tc)?;

    let altitude_rate = Channel::new(ALTITUDE_STD, az.timebase, altitude_rate);
    let inertial = Channel::new(
        ACCELERATION_VERTICAL,
        az.timebase,
        inertial_rate(&az.array, hz, settings)?,
    );
    Ok(altitude_rate.combine(&inertial, |a, i| a + i)?.scale(60.0))
}

/// Plain differentiated pressure altitude in fpm.
pub fn fallback_rate_of_climb(altitude_std: &Channel) -> MaskedArray {
    rate_of_change(altitude_std, 2).scale(60.0)
}

pub struct RateOfClimb;

impl DerivedParameter for RateOfClimb {
    fn name(&self) -> &'static str {
        "Rate Of Climb"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_STD]).with_optional(&[ACCELERATION_VERTICAL, ALTITUDE_RADIO])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let altitude_std = inputs.require(ALTITUDE_STD)?;
        match (inputs.channel(ACCELERATION_VERTICAL), inputs.channel(ALTITUDE_RADIO)) {
            (Some(az), Some(radio)) => Ok(Derived::like(
                az,
                complementary_rate_of_climb(az, altitude_std, radio, inputs.settings())?,
            )),
            _ => Ok(Derived::like(altitude_std, fallback_rate_of_climb(altitude_std))),
        }
    }
}

pub struct RateOfClimbForFlightPhases;

impl DerivedParameter for RateOfClimbForFlightPhases {
    fn name(&self) -> &'static str {
        "Rate Of Climb For Flight Phases"
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[ALTITUDE_STD])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let altitude_std = inputs.require(ALTITUDE_STD)?;
        let repaired = Channel::new(
            altitude_std.name.clone(),
            altitude_std.timebase,
            repair_mask(
                &altitude_std.array,
                altitude_std.hz(),
                Some(inputs.settings().repair_duration),
            ),
        );
        Ok(Derived::like(altitude_std, fallback_rate_of_climb(&repaired)))
    }
}
