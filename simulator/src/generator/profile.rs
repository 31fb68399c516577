use anyhow::{ensure, Context};
use flightcore::parameters::{
    ACCELERATION_LATERAL, ACCELERATION_LONGITUDINAL, ACCELERATION_NORMAL, AIRSPEED,
    ALTITUDE_RADIO_SENSOR, ALTITUDE_STD, DIST_GEAR_TO_TAIL, HEADING_MAGNETIC, MAGNETIC_DEVIATION,
    MAIN_GEAR_TO_ALTITUDE_RADIO, PITCH, PITCH_1, PITCH_2, ROLL, VREF,
};
use flightcore::recording::{
    Attribute, Channel, MaskedArray, PhaseKind, Recording, Span, Timebase,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::{piecewise_linear, sample};

const GRAVITY: f64 = 32.2;
const KTS_TO_FPS: f64 = 1.68781;
const TAKEOFF_ROLL_START: f64 = 120.0;
const TAKEOFF_ROLL: f64 = 40.0;
const LANDING_TO_END: f64 = 180.0;
const FAST_AIRSPEED: f64 = 80.0;

/// Configuration for generating a synthetic flight recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub duration_s: f64,
    pub seed: u64,
    /// Relative noise amplitude applied to every channel.
    pub noise: f64,
    /// Probability that any pressure-altitude sample is corrupt.
    pub dropout_rate: f64,
    pub origin_elevation: f64,
    pub destination_elevation: f64,
    pub cruise_altitude: f64,
    /// Climb rate in ft/s.
    pub climb_rate: f64,
    /// Descent rate in ft/s.
    pub descent_rate: f64,
    pub engines: usize,
    /// Record pitch from two half-rate sensors instead of one.
    pub dual_pitch: bool,
    pub vref: f64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            duration_s: 3600.0,
            seed: 0,
            noise: 0.02,
            dropout_rate: 0.002,
            origin_elevation: 200.0,
            destination_elevation: 1200.0,
            cruise_altitude: 35_000.0,
            climb_rate: 30.0,
            descent_rate: 25.0,
            engines: 2,
            dual_pitch: true,
            vref: 135.0,
            description: None,
            scenario: None,
        }
    }
}

/// Key times of the generated flight, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTimes {
    pub liftoff: f64,
    pub top_of_climb: f64,
    pub top_of_descent: f64,
    pub touchdown: f64,
}

/// Continuous truth the recorded channels are sampled from.
pub struct FlightProfile {
    config: GeneratorConfig,
    times: FlightTimes,
}

impl FlightProfile {
    pub fn new(config: &GeneratorConfig) -> anyhow::Result<Self> {
        ensure!(config.climb_rate > 0.0, "climb rate must be positive");
        ensure!(config.descent_rate > 0.0, "descent rate must be positive");
        ensure!(
            config.cruise_altitude > config.origin_elevation.max(config.destination_elevation),
            "cruise altitude must be above both airfields"
        );
        let liftoff = TAKEOFF_ROLL_START + TAKEOFF_ROLL;
        let top_of_climb =
            liftoff + (config.cruise_altitude - config.origin_elevation) / config.climb_rate;
        let touchdown = config.duration_s - LANDING_TO_END;
        let top_of_descent =
            touchdown - (config.cruise_altitude - config.destination_elevation) / config.descent_rate;
        ensure!(
            top_of_descent >= top_of_climb,
            "duration {} s is too short to reach cruise and land",
            config.duration_s
        );

        Ok(Self {
            config: config.clone(),
            times: FlightTimes {
                liftoff,
                top_of_climb,
                top_of_descent,
                touchdown,
            },
        })
    }

    pub fn times(&self) -> FlightTimes {
        self.times
    }

    pub fn altitude(&self, t: f64) -> f64 {
        let FlightTimes {
            liftoff,
            top_of_climb,
            top_of_descent,
            touchdown,
        } = self.times;
        piecewise_linear(
            &[
                (liftoff, self.config.origin_elevation),
                (top_of_climb, self.config.cruise_altitude),
                (top_of_descent, self.config.cruise_altitude),
                (touchdown, self.config.destination_elevation),
            ],
            t,
        )
    }

    /// Height of the main gear above the local ground.
    pub fn height(&self, t: f64) -> f64 {
        let ground = if t < self.times.top_of_climb {
            self.config.origin_elevation
        } else {
            self.config.destination_elevation
        };
        (self.altitude(t) - ground).max(0.0)
    }

    pub fn airspeed(&self, t: f64) -> f64 {
        let FlightTimes {
            liftoff,
            top_of_climb,
            top_of_descent,
            touchdown,
        } = self.times;
        piecewise_linear(
            &[
                (TAKEOFF_ROLL_START, 10.0),
                (liftoff, 150.0),
                (liftoff + 60.0, 250.0),
                (top_of_climb, 280.0),
                (top_of_descent, 280.0),
                (touchdown - 120.0, 160.0),
                (touchdown, self.config.vref),
                (touchdown + 40.0, 20.0),
                (touchdown + 60.0, 10.0),
            ],
            t,
        )
    }

    /// Unwrapped heading; includes a right turn through north in cruise.
    pub fn heading(&self, t: f64) -> f64 {
        let toc = self.times.top_of_climb;
        piecewise_linear(&[(toc, 340.0), (toc + 30.0, 430.0)], t)
    }

    pub fn pitch(&self, t: f64) -> f64 {
        let FlightTimes {
            liftoff,
            top_of_climb,
            top_of_descent,
            touchdown,
        } = self.times;
        piecewise_linear(
            &[
                (liftoff - 5.0, 0.0),
                (liftoff, 10.0),
                (top_of_climb, 10.0),
                (top_of_climb + 10.0, 2.0),
                (top_of_descent, 2.0),
                (top_of_descent + 10.0, -2.0),
                (touchdown - 5.0, -2.0),
                (touchdown, 4.0),
                (touchdown + 10.0, 0.0),
            ],
            t,
        )
    }

    pub fn roll(&self, t: f64) -> f64 {
        let toc = self.times.top_of_climb;
        piecewise_linear(
            &[(toc, 0.0), (toc + 3.0, 25.0), (toc + 27.0, 25.0), (toc + 30.0, 0.0)],
            t,
        )
    }

    /// Earth-vertical load factor in g.
    pub fn vertical_load(&self, t: f64) -> f64 {
        let dt = 0.125;
        let accel =
            (self.altitude(t + dt) - 2.0 * self.altitude(t) + self.altitude(t - dt)) / (dt * dt);
        1.0 + accel / GRAVITY
    }

    /// Longitudinal acceleration in g.
    pub fn longitudinal_load(&self, t: f64) -> f64 {
        let dt = 0.25;
        let kts_per_s = (self.airspeed(t + dt) - self.airspeed(t - dt)) / (2.0 * dt);
        kts_per_s * KTS_TO_FPS / GRAVITY
    }

    pub fn engine_n1(&self, t: f64) -> f64 {
        let FlightTimes {
            liftoff,
            top_of_climb,
            top_of_descent,
            touchdown,
        } = self.times;
        piecewise_linear(
            &[
                (TAKEOFF_ROLL_START - 5.0, 25.0),
                (TAKEOFF_ROLL_START, 95.0),
                (liftoff + 60.0, 92.0),
                (top_of_climb, 88.0),
                (top_of_climb + 20.0, 82.0),
                (top_of_descent, 82.0),
                (top_of_descent + 20.0, 35.0),
                (touchdown - 120.0, 55.0),
                (touchdown, 40.0),
                (touchdown + 20.0, 70.0),
                (touchdown + 40.0, 25.0),
            ],
            t,
        )
    }
}

struct Noise {
    rng: StdRng,
    amplitude: f64,
}

impl Noise {
    fn new(config: &GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            amplitude: config.noise.max(0.0),
        }
    }

    fn jitter(&mut self, scale: f64) -> f64 {
        let range = self.amplitude * scale;
        if range > 0.0 {
            self.rng.gen_range(-range..range)
        } else {
            0.0
        }
    }

    fn apply(&mut self, array: MaskedArray, scale: f64) -> MaskedArray {
        let values = array.iter().map(|v| v.map(|x| x + self.jitter(scale))).collect::<Vec<_>>();
        MaskedArray::from_options(values)
    }

    fn dropouts(&mut self, array: &mut MaskedArray, rate: f64) {
        let p = rate.clamp(0.0, 1.0);
        for idx in 0..array.len() {
            if p > 0.0 && self.rng.gen_bool(p) {
                array.set_masked(idx);
            }
        }
    }
}

/// Half-open index runs of a timebase where `predicate(t)` holds.
fn runs_where(
    timebase: Timebase,
    len: usize,
    kind: PhaseKind,
    predicate: impl Fn(f64) -> bool,
) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = None;
    for idx in 0..len {
        match (predicate(timebase.time_of(idx)), start) {
            (true, None) => start = Some(idx),
            (false, Some(s)) => {
                spans.push(Span::new(kind, s, idx));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(Span::new(kind, s, len));
    }
    spans
}

pub fn build_recording_from_config(config: &GeneratorConfig) -> anyhow::Result<Recording> {
    let profile = FlightProfile::new(config).context("building flight profile")?;
    let duration = config.duration_s;
    let mut noise = Noise::new(config);
    let mut recording = Recording::new();

    let alt_tb = Timebase::new(1.0, 0.25);
    let mut altitude = noise.apply(sample(alt_tb, duration, |t| profile.altitude(t)), 20.0);
    noise.dropouts(&mut altitude, config.dropout_rate);
    let alt_len = altitude.len();
    recording.insert_channel(Channel::new(ALTITUDE_STD, alt_tb, altitude));

    let radio = sample(Timebase::new(2.0, 0.5), duration, |t| profile.height(t).min(2500.0));
    recording.insert_channel(Channel::new(
        ALTITUDE_RADIO_SENSOR,
        Timebase::new(2.0, 0.5),
        noise.apply(radio, 5.0).map(|v| v.max(0.0)),
    ));

    let airspeed = sample(Timebase::new(1.0, 0.5), duration, |t| profile.airspeed(t));
    recording.insert_channel(Channel::new(
        AIRSPEED,
        Timebase::new(1.0, 0.5),
        noise.apply(airspeed, 10.0),
    ));

    let heading = sample(Timebase::new(1.0, 0.75), duration, |t| profile.heading(t));
    recording.insert_channel(Channel::new(
        HEADING_MAGNETIC,
        Timebase::new(1.0, 0.75),
        noise.apply(heading, 5.0).map(|h| h.rem_euclid(360.0)),
    ));

    let normal_tb = Timebase::new(8.0, 0.0);
    let normal = sample(normal_tb, duration, |t| profile.vertical_load(t));
    recording.insert_channel(Channel::new(ACCELERATION_NORMAL, normal_tb, noise.apply(normal, 0.5)));

    let axis_tb = Timebase::new(4.0, 0.125);
    let longitudinal = sample(axis_tb, duration, |t| profile.longitudinal_load(t));
    recording.insert_channel(Channel::new(
        ACCELERATION_LONGITUDINAL,
        axis_tb,
        noise.apply(longitudinal, 0.5),
    ));
    let lateral = sample(axis_tb, duration, |_| 0.0);
    recording.insert_channel(Channel::new(ACCELERATION_LATERAL, axis_tb, noise.apply(lateral, 0.5)));

    if config.dual_pitch {
        for (name, offset) in [(PITCH_1, 0.0), (PITCH_2, 0.5)] {
            let tb = Timebase::new(2.0, offset);
            let pitch = sample(tb, duration, |t| profile.pitch(t));
            recording.insert_channel(Channel::new(name, tb, noise.apply(pitch, 5.0)));
        }
    } else {
        let tb = Timebase::new(4.0, 0.0);
        let pitch = sample(tb, duration, |t| profile.pitch(t));
        recording.insert_channel(Channel::new(PITCH, tb, noise.apply(pitch, 5.0)));
    }

    let roll_tb = Timebase::new(2.0, 0.25);
    let roll = sample(roll_tb, duration, |t| profile.roll(t));
    recording.insert_channel(Channel::new(ROLL, roll_tb, noise.apply(roll, 5.0)));

    for engine in 1..=config.engines.clamp(1, 4) {
        let tb = Timebase::new(1.0, (engine as f64 * 0.2).fract());
        let n1 = sample(tb, duration, |t| profile.engine_n1(t) + engine as f64 * 0.5);
        recording.insert_channel(Channel::new(
            format!("Eng ({}) N1", engine),
            tb,
            noise.apply(n1.clone(), 10.0),
        ));
        recording.insert_channel(Channel::new(
            format!("Eng ({}) N2", engine),
            tb,
            noise.apply(n1.map(|v| 15.0 + v * 0.9), 10.0),
        ));
    }

    let slow_tb = Timebase::new(0.25, 0.0);
    recording.insert_channel(Channel::new(VREF, slow_tb, sample(slow_tb, duration, |_| config.vref)));
    recording.insert_channel(Channel::new(
        MAGNETIC_DEVIATION,
        slow_tb,
        sample(slow_tb, duration, |_| -2.5),
    ));

    recording.insert_attribute(Attribute::number(MAIN_GEAR_TO_ALTITUDE_RADIO, 10.0));
    recording.insert_attribute(Attribute::number(DIST_GEAR_TO_TAIL, 45.0));
    if let Some(name) = config.scenario.as_ref() {
        recording.insert_attribute(Attribute::text("Scenario", name.clone()));
    }

    let times = profile.times();
    recording.insert_spans(runs_where(alt_tb, alt_len, PhaseKind::Fast, |t| {
        profile.airspeed(t) > FAST_AIRSPEED
    }));
    recording.insert_spans(runs_where(alt_tb, alt_len, PhaseKind::Airborne, |t| {
        t > times.liftoff && t < times.touchdown
    }));

    Ok(recording)
}

#[allow(dead_code)]
pub fn build_recording(duration_s: f64, seed: u64) -> anyhow::Result<Recording> {
    let config = GeneratorConfig {
        duration_s,
        seed,
        ..Default::default()
    };
    build_recording_from_config(&config)
}
