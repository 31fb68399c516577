use crate::prelude::{DeriveError, DeriveResult};
use crate::recording::MaskedArray;

/// Bilinear-transform coefficients of a single-pole filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrder {
    pub b0: f64,
    pub b1: f64,
    pub a1: f64,
    /// Output per unit of constant input once settled.
    pub dc_gain: f64,
}

impl FirstOrder {
    /// Low-pass `gain / (1 + tau·s)`.
    pub fn lag(time_constant: f64, hz: f64, gain: f64) -> DeriveResult<Self> {
        let tc = scaled_time_constant(time_constant, hz)?;
        let b = gain / (1.0 + 2.0 * tc);
        Ok(Self {
            b0: b,
            b1: b,
            a1: (1.0 - 2.0 * tc) / (1.0 + 2.0 * tc),
            dc_gain: gain,
        })
    }

    /// High-pass `gain·tau·s / (1 + tau·s)`.
    pub fn washout(time_constant: f64, hz: f64, gain: f64) -> DeriveResult<Self> {
        let tc = scaled_time_constant(time_constant, hz)?;
        let b = gain * 2.0 * tc / (1.0 + 2.0 * tc);
        Ok(Self {
            b0: b,
            b1: -b,
            a1: (1.0 - 2.0 * tc) / (1.0 + 2.0 * tc),
            dc_gain: 0.0,
        })
    }

    /// Filter state that is already settled on a constant `value`.
    pub fn settled_state(&self, value: f64) -> f64 {
        (self.dc_gain - self.b0) * value
    }

    /// One transposed direct-form II step, returning `(output, next_state)`.
    pub fn step(&self, state: f64, input: f64) -> (f64, f64) {
        let output = self.b0 * input + state;
        let next = self.b1 * input - self.a1 * output;
        (output, next)
    }

    /// Runs the filter over a whole array. Masked samples stay masked and
    /// leave the state untouched.
    pub fn apply(&self, input: &MaskedArray, initial_value: Option<f64>) -> MaskedArray {
        let mut output = MaskedArray::masked(input.len());
        let initial = match initial_value.or_else(|| input.first_valid()) {
            Some(value) => value,
            None => return output,
        };
        let mut state = self.settled_state(initial);
        for (idx, sample) in input.iter().enumerate() {
            if let Some(x) = sample {
                let (y, next) = self.step(state, x);
                output.set(idx, y);
                state = next;
            }
        }
        output
    }
}

fn scaled_time_constant(time_constant: f64, hz: f64) -> DeriveResult<f64> {
    let tc = time_constant * hz;
    if !tc.is_finite() || tc < 0.5 {
        return Err(DeriveError::InvalidInput(format!(
            "time constant {} s at {} Hz is too short for a stable filter",
            time_constant, hz
        )));
    }
    Ok(tc)
}

/// First-order lag (low-pass) over a full array.
pub fn first_order_lag(
    input: &MaskedArray,
    time_constant: f64,
    hz: f64,
    gain: f64,
    initial_value: Option<f64>,
) -> DeriveResult<MaskedArray> {
    Ok(FirstOrder::lag(time_constant, hz, gain)?.apply(input, initial_value))
}

/// First-order washout (high-pass) over a full array.
///
/// Constant input settles to zero; a ramp of slope `v` settles to
/// `v · time_constant · gain`.
pub fn first_order_washout(
    input: &MaskedArray,
    time_constant: f64,
    hz: f64,
    gain: f64,
    initial_value: Option<f64>,
) -> DeriveResult<MaskedArray> {
    Ok(FirstOrder::washout(time_constant, hz, gain)?.apply(input, initial_value))
}
