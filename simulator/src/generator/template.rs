use flightcore::recording::{MaskedArray, Timebase};

/// Linear interpolation through `(time, value)` knots, holding the end
/// values outside them. Knots must be in time order.
pub fn piecewise_linear(knots: &[(f64, f64)], t: f64) -> f64 {
    match knots {
        [] => 0.0,
        [(_, only)] => *only,
        _ => {
            if t <= knots[0].0 {
                return knots[0].1;
            }
            for pair in knots.windows(2) {
                let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
                if t <= t1 {
                    if t1 <= t0 {
                        return v1;
                    }
                    return v0 + (v1 - v0) * (t - t0) / (t1 - t0);
                }
            }
            knots[knots.len() - 1].1
        }
    }
}

/// Samples `f(t)` at every timestamp of a channel of `duration_s` seconds.
pub fn sample(timebase: Timebase, duration_s: f64, f: impl Fn(f64) -> f64) -> MaskedArray {
    let len = (duration_s * timebase.hz).floor() as usize;
    MaskedArray::new((0..len).map(|idx| f(timebase.time_of(idx))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piecewise_linear_interpolates_and_holds() {
        let knots = [(0.0, 0.0), (10.0, 100.0), (20.0, 100.0)];
        assert_eq!(piecewise_linear(&knots, -5.0), 0.0);
        assert_eq!(piecewise_linear(&knots, 5.0), 50.0);
        assert_eq!(piecewise_linear(&knots, 15.0), 100.0);
        assert_eq!(piecewise_linear(&knots, 99.0), 100.0);
    }

    #[test]
    fn sample_length_follows_rate() {
        let array = sample(Timebase::new(4.0, 0.5), 10.0, |t| t);
        assert_eq!(array.len(), 40);
        assert_eq!(array.get(0), Some(0.125));
    }
}
