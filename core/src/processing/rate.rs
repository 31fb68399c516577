use crate::recording::{Channel, MaskedArray};

/// Differentiates a channel over `half_width` samples either side.
///
/// Interior samples use the central difference `(x[i+w] - x[i-w]) / (2w/hz)`;
/// the first and last `w` samples fall back to a single-sample one-sided
/// difference, which is also all a channel no longer than the window gets. A
/// masked operand masks that output sample, so differences are
/// never taken across a gap. Units are per second.
pub fn rate_of_change(channel: &Channel, half_width: usize) -> MaskedArray {
    let array = &channel.array;
    let hz = channel.hz();
    let len = array.len();
    let w = half_width.max(1);
    let mut slope = MaskedArray::masked(len);
    if len < 2 {
        return slope;
    }

    for idx in 0..len {
        let (lo, hi, span) = if idx >= w && idx + w < len {
            (idx - w, idx + w, 2 * w)
        } else if idx < w && idx + 1 < len {
            (idx, idx + 1, 1)
        } else {
            (idx - 1, idx, 1)
        };
        if let (Some(a), Some(b)) = (array.get(lo), array.get(hi)) {
            slope.set(idx, (b - a) * hz / span as f64);
        }
    }
    slope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::Timebase;

    #[test]
    fn linear_ramp_has_constant_slope_including_edges() {
        let data: Vec<f64> = (0..20).map(|i| 3.0 * i as f64).collect();
        let channel = Channel::new("x", Timebase::new(2.0, 0.0), MaskedArray::new(data));
        let slope = rate_of_change(&channel, 2);
        assert!(slope.iter().all(|v| (v.unwrap() - 6.0).abs() < 1e-12));
    }

    #[test]
    fn masked_sample_masks_dependent_outputs_only() {
        let mut array = MaskedArray::new((0..10).map(f64::from).collect());
        array.set_masked(5);
        let channel = Channel::new("x", Timebase::new(1.0, 0.0), array);
        let slope = rate_of_change(&channel, 1);
        assert!(slope.is_masked(4));
        assert!(slope.is_masked(6));
        assert!(!slope.is_masked(5));
        assert_eq!(slope.get(5), Some(1.0));
    }

    #[test]
    fn channel_as_long_as_window_uses_one_sided_differences() {
        let channel = Channel::new("x", Timebase::new(1.0, 0.0), MaskedArray::new(vec![0.0, 10.0]));
        let slope = rate_of_change(&channel, 2);
        assert_eq!(slope.iter().collect::<Vec<_>>(), vec![Some(10.0), Some(10.0)]);
    }

    #[test]
    fn channel_shorter_than_window_uses_one_sided_differences() {
        let channel = Channel::new("x", Timebase::new(2.0, 0.0), MaskedArray::new(vec![0.0, 1.0, 3.0]));
        let slope = rate_of_change(&channel, 4);
        assert_eq!(slope.iter().collect::<Vec<_>>(), vec![Some(2.0), Some(4.0), Some(4.0)]);
    }

    #[test]
    fn too_short_input_is_masked() {
        let channel = Channel::new("x", Timebase::new(1.0, 0.0), MaskedArray::new(vec![1.0]));
        assert_eq!(rate_of_change(&channel, 1).count_masked(), 1);
    }
}
