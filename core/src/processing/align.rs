use crate::recording::{Channel, MaskedArray};

/// Fractional positions this close to an integer read that sample directly.
const SNAP: f64 = 1e-9;

/// Resamples `source` onto the timestamps of `target`.
///
/// The output always has `target.len()` samples. Equal timebases copy the
/// source unchanged; anything else interpolates linearly between the two
/// bracketing source samples. Target times outside the source record hold
/// the nearest edge sample.
pub fn align(source: &Channel, target: &Channel) -> MaskedArray {
    let len = target.len();
    if source.timebase == target.timebase && source.len() == len {
        return source.array.clone();
    }

    let src = &source.array;
    let mut aligned = MaskedArray::masked(len);
    if src.is_empty() {
        return aligned;
    }
    let last = src.len() - 1;

    for idx in 0..len {
        let t = target.timebase.time_of(idx);
        let position = source.timebase.position_of(t).clamp(0.0, last as f64);
        let nearest = position.round();
        if (position - nearest).abs() < SNAP {
            if let Some(value) = src.get(nearest as usize) {
                aligned.set(idx, value);
            }
            continue;
        }

        let lower = position.floor() as usize;
        let upper = (lower + 1).min(last);
        let weight = position - lower as f64;
        if let (Some(a), Some(b)) = (src.get(lower), src.get(upper)) {
            aligned.set(idx, a + (b - a) * weight);
        }
    }
    aligned
}

/// Aligns `source` and wraps it as a channel on the target's timebase.
pub fn align_channel(source: &Channel, target: &Channel) -> Channel {
    Channel::new(source.name.clone(), target.timebase, align(source, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::Timebase;

    fn channel(name: &str, hz: f64, offset: f64, data: Vec<f64>) -> Channel {
        Channel::new(name, Timebase::new(hz, offset), MaskedArray::new(data))
    }

    #[test]
    fn identical_timebase_is_identity() {
        let data = vec![0.1, -3.7, 1e6, 42.0, f64::MIN_POSITIVE];
        let source = channel("a", 4.0, 0.25, data.clone());
        let target = channel("b", 4.0, 0.25, vec![0.0; 5]);
        let aligned = align(&source, &target);
        assert_eq!(aligned.data(), data.as_slice());
        assert_eq!(aligned.count_masked(), 0);
    }

    #[test]
    fn output_length_follows_target() {
        let source = channel("a", 1.0, 0.0, (0..10).map(f64::from).collect());
        for (hz, offset, len) in [(4.0, 0.5, 40), (0.5, 0.0, 5), (1.5, 0.3, 13), (1.0, 0.9, 3)] {
            let target = channel("b", hz, offset, vec![0.0; len]);
            assert_eq!(align(&source, &target).len(), len);
        }
    }

    #[test]
    fn upsampling_interpolates_linearly() {
        let source = channel("slow", 1.0, 0.0, vec![0.0, 10.0, 20.0]);
        let target = channel("fast", 2.0, 0.0, vec![0.0; 6]);
        let aligned = align(&source, &target);
        let values: Vec<f64> = aligned.iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![0.0, 5.0, 10.0, 15.0, 20.0, 20.0]);
    }

    #[test]
    fn integer_downsampling_decimates() {
        let source = channel("fast", 4.0, 0.0, (0..16).map(f64::from).collect());
        let target = channel("slow", 1.0, 0.0, vec![0.0; 4]);
        let values: Vec<f64> = align(&source, &target).iter().map(Option::unwrap).collect();
        assert_eq!(values, vec![0.0, 4.0, 8.0, 12.0]);
    }

    #[test]
    fn phase_shift_moves_by_fraction_of_sample() {
        let source = channel("a", 1.0, 0.0, vec![0.0, 10.0, 20.0, 30.0]);
        let target = channel("b", 1.0, 0.5, vec![0.0; 4]);
        let aligned = align(&source, &target);
        assert!((aligned.get(0).unwrap() - 5.0).abs() < 1e-12);
        assert!((aligned.get(2).unwrap() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn masked_source_sample_masks_overlapping_outputs() {
        let mut source = channel("a", 1.0, 0.0, vec![0.0, 10.0, 20.0, 30.0]);
        source.array.set_masked(1);
        let target = channel("b", 2.0, 0.0, vec![0.0; 8]);
        let aligned = align(&source, &target);
        assert!(!aligned.is_masked(0));
        assert!(aligned.is_masked(1));
        assert!(aligned.is_masked(2));
        assert!(aligned.is_masked(3));
        assert_eq!(aligned.get(4), Some(20.0));
    }
}
