use crate::recording::MaskedArray;

/// Backlash hysteresis with a total band of `band`.
///
/// The output holds its value until the input moves more than half the band
/// away, then follows at half-band distance. Masked samples stay masked and
/// do not move the held value.
pub fn hysteresis(array: &MaskedArray, band: f64) -> MaskedArray {
    let half = band / 2.0;
    let mut output = MaskedArray::masked(array.len());
    let mut held = match array.first_valid() {
        Some(value) => value,
        None => return output,
    };

    for (idx, sample) in array.iter().enumerate() {
        let Some(x) = sample else { continue };
        if x - held > half {
            held = x - half;
        } else if x - held < -half {
            held = x + half;
        }
        output.set(idx, held);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(array: &MaskedArray) -> usize {
        let values: Vec<f64> = array.iter().flatten().collect();
        values.windows(2).filter(|w| w[0] != w[1]).count()
    }

    #[test]
    fn chatter_inside_band_is_suppressed() {
        let band = 10.0;
        let data: Vec<f64> = (0..100)
            .map(|i| {
                let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
                250.0 + sign * (band / 2.0) * (i % 7) as f64 / 6.0
            })
            .collect();
        let mut signal = vec![250.0];
        signal.extend(data);
        let output = hysteresis(&MaskedArray::new(signal), band);
        assert!(output.iter().all(|v| v == Some(250.0)));
    }

    #[test]
    fn step_beyond_band_updates_once() {
        let mut data = vec![100.0; 20];
        data.extend(vec![130.0; 20]);
        data.extend(vec![100.0; 20]);
        let output = hysteresis(&MaskedArray::new(data), 10.0);
        assert_eq!(changes(&output), 2);
        assert_eq!(output.get(25), Some(125.0));
        assert_eq!(output.get(59), Some(105.0));
    }

    #[test]
    fn masked_samples_do_not_move_output() {
        let mut array = MaskedArray::new(vec![0.0, 0.0, 0.0, 0.0]);
        array.set_masked(1);
        let output = hysteresis(&array, 2.0);
        assert!(output.is_masked(1));
        assert_eq!(output.get(2), Some(0.0));
    }
}
