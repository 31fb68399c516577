use serde::{Deserialize, Serialize};

use crate::recording::MaskedArray;

/// Summary of the valid samples of an array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

pub struct StatsHelper;

impl StatsHelper {
    /// Returns `None` when every sample is masked.
    pub fn valid(array: &MaskedArray) -> Option<ValidStats> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in array.iter().flatten() {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return None;
        }
        Some(ValidStats {
            count,
            min,
            max,
            mean: sum / count as f64,
        })
    }

    /// Index of the largest valid sample in `[start, stop)`.
    pub fn argmax(array: &MaskedArray, start: usize, stop: usize) -> Option<usize> {
        (start..stop.min(array.len()))
            .filter_map(|idx| array.get(idx).map(|v| (idx, v)))
            .fold(None, |best: Option<(usize, f64)>, (idx, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((idx, v)),
            })
            .map(|(idx, _)| idx)
    }
}
