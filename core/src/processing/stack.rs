use ndarray::{Array2, Axis};

use crate::prelude::{DeriveError, DeriveResult};
use crate::processing::align::align;
use crate::recording::{Channel, MaskedArray, Timebase};

/// Redundant sensors stacked one per row on a shared timebase.
#[derive(Debug, Clone)]
pub struct StackedParams {
    pub values: Array2<f64>,
    pub mask: Array2<bool>,
    pub timebase: Timebase,
    pub names: Vec<String>,
}

/// Stacks whichever of `channels` are present, aligning each to the first.
pub fn vstack_params(channels: &[Option<&Channel>]) -> DeriveResult<StackedParams> {
    let present: Vec<&Channel> = channels.iter().flatten().copied().collect();
    let reference = present
        .first()
        .ok_or_else(|| DeriveError::Unavailable("no redundant sensor recorded".into()))?;

    let rows = present.len();
    let cols = reference.len();
    let mut values = Array2::<f64>::zeros((rows, cols));
    let mut mask = Array2::<bool>::from_elem((rows, cols), true);

    for (row, channel) in present.iter().enumerate() {
        let aligned = align(channel, reference);
        for (col, sample) in aligned.iter().enumerate() {
            if let Some(v) = sample {
                values[[row, col]] = v;
                mask[[row, col]] = false;
            }
        }
    }

    Ok(StackedParams {
        values,
        mask,
        timebase: reference.timebase,
        names: present.iter().map(|c| c.name.clone()).collect(),
    })
}

impl StackedParams {
    pub fn sensor_count(&self) -> usize {
        self.values.nrows()
    }

    /// Mean across sensors of the valid members at each sample.
    pub fn average(&self) -> MaskedArray {
        self.reduce(|valid| valid.iter().sum::<f64>() / valid.len() as f64)
    }

    /// Minimum across sensors of the valid members at each sample.
    pub fn minimum(&self) -> MaskedArray {
        self.reduce(|valid| valid.iter().copied().fold(f64::INFINITY, f64::min))
    }

    fn reduce(&self, f: impl Fn(&[f64]) -> f64) -> MaskedArray {
        let mut out = MaskedArray::masked(self.values.ncols());
        let mut valid = Vec::with_capacity(self.sensor_count());
        for (col, (values, mask)) in self
            .values
            .axis_iter(Axis(1))
            .zip(self.mask.axis_iter(Axis(1)))
            .enumerate()
        {
            valid.clear();
            valid.extend(values.iter().zip(mask.iter()).filter(|&(_, &m)| !m).map(|(&v, _)| v));
            if !valid.is_empty() {
                out.set(col, f(&valid));
            }
        }
        out
    }
}
