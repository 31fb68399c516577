use serde::{Deserialize, Serialize};

use crate::prelude::{DeriveError, DeriveResult};

/// Sample values with a parallel validity mask (`true` = invalid).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "MaskedArrayParts")]
pub struct MaskedArray {
    data: Vec<f64>,
    mask: Vec<bool>,
}

#[derive(Deserialize)]
struct MaskedArrayParts {
    data: Vec<f64>,
    mask: Vec<bool>,
}

impl TryFrom<MaskedArrayParts> for MaskedArray {
    type Error = DeriveError;

    fn try_from(parts: MaskedArrayParts) -> DeriveResult<Self> {
        Self::with_mask(parts.data, parts.mask)
    }
}

impl MaskedArray {
    /// Wraps fully valid samples.
    pub fn new(data: Vec<f64>) -> Self {
        let mask = vec![false; data.len()];
        Self { data, mask }
    }

    pub fn with_mask(data: Vec<f64>, mask: Vec<bool>) -> DeriveResult<Self> {
        if data.len() != mask.len() {
            return Err(DeriveError::InvalidInput(format!(
                "mask length {} does not match data length {}",
                mask.len(),
                data.len()
            )));
        }
        Ok(Self { data, mask })
    }

    /// Builds from optional samples, `None` becoming a masked zero.
    pub fn from_options<I: IntoIterator<Item = Option<f64>>>(values: I) -> Self {
        let (data, mask) = values
            .into_iter()
            .map(|value| match value {
                Some(v) => (v, false),
                None => (0.0, true),
            })
            .unzip();
        Self { data, mask }
    }

    pub fn zeros(len: usize) -> Self {
        Self::new(vec![0.0; len])
    }

    pub fn masked(len: usize) -> Self {
        Self {
            data: vec![0.0; len],
            mask: vec![true; len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw sample storage; masked positions hold meaningless values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn is_masked(&self, index: usize) -> bool {
        self.mask[index]
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        if self.mask[index] {
            None
        } else {
            Some(self.data[index])
        }
    }

    pub fn set(&mut self, index: usize, value: f64) {
        self.data[index] = value;
        self.mask[index] = false;
    }

    pub fn set_masked(&mut self, index: usize) {
        self.mask[index] = true;
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<f64>> + '_ {
        self.data
            .iter()
            .zip(&self.mask)
            .map(|(&v, &m)| if m { None } else { Some(v) })
    }

    pub fn first_valid(&self) -> Option<f64> {
        self.iter().flatten().next()
    }

    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Contiguous masked runs as half-open `(start, stop)` pairs.
    pub fn masked_runs(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        for (idx, &m) in self.mask.iter().enumerate() {
            match (m, start) {
                (true, None) => start = Some(idx),
                (false, Some(s)) => {
                    runs.push((s, idx));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, self.mask.len()));
        }
        runs
    }

    /// Applies `f` to every valid sample, keeping the mask.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let data = self
            .data
            .iter()
            .zip(&self.mask)
            .map(|(&v, &m)| if m { v } else { f(v) })
            .collect();
        Self {
            data,
            mask: self.mask.clone(),
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    /// Elementwise combination; the output is masked wherever either input is.
    /// Node code goes through [`Channel::combine`] so errors name both channels.
    pub fn zip_with(
        &self,
        other: &MaskedArray,
        f: impl Fn(f64, f64) -> f64,
    ) -> DeriveResult<Self> {
        if self.len() != other.len() {
            return Err(DeriveError::Misaligned {
                left: "left operand".into(),
                right: "right operand".into(),
                detail: format!("length {} vs {}", self.len(), other.len()),
            });
        }
        let mut out = Self::masked(self.len());
        for idx in 0..self.len() {
            if !self.mask[idx] && !other.mask[idx] {
                out.set(idx, f(self.data[idx], other.data[idx]));
            }
        }
        Ok(out)
    }

    pub fn add(&self, other: &MaskedArray) -> DeriveResult<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &MaskedArray) -> DeriveResult<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<bool>) {
        (self.data, self.mask)
    }
}

/// Sample rate and phase of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timebase {
    pub hz: f64,
    /// Phase of the first sample as a fraction of the sample period, in `[0, 1)`.
    pub offset: f64,
}

impl Timebase {
    pub fn new(hz: f64, offset: f64) -> Self {
        Self { hz, offset }
    }

    /// Seconds from recording start to sample `index`.
    pub fn time_of(&self, index: usize) -> f64 {
        (index as f64 + self.offset) / self.hz
    }

    /// Fractional sample position of time `t`.
    pub fn position_of(&self, t: f64) -> f64 {
        t * self.hz - self.offset
    }
}

/// A named, immutable time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub timebase: Timebase,
    pub array: MaskedArray,
}

impl Channel {
    pub fn new(name: impl Into<String>, timebase: Timebase, array: MaskedArray) -> Self {
        Self {
            name: name.into(),
            timebase,
            array,
        }
    }

    pub fn hz(&self) -> f64 {
        self.timebase.hz
    }

    pub fn offset(&self) -> f64 {
        self.timebase.offset
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Fails unless both channels share length, rate and offset.
    pub fn ensure_aligned(&self, other: &Channel) -> DeriveResult<()> {
        let misaligned = |detail: String| DeriveError::Misaligned {
            left: self.name.clone(),
            right: other.name.clone(),
            detail,
        };
        if self.len() != other.len() {
            return Err(misaligned(format!(
                "length {} vs {}",
                self.len(),
                other.len()
            )));
        }
        if self.timebase != other.timebase {
            return Err(misaligned(format!(
                "{} Hz offset {} vs {} Hz offset {}",
                self.hz(),
                self.offset(),
                other.hz(),
                other.offset()
            )));
        }
        Ok(())
    }

    /// Elementwise combination of two channels already on the same timebase.
    pub fn combine(&self, other: &Channel, f: impl Fn(f64, f64) -> f64) -> DeriveResult<MaskedArray> {
        self.ensure_aligned(other)?;
        self.array.zip_with(&other.array, f)
    }
}
