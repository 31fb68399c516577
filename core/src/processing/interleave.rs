use crate::prelude::{DeriveError, DeriveResult};
use crate::recording::{Channel, MaskedArray, Timebase};

const PHASE_TOLERANCE: f64 = 1e-6;

/// Merges two channels sampled at the same rate, half a period apart, into
/// one channel at twice the rate. Samples alternate in time order; the merged
/// channel starts at the earlier of the two first samples. Its offset is twice
/// the smaller input offset because offsets are fractions of a period and the
/// merged period is half the input period.
pub fn interleave(first: &Channel, second: &Channel) -> DeriveResult<(MaskedArray, Timebase)> {
    let misaligned = |detail: String| DeriveError::Misaligned {
        left: first.name.clone(),
        right: second.name.clone(),
        detail,
    };
    if first.hz() != second.hz() {
        return Err(misaligned(format!("rates {} Hz vs {} Hz", first.hz(), second.hz())));
    }
    if first.len() != second.len() {
        return Err(misaligned(format!("lengths {} vs {}", first.len(), second.len())));
    }
    if ((first.offset() - second.offset()).abs() - 0.5).abs() > PHASE_TOLERANCE {
        return Err(misaligned(format!(
            "offsets {} and {} are not half a sample apart",
            first.offset(),
            second.offset()
        )));
    }

    let (early, late) = if first.offset() <= second.offset() {
        (first, second)
    } else {
        (second, first)
    };

    let mut merged = MaskedArray::masked(first.len() * 2);
    for idx in 0..first.len() {
        if let Some(v) = early.array.get(idx) {
            merged.set(2 * idx, v);
        }
        if let Some(v) = late.array.get(idx) {
            merged.set(2 * idx + 1, v);
        }
    }

    let timebase = Timebase::new(first.hz() * 2.0, early.offset() * 2.0);
    Ok((merged, timebase))
}
