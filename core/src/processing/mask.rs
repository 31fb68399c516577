use crate::recording::MaskedArray;

/// Fills short masked runs by linear interpolation between the valid samples
/// either side. Runs touching either end of the array, or longer than
/// `repair_duration` seconds at `hz`, stay masked. `None` repairs any length.
///
/// Intended for phase-detection inputs; key-point computations should keep
/// invalid data masked.
pub fn repair_mask(array: &MaskedArray, hz: f64, repair_duration: Option<f64>) -> MaskedArray {
    let mut repaired = array.clone();
    repair_mask_in_place(&mut repaired, hz, repair_duration);
    repaired
}

/// In-place form of [`repair_mask`]; returns the number of samples repaired.
pub fn repair_mask_in_place(array: &mut MaskedArray, hz: f64, repair_duration: Option<f64>) -> usize {
    let limit = repair_duration.map(|seconds| seconds * hz);
    let len = array.len();
    let mut repaired = 0;

    for (start, stop) in array.masked_runs() {
        let run = stop - start;
        if limit.is_some_and(|max| run as f64 > max) || start == 0 || stop == len {
            continue;
        }
        let before = array.data()[start - 1];
        let after = array.data()[stop];
        let step = (after - before) / (run + 1) as f64;
        for (n, idx) in (start..stop).enumerate() {
            array.set(idx, before + step * (n + 1) as f64);
        }
        repaired += run;
    }
    repaired
}
