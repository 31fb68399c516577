use crate::recording::MaskedArray;

/// Removes the 0/360 wraparound so headings become continuous.
///
/// Each step between valid samples is taken as the shortest turn, wrapped
/// into `(-180, 180]`, so the result is unbounded; `rem_euclid(360.0)` recovers the display heading.
/// Continuity is carried across masked gaps.
pub fn straighten_headings(array: &MaskedArray) -> MaskedArray {
    let mut output = MaskedArray::masked(array.len());
    let mut previous: Option<(f64, f64)> = None;

    for (idx, sample) in array.iter().enumerate() {
        let Some(raw) = sample else { continue };
        let straight = match previous {
            None => raw,
            Some((last_raw, last_straight)) => {
                let step = (raw - last_raw + 180.0).rem_euclid(360.0) - 180.0;
                last_straight + if step == -180.0 { 180.0 } else { step }
            }
        };
        output.set(idx, straight);
        previous = Some((raw, straight));
    }
    output
}
