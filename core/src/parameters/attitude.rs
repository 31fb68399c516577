use crate::graph::{Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::prelude::DeriveResult;
use crate::processing::interleave;

use super::{PITCH, PITCH_1, PITCH_2};

/// Pitch from two sensors recorded half a sample apart.
pub struct Pitch;

impl DerivedParameter for Pitch {
    fn name(&self) -> &'static str {
        PITCH
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::required(&[PITCH_1, PITCH_2])
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let (array, timebase) = interleave(inputs.require(PITCH_1)?, inputs.require(PITCH_2)?)?;
        Ok(Derived::new(array, timebase))
    }
}
