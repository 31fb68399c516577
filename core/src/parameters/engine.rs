use std::collections::BTreeSet;

use crate::graph::{any_available, Dependencies, Derived, DerivedParameter, NodeInputs};
use crate::prelude::DeriveResult;
use crate::processing::vstack_params;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Average,
    Minimum,
}

/// Reduces whichever of up to four per-engine channels were recorded.
pub struct EngineReduction {
    name: &'static str,
    engines: [&'static str; 4],
    reduction: Reduction,
}

impl EngineReduction {
    pub const fn new(name: &'static str, engines: [&'static str; 4], reduction: Reduction) -> Self {
        Self {
            name,
            engines,
            reduction,
        }
    }
}

const N1: [&str; 4] = ["Eng (1) N1", "Eng (2) N1", "Eng (3) N1", "Eng (4) N1"];
const N2: [&str; 4] = ["Eng (1) N2", "Eng (2) N2", "Eng (3) N2", "Eng (4) N2"];

pub fn engine_nodes() -> Vec<Box<dyn DerivedParameter>> {
    vec![
        Box::new(EngineReduction::new("Eng N1 Average", N1, Reduction::Average)),
        Box::new(EngineReduction::new("Eng N1 Minimum", N1, Reduction::Minimum)),
        Box::new(EngineReduction::new("Eng N2 Average", N2, Reduction::Average)),
    ]
}

impl DerivedParameter for EngineReduction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn dependencies(&self) -> Dependencies {
        Dependencies::any_of(&self.engines)
    }

    fn can_operate(&self, available: &BTreeSet<String>) -> bool {
        any_available(&self.dependencies(), available)
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived> {
        let present: Vec<_> = self.engines.iter().map(|name| inputs.channel(name)).collect();
        let stacked = vstack_params(&present)?;
        let array = match self.reduction {
            Reduction::Average => stacked.average(),
            Reduction::Minimum => stacked.minimum(),
        };
        Ok(Derived::new(array, stacked.timebase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeRegistry, NodeStatus, Resolver};
    use crate::prelude::Settings;
    use crate::recording::{Channel, MaskedArray, Recording, Timebase};

    fn engine(name: &str, values: Vec<f64>) -> Channel {
        Channel::new(name, Timebase::new(1.0, 0.0), MaskedArray::new(values))
    }

    #[test]
    fn twin_engine_aircraft_reduces_over_two_sensors() {
        let mut recording = Recording::new();
        recording.insert_channel(engine("Eng (1) N1", vec![80.0, 90.0]));
        recording.insert_channel(engine("Eng (2) N1", vec![84.0, 86.0]));

        let registry = NodeRegistry::new(engine_nodes()).unwrap();
        let report = Resolver::new(&registry, Settings::default()).resolve(&mut recording);

        assert_eq!(
            recording.channel("Eng N1 Average").unwrap().array.data(),
            &[82.0, 88.0]
        );
        assert_eq!(
            recording.channel("Eng N1 Minimum").unwrap().array.data(),
            &[80.0, 86.0]
        );
        assert!(matches!(report.status("Eng N2 Average"), Some(NodeStatus::Skipped(_))));
    }

    #[test]
    fn single_recorded_engine_is_enough() {
        let mut recording = Recording::new();
        recording.insert_channel(engine("Eng (3) N2", vec![60.0, 61.0, 62.0]));

        let registry = NodeRegistry::new(engine_nodes()).unwrap();
        Resolver::new(&registry, Settings::default()).resolve(&mut recording);
        assert_eq!(
            recording.channel("Eng N2 Average").unwrap().array.data(),
            &[60.0, 61.0, 62.0]
        );
    }
}
