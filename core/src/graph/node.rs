use std::collections::BTreeSet;

use crate::prelude::{DeriveError, DeriveResult, Settings};
use crate::recording::{Attribute, Channel, MaskedArray, PhaseKind, Recording, Span, Timebase};

/// Names a node reads. Required names gate the default capability check;
/// optional names are handed over only when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    pub required: Vec<&'static str>,
    pub optional: Vec<&'static str>,
}

impl Dependencies {
    pub fn required(names: &[&'static str]) -> Self {
        Self {
            required: names.to_vec(),
            optional: Vec::new(),
        }
    }

    pub fn any_of(names: &[&'static str]) -> Self {
        Self {
            required: Vec::new(),
            optional: names.to_vec(),
        }
    }

    pub fn with_optional(mut self, names: &[&'static str]) -> Self {
        self.optional.extend_from_slice(names);
        self
    }

    pub fn all(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().chain(self.optional.iter()).copied()
    }
}

/// Output of a derivation before the resolver names and publishes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub array: MaskedArray,
    pub timebase: Timebase,
}

impl Derived {
    pub fn new(array: MaskedArray, timebase: Timebase) -> Self {
        Self { array, timebase }
    }

    /// Output on the same timebase as `channel`.
    pub fn like(channel: &Channel, array: MaskedArray) -> Self {
        Self::new(array, channel.timebase)
    }
}

/// A derivable parameter.
pub trait DerivedParameter: Send + Sync {
    /// Stable name the output is published under.
    fn name(&self) -> &'static str;

    fn dependencies(&self) -> Dependencies;

    /// Capability predicate; by default every required name must be present.
    fn can_operate(&self, available: &BTreeSet<String>) -> bool {
        self.dependencies()
            .required
            .iter()
            .all(|name| available.contains(*name))
    }

    fn derive(&self, inputs: &NodeInputs<'_>) -> DeriveResult<Derived>;
}

/// Capability predicate for nodes that work from any one of their inputs.
pub fn any_available(deps: &Dependencies, available: &BTreeSet<String>) -> bool {
    deps.all().any(|name| available.contains(name))
}

/// Read-only view of the recording restricted to a node's declared inputs.
pub struct NodeInputs<'a> {
    node: &'static str,
    recording: &'a Recording,
    declared: BTreeSet<&'static str>,
    settings: &'a Settings,
}

impl<'a> NodeInputs<'a> {
    pub fn new(
        node: &'static str,
        deps: &Dependencies,
        recording: &'a Recording,
        settings: &'a Settings,
    ) -> Self {
        Self {
            node,
            recording,
            declared: deps.all().collect(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// A declared channel, if it was recorded or derived.
    pub fn channel(&self, name: &str) -> Option<&'a Channel> {
        if !self.declared.contains(name) {
            return None;
        }
        self.recording.channel(name).map(|c| c.as_ref())
    }

    pub fn require(&self, name: &str) -> DeriveResult<&'a Channel> {
        self.channel(name)
            .ok_or_else(|| DeriveError::Unavailable(format!("{} needs '{}'", self.node, name)))
    }

    pub fn attribute(&self, name: &str) -> Option<&'a Attribute> {
        if !self.declared.contains(name) {
            return None;
        }
        self.recording.attribute(name)
    }

    pub fn require_number(&self, name: &str) -> DeriveResult<f64> {
        self.attribute(name)
            .and_then(Attribute::as_number)
            .ok_or_else(|| DeriveError::Unavailable(format!("{} needs attribute '{}'", self.node, name)))
    }

    pub fn spans(&self, kind: PhaseKind) -> &'a [Span] {
        if !self.declared.contains(kind.name()) {
            return &[];
        }
        self.recording.spans(kind)
    }

    /// Declared names actually available to this derivation.
    pub fn present(&self) -> Vec<&'static str> {
        let available = self.recording.available();
        self.declared
            .iter()
            .copied()
            .filter(|name| available.contains(*name))
            .collect()
    }
}
