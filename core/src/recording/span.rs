use serde::{Deserialize, Serialize};
use std::fmt;

/// Flight-phase kinds produced by the segmentation collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    Fast,
    Airborne,
}

impl PhaseKind {
    /// Dependency name under which spans of this kind are offered to nodes.
    pub fn name(&self) -> &'static str {
        match self {
            PhaseKind::Fast => "Fast",
            PhaseKind::Airborne => "Airborne",
        }
    }

    pub fn all() -> [PhaseKind; 2] {
        [PhaseKind::Fast, PhaseKind::Airborne]
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Half-open index range `[start, stop)` over a reference channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub kind: PhaseKind,
    pub start: usize,
    pub stop: usize,
}

impl Span {
    pub fn new(kind: PhaseKind, start: usize, stop: usize) -> Self {
        Self { kind, start, stop }
    }

    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clips the span to an array of `len` samples.
    pub fn clamp_to(&self, len: usize) -> Span {
        let stop = self.stop.min(len);
        Span {
            kind: self.kind,
            start: self.start.min(stop),
            stop,
        }
    }
}
