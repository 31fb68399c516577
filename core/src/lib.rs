//! Core of the derived flight-parameter platform.
//!
//! Raw recorder channels arrive at different rates and phases. The modules
//! here align them, clean and filter them, and walk a dependency graph of
//! derived parameters over whatever a given flight actually recorded.

pub mod airport;
pub mod graph;
pub mod math;
pub mod parameters;
pub mod prelude;
pub mod processing;
pub mod recording;
pub mod telemetry;

pub use graph::{DerivedParameter, NodeRegistry, ResolutionReport, Resolver};
pub use prelude::{DeriveError, DeriveResult, Settings};
pub use recording::{Channel, MaskedArray, Recording, Timebase};
