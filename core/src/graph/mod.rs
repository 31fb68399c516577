//! Dependency graph of derivable parameters.

pub mod node;
pub mod registry;
pub mod resolver;

pub use node::{any_available, Dependencies, Derived, DerivedParameter, NodeInputs};
pub use registry::NodeRegistry;
pub use resolver::{NodeOutcome, NodeStatus, ResolutionReport, Resolver, SkipReason};
