//! Dependency analysis for restructuring operations

pub mod analyzer;
pub mod graph;
pub mod layers;

pub use analyzer::{CycleDetection, DependencyAnalyzer, Validation};
pub use graph::DependencyGraph;
pub use layers::{layer_rank, Layer, UNRANKED};
