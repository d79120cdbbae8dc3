//! Game state module
//!
//! The snapshot produced by an analysis pass and the aggregator that
//! builds it from the detection stages.

pub mod analyzer;
pub mod state;

pub use analyzer::StateAggregator;
pub use state::{AnalysisStage, GameStateSnapshot, VitalReading};
