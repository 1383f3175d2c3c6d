pub mod aggregator;
pub mod entitlement;
pub mod grade_scale;
pub mod matcher;
pub mod normalizer;
pub mod progress;
pub mod reconcile;
pub mod similarity;
pub mod simulation;
pub mod term;

pub use reconcile::{reconcile, ReconciliationPolicy};
pub use simulation::simulate;
