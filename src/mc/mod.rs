pub mod engine;
pub mod enumerate;
pub mod strategy;

pub use engine::{DisplayReduction, ExperimentState, RunOutput, RunReport, RunSummary};
pub use enumerate::ExactEnumerator;
pub use strategy::{SamplingConfig, SamplingMode, SamplingPlan};
