pub mod orchestrator;

pub use orchestrator::{HealthReport, ParaphraseService, Strategies, StrategyHealth};
