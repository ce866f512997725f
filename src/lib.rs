//! Gymtrack Core Library
//!
//! Workout tracking with companion-device synchronization: domain models,
//! SQLite-backed storage mirrors, the sync outbox/coordinator, and the
//! weight-trend analyzer.

pub mod analyzer;
pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod relay;
pub mod stopwatch;
pub mod store;
pub mod sync;

pub use analyzer::Analyzer;
pub use config::{Config, ConfigError, SyncConfig};
pub use models::{
    AggregationMethod, Exercise, ExerciseWeightsCache, SetDetail, UserInfo, Weight,
    WeightPreference, WeightUnit, Workout, WorkoutStatus,
};
pub use store::{DataStore, StoreError};
pub use stopwatch::Stopwatch;
pub use sync::{Companion, DeviceRole, Instruction, SyncError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
