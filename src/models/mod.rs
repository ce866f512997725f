mod exercise;
mod set_detail;
mod user_info;
mod weight;
mod weights_cache;
mod workout;

pub use exercise::Exercise;
pub use set_detail::{CompletedSet, SetDetail};
pub use user_info::{AggregationMethod, UserInfo, WeightPreference};
pub use weight::{Weight, WeightUnit};
pub use weights_cache::{CacheMergeError, ExerciseWeightsCache};
pub use workout::{Workout, WorkoutStatus};
