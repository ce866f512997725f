//! Derives per-exercise weight trends from historical workouts.

use crate::models::{AggregationMethod, Weight, WeightUnit};
use crate::store::DataStore;

/// Computes weight trends over the store's historical workouts.
///
/// Values are normalized to the most recently used unit for the exercise —
/// the first completed weight encountered while scanning newest-first —
/// not to any configured unit.
pub struct Analyzer<'a> {
    store: &'a DataStore,
}

impl<'a> Analyzer<'a> {
    pub fn new(store: &'a DataStore) -> Self {
        Self { store }
    }

    /// Distinct exercise names appearing in history, most recent first.
    pub fn exercise_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for workout in &self.store.historical_workouts {
            for exercise in &workout.exercises {
                if !names.contains(&exercise.name) {
                    names.push(exercise.name.clone());
                }
            }
        }
        names
    }

    /// The weight trend for an exercise across the `limit` most recent
    /// historical workouts, one or more values per session depending on the
    /// aggregation method. Sessions without a completed set for the
    /// exercise contribute nothing. Most recent session first.
    pub fn weight_trend(
        &self,
        exercise_name: &str,
        method: AggregationMethod,
        limit: usize,
    ) -> Vec<Weight> {
        let mut target_unit: Option<WeightUnit> = None;
        let mut trend = Vec::new();

        for workout in self.store.historical_workouts.iter().take(limit) {
            // Exercises in a stable order before picking the match
            let mut exercises: Vec<_> = workout.exercises.iter().collect();
            exercises.sort_by(|a, b| a.date_added.cmp(&b.date_added));

            let Some(exercise) = exercises.into_iter().find(|e| e.name == exercise_name) else {
                continue;
            };
            let completed = exercise.completed_weights();
            if completed.is_empty() {
                continue;
            }

            let unit = *target_unit.get_or_insert(completed[0].unit);

            match method {
                AggregationMethod::All => {
                    trend.extend(completed.iter().map(|w| w.convert_to(unit)));
                }
                AggregationMethod::Median => {
                    let mut sorted = completed.clone();
                    sorted.sort_by(|a, b| a.as_kilograms().total_cmp(&b.as_kilograms()));
                    let count = sorted.len();
                    let median = if count % 2 == 0 {
                        let sum = sorted[count / 2] + sorted[(count - 1) / 2];
                        Weight::kilograms(sum.value / 2.0)
                    } else {
                        sorted[count / 2]
                    };
                    trend.push(median.convert_to(unit));
                }
                AggregationMethod::Average => {
                    let sum: f64 = completed.iter().map(|w| w.as_kilograms()).sum();
                    trend.push(Weight::kilograms(sum / completed.len() as f64).convert_to(unit));
                }
                AggregationMethod::Max => {
                    if let Some(max) = completed
                        .iter()
                        .max_by(|a, b| a.as_kilograms().total_cmp(&b.as_kilograms()))
                    {
                        trend.push(max.convert_to(unit));
                    }
                }
                AggregationMethod::Min => {
                    if let Some(min) = completed
                        .iter()
                        .min_by(|a, b| a.as_kilograms().total_cmp(&b.as_kilograms()))
                    {
                        trend.push(min.convert_to(unit));
                    }
                }
            }
        }

        trend
    }
}
