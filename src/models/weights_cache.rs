use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::exercise::Exercise;
use super::weight::Weight;

/// Accumulated completed weights for one exercise name, across all
/// historical sessions. Append-only; entries are never reordered or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseWeightsCache {
    pub id: Uuid,
    pub name: String,
    pub weights: Vec<Weight>,
}

#[derive(Debug, Error)]
pub enum CacheMergeError {
    #[error("cannot merge weights for '{incoming}' into cache for '{existing}'")]
    MismatchedName { existing: String, incoming: String },
}

impl ExerciseWeightsCache {
    pub fn new(name: impl Into<String>, weights: Vec<Weight>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            weights,
        }
    }

    /// A cache holding the completed weights of one exercise session.
    pub fn from_exercise(exercise: &Exercise) -> Self {
        Self::new(exercise.name.clone(), exercise.completed_weights())
    }

    /// Appends all weights from a same-named exercise session.
    pub fn add_weights_from_exercise(&mut self, exercise: &Exercise) -> Result<(), CacheMergeError> {
        if exercise.name != self.name {
            return Err(CacheMergeError::MismatchedName {
                existing: self.name.clone(),
                incoming: exercise.name.clone(),
            });
        }
        self.weights.extend(exercise.completed_weights());
        Ok(())
    }

    /// Concatenates a same-named partial cache onto this one.
    pub fn merge_from(&mut self, partial: &ExerciseWeightsCache) -> Result<(), CacheMergeError> {
        if partial.name != self.name {
            return Err(CacheMergeError::MismatchedName {
                existing: self.name.clone(),
                incoming: partial.name.clone(),
            });
        }
        self.weights.extend(partial.weights.iter().copied());
        Ok(())
    }
}
