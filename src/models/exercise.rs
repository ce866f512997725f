use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::set_detail::SetDetail;
use super::weight::Weight;

/// A planned exercise within a workout, with its per-set details.
///
/// `sets_done` counts completed sets from the front of `set_details`;
/// completing a set beyond the plan appends a detail copying the previous
/// set's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub sets_planned: u32,
    pub sets_done: u32,
    pub set_details: Vec<SetDetail>,
    pub date_added: DateTime<Utc>,
}

impl Exercise {
    /// Creates an exercise with `sets` planned sets, each planning `reps`
    /// reps at `weight`.
    pub fn new(name: impl Into<String>, sets: u32, reps: u32, weight: Weight) -> Self {
        assert!(sets > 0, "Number of sets must be positive");
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sets_planned: sets,
            sets_done: 0,
            set_details: (0..sets).map(|_| SetDetail::new(reps, weight)).collect(),
            date_added: Utc::now(),
        }
    }

    /// A copy with a fresh identity and no completion state, keeping each
    /// set's plan. Used when starting a workout from a template.
    pub fn clean_copy(&self) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            sets_planned: self.sets_planned,
            sets_done: 0,
            set_details: self
                .set_details
                .iter()
                .map(|d| SetDetail::new(d.reps_planned, d.weight_planned))
                .collect(),
            date_added: self.date_added,
        }
    }

    /// Records a completed set: fills in the current planned set, or appends
    /// a new detail copying the previous plan when none remain.
    pub fn add_set(&mut self, reps_done: u32, weight_used: Weight) {
        let index = self.sets_done as usize;
        if index == self.set_details.len() {
            if let Some(prev) = self.set_details.last() {
                let mut detail = SetDetail::new(prev.reps_planned, prev.weight_planned);
                detail.fill_in(reps_done, weight_used);
                self.set_details.push(detail);
            }
        } else {
            self.set_details[index].fill_in(reps_done, weight_used);
        }
        self.sets_done += 1;
    }

    /// The completed weights of this exercise, in set order.
    pub fn completed_weights(&self) -> Vec<Weight> {
        self.set_details
            .iter()
            .take(self.sets_done as usize)
            .filter_map(|d| d.weight_used())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_prefills_planned_sets() {
        let exercise = Exercise::new("Squat", 3, 10, Weight::kilograms(40.0));
        assert_eq!(exercise.sets_planned, 3);
        assert_eq!(exercise.sets_done, 0);
        assert_eq!(exercise.set_details.len(), 3);
        for detail in &exercise.set_details {
            assert_eq!(detail.reps_planned, 10);
            assert!(!detail.is_completed());
        }
    }

    #[test]
    fn test_add_set_fills_current_detail() {
        let mut exercise = Exercise::new("Squat", 3, 10, Weight::kilograms(40.0));
        exercise.add_set(10, Weight::kilograms(42.5));
        assert_eq!(exercise.sets_done, 1);
        assert!(exercise.set_details[0].is_completed());
        assert!(!exercise.set_details[1].is_completed());
        assert_eq!(exercise.set_details.len(), 3);
    }

    #[test]
    fn test_add_set_beyond_plan_appends() {
        let mut exercise = Exercise::new("Squat", 1, 10, Weight::kilograms(40.0));
        exercise.add_set(10, Weight::kilograms(40.0));
        exercise.add_set(8, Weight::kilograms(45.0));
        assert_eq!(exercise.sets_done, 2);
        assert_eq!(exercise.set_details.len(), 2);
        // The appended set copies the previous plan
        assert_eq!(exercise.set_details[1].reps_planned, 10);
        assert_eq!(
            exercise.set_details[1].weight_used(),
            Some(Weight::kilograms(45.0))
        );
    }

    #[test]
    fn test_clean_copy_resets_completion() {
        let mut exercise = Exercise::new("Squat", 2, 10, Weight::kilograms(40.0));
        exercise.add_set(10, Weight::kilograms(42.5));

        let copy = exercise.clean_copy();
        assert_ne!(copy.id, exercise.id);
        assert_eq!(copy.name, exercise.name);
        assert_eq!(copy.sets_done, 0);
        assert_eq!(copy.set_details.len(), 2);
        assert!(copy.set_details.iter().all(|d| !d.is_completed()));
        // The original keeps its completion state
        assert_eq!(exercise.sets_done, 1);
    }

    #[test]
    fn test_completed_weights() {
        let mut exercise = Exercise::new("Squat", 3, 10, Weight::kilograms(40.0));
        exercise.add_set(10, Weight::kilograms(42.5));
        exercise.add_set(10, Weight::kilograms(45.0));
        assert_eq!(
            exercise.completed_weights(),
            vec![Weight::kilograms(42.5), Weight::kilograms(45.0)]
        );
    }
}
