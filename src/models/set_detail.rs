use serde::{Deserialize, Serialize};

use super::weight::Weight;

/// The details of one set of an exercise: the plan, and the completed
/// reps/weight once the set has been performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDetail {
    pub reps_planned: u32,
    pub weight_planned: Weight,
    /// Completed reps and weight are recorded together or not at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<CompletedSet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSet {
    pub reps: u32,
    pub weight: Weight,
}

impl SetDetail {
    pub fn new(reps: u32, weight: Weight) -> Self {
        Self {
            reps_planned: reps,
            weight_planned: weight,
            completed: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }

    /// Records the performed reps and weight for this set.
    pub fn fill_in(&mut self, reps_done: u32, weight_used: Weight) {
        self.completed = Some(CompletedSet {
            reps: reps_done,
            weight: weight_used,
        });
    }

    pub fn weight_used(&self) -> Option<Weight> {
        self.completed.as_ref().map(|c| c.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightUnit;

    #[test]
    fn test_new_set_is_not_completed() {
        let detail = SetDetail::new(10, Weight::kilograms(40.0));
        assert!(!detail.is_completed());
        assert_eq!(detail.reps_planned, 10);
        assert!(detail.weight_used().is_none());
    }

    #[test]
    fn test_fill_in_records_both_values() {
        let mut detail = SetDetail::new(10, Weight::kilograms(40.0));
        detail.fill_in(8, Weight::kilograms(42.5));
        assert!(detail.is_completed());
        let completed = detail.completed.unwrap();
        assert_eq!(completed.reps, 8);
        assert_eq!(completed.weight, Weight::kilograms(42.5));
    }

    #[test]
    fn test_completion_absent_from_wire_until_filled() {
        let mut detail = SetDetail::new(12, Weight::new(25.0, WeightUnit::Pounds));
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("completed").is_none());

        detail.fill_in(12, Weight::new(25.0, WeightUnit::Pounds));
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["completed"]["reps"], 12);

        let parsed: SetDetail = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, detail);
    }
}
