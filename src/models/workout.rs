use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::exercise::Exercise;

/// A collection of exercises done in the same session (e.g. Leg Day).
///
/// A workout is either a template (a reusable plan) or historical (a
/// completed record). Templates use `date_added` for ordering; historical
/// workouts are ordered by when they were performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub is_template: bool,
    pub date_added: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl Workout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_template: true,
            date_added: Utc::now(),
            start_time: None,
            end_time: None,
            exercises: Vec::new(),
        }
    }

    pub fn status(&self) -> WorkoutStatus {
        if self.start_time.is_none() {
            WorkoutStatus::NotStarted
        } else if self.end_time.is_none() {
            WorkoutStatus::InProgress
        } else {
            WorkoutStatus::Completed
        }
    }

    /// A copy with a fresh identity and no start/end or completion state.
    /// This is how a session begins from a template. The copy gets its own
    /// creation stamp; historical ordering relies on it.
    pub fn clean_copy(&self) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            is_template: self.is_template,
            date_added: Utc::now(),
            start_time: None,
            end_time: None,
            exercises: self.exercises.iter().map(|e| e.clean_copy()).collect(),
        }
    }

    pub fn add(&mut self, exercise: Exercise) {
        self.exercises.push(exercise);
    }

    pub fn start(&mut self) {
        self.start_time = Some(Utc::now());
    }

    /// Stamps the end time and makes the workout historical.
    pub fn end(&mut self) {
        self.end_time = Some(Utc::now());
        self.is_template = false;
    }

    /// Overwrites every field from a reference workout, identity included.
    pub fn apply(&mut self, reference: &Workout) {
        self.id = reference.id;
        self.name = reference.name.clone();
        self.is_template = reference.is_template;
        self.date_added = reference.date_added;
        self.start_time = reference.start_time;
        self.end_time = reference.end_time;
        self.exercises = reference.exercises.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weight;

    #[test]
    fn test_status_transitions() {
        let mut workout = Workout::new("Leg Day");
        assert_eq!(workout.status(), WorkoutStatus::NotStarted);
        workout.start();
        assert_eq!(workout.status(), WorkoutStatus::InProgress);
        workout.end();
        assert_eq!(workout.status(), WorkoutStatus::Completed);
    }

    #[test]
    fn test_end_makes_historical() {
        let mut workout = Workout::new("Leg Day");
        assert!(workout.is_template);
        workout.start();
        workout.end();
        assert!(!workout.is_template);
        assert!(workout.end_time.is_some());
    }

    #[test]
    fn test_clean_copy_is_fresh() {
        let mut template = Workout::new("Leg Day");
        template.add(Exercise::new("Squat", 3, 10, Weight::kilograms(40.0)));
        template.exercises[0].add_set(10, Weight::kilograms(40.0));
        template.start();

        let session = template.clean_copy();
        assert_ne!(session.id, template.id);
        assert_eq!(session.name, template.name);
        assert!(session.start_time.is_none());
        assert!(session.end_time.is_none());
        assert_eq!(session.exercises.len(), 1);
        assert_eq!(session.exercises[0].sets_done, 0);
        // The template is untouched
        assert_eq!(template.exercises[0].sets_done, 1);
        assert!(template.start_time.is_some());
    }

    #[test]
    fn test_apply_overwrites_identity() {
        let mut target = Workout::new("Old");
        let mut reference = Workout::new("New");
        reference.add(Exercise::new("Bench", 3, 8, Weight::kilograms(60.0)));
        target.apply(&reference);
        assert_eq!(target.id, reference.id);
        assert_eq!(target.name, "New");
        assert_eq!(target.exercises.len(), 1);
    }

    #[test]
    fn test_wire_round_trip() {
        let mut workout = Workout::new("Push Day");
        workout.add(Exercise::new("Bench", 3, 8, Weight::kilograms(60.0)));
        workout.start();
        workout.end();

        let json = serde_json::to_string(&workout).unwrap();
        let parsed: Workout = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, workout);

        // Dates travel as ISO-8601 strings, identities as canonical UUIDs
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["dateAdded"].is_string());
        assert_eq!(value["id"].as_str().unwrap(), workout.id.to_string());
    }
}
