//! Cross-device wire format.
//!
//! An instruction travels as a flat JSON mapping with two top-level keys:
//!
//! ```text
//! { "operation": "<tag>", "payload": { ... } }
//! ```
//!
//! Dates are ISO-8601 strings and identities canonical string UUIDs.
//! Each operation carries an explicit payload shape, validated at decode
//! time; a malformed frame is a typed error, never a panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ExerciseWeightsCache, UserInfo, Workout};

/// One cross-device change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "payload", rename_all = "camelCase")]
pub enum Instruction {
    AddTemplateWorkout(Workout),
    UpdateTemplateWorkout(Workout),
    DeleteTemplateWorkout { id: Uuid },
    DeleteAllTemplateWorkouts {},
    AddHistoricalWorkout(Workout),
    DeleteAllHistoricalWorkouts {},
    UpdateUserInfo(UserInfo),
    UpdateExerciseWeightsCache(ExerciseWeightsCache),
    /// Sent once by the initially-empty device to pull a full snapshot.
    RequestAllWorkouts {},
    /// The snapshot response: every template and historical workout.
    ReplyWithAllWorkouts { workouts: Vec<Workout> },
}

impl Instruction {
    /// The wire tag of this instruction's operation.
    pub fn operation(&self) -> &'static str {
        match self {
            Instruction::AddTemplateWorkout(_) => "addTemplateWorkout",
            Instruction::UpdateTemplateWorkout(_) => "updateTemplateWorkout",
            Instruction::DeleteTemplateWorkout { .. } => "deleteTemplateWorkout",
            Instruction::DeleteAllTemplateWorkouts {} => "deleteAllTemplateWorkouts",
            Instruction::AddHistoricalWorkout(_) => "addHistoricalWorkout",
            Instruction::DeleteAllHistoricalWorkouts {} => "deleteAllHistoricalWorkouts",
            Instruction::UpdateUserInfo(_) => "updateUserInfo",
            Instruction::UpdateExerciseWeightsCache(_) => "updateExerciseWeightsCache",
            Instruction::RequestAllWorkouts {} => "requestAllWorkouts",
            Instruction::ReplyWithAllWorkouts { .. } => "replyWithAllWorkouts",
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(frame: &str) -> Result<Instruction, serde_json::Error> {
        serde_json::from_str(frame)
    }
}

/// An instruction persisted while it awaits transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInstruction {
    pub id: Uuid,
    pub date_added: DateTime<Utc>,
    pub instruction: Instruction,
}

impl PendingInstruction {
    pub fn new(instruction: Instruction) -> Self {
        Self {
            id: Uuid::new_v4(),
            date_added: Utc::now(),
            instruction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exercise, Weight};

    #[test]
    fn test_wire_shape() {
        let mut workout = Workout::new("Leg Day");
        workout.add(Exercise::new("Squat", 3, 10, Weight::kilograms(40.0)));
        let frame = Instruction::AddTemplateWorkout(workout.clone())
            .encode()
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["operation"], "addTemplateWorkout");
        assert_eq!(value["payload"]["name"], "Leg Day");
        assert_eq!(value["payload"]["isTemplate"], true);
        assert!(value["payload"]["exercises"][0]["setsPlanned"].is_number());
    }

    #[test]
    fn test_empty_payload_ops() {
        let frame = Instruction::DeleteAllTemplateWorkouts {}.encode().unwrap();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["operation"], "deleteAllTemplateWorkouts");
        assert_eq!(value["payload"], serde_json::json!({}));
        assert_eq!(
            Instruction::decode(&frame).unwrap(),
            Instruction::DeleteAllTemplateWorkouts {}
        );
    }

    #[test]
    fn test_round_trip_all_operations() {
        let workout = Workout::new("Test");
        let instructions = vec![
            Instruction::AddTemplateWorkout(workout.clone()),
            Instruction::UpdateTemplateWorkout(workout.clone()),
            Instruction::DeleteTemplateWorkout { id: workout.id },
            Instruction::DeleteAllTemplateWorkouts {},
            Instruction::AddHistoricalWorkout(workout.clone()),
            Instruction::DeleteAllHistoricalWorkouts {},
            Instruction::UpdateUserInfo(UserInfo::default()),
            Instruction::UpdateExerciseWeightsCache(ExerciseWeightsCache::new(
                "Squat",
                vec![Weight::kilograms(80.0)],
            )),
            Instruction::RequestAllWorkouts {},
            Instruction::ReplyWithAllWorkouts {
                workouts: vec![workout],
            },
        ];

        for instruction in instructions {
            let frame = instruction.encode().unwrap();
            assert_eq!(Instruction::decode(&frame).unwrap(), instruction);
        }
    }

    #[test]
    fn test_malformed_frame_is_typed_error() {
        assert!(Instruction::decode("not json").is_err());
        assert!(Instruction::decode(r#"{"operation": "launchMissiles", "payload": {}}"#).is_err());
        assert!(
            Instruction::decode(r#"{"operation": "addTemplateWorkout", "payload": {"nope": 1}}"#)
                .is_err()
        );
    }
}
