use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{CompletedSet, Exercise, SetDetail, Weight, WeightUnit, Workout};

pub struct WorkoutRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct WorkoutRow {
    id: String,
    name: String,
    is_template: i64,
    date_added: String,
    start_time: Option<String>,
    end_time: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ExerciseRow {
    id: String,
    name: String,
    sets_planned: i64,
    sets_done: i64,
    date_added: String,
}

#[derive(sqlx::FromRow)]
struct SetDetailRow {
    reps_planned: i64,
    weight_planned_value: f64,
    weight_planned_unit: String,
    reps_done: Option<i64>,
    weight_used_value: Option<f64>,
    weight_used_unit: Option<String>,
}

impl WorkoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts a workout with its exercises and set details.
    pub async fn insert(&self, workout: &Workout) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO workouts (id, name, is_template, date_added, start_time, end_time)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(workout.id.to_string())
        .bind(&workout.name)
        .bind(workout.is_template as i64)
        .bind(workout.date_added.to_rfc3339())
        .bind(workout.start_time.map(|t| t.to_rfc3339()))
        .bind(workout.end_time.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        for (position, exercise) in workout.exercises.iter().enumerate() {
            self.insert_exercise(workout.id, position as i64, exercise)
                .await?;
        }

        Ok(())
    }

    /// Replaces a stored workout, children included.
    pub async fn update(&self, workout: &Workout) -> Result<(), sqlx::Error> {
        self.delete(workout.id).await?;
        self.insert(workout).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        // Child rows go with the workout (ON DELETE CASCADE)
        sqlx::query("DELETE FROM workouts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Workout>, sqlx::Error> {
        let row: Option<WorkoutRow> = sqlx::query_as("SELECT * FROM workouts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.hydrate_workout(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Template workouts, oldest first (creation order). A started-but-not-
    /// ended session keeps its template flag until it ends and is excluded
    /// here.
    pub async fn list_templates(&self) -> Result<Vec<Workout>, sqlx::Error> {
        let rows: Vec<WorkoutRow> = sqlx::query_as(
            "SELECT * FROM workouts WHERE is_template = 1 AND start_time IS NULL ORDER BY date_added ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_all(rows).await
    }

    /// The in-progress session, if any (started, not yet ended).
    pub async fn find_active(&self) -> Result<Option<Workout>, sqlx::Error> {
        let row: Option<WorkoutRow> = sqlx::query_as(
            "SELECT * FROM workouts WHERE start_time IS NOT NULL AND end_time IS NULL LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate_workout(row).await.map(Some),
            None => Ok(None),
        }
    }

    /// Historical workouts, most recent first.
    pub async fn list_historical(&self) -> Result<Vec<Workout>, sqlx::Error> {
        let rows: Vec<WorkoutRow> =
            sqlx::query_as("SELECT * FROM workouts WHERE is_template = 0 ORDER BY date_added DESC")
                .fetch_all(&self.pool)
                .await?;
        self.hydrate_all(rows).await
    }

    pub async fn delete_templates(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM workouts WHERE is_template = 1 AND start_time IS NULL")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_historical(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM workouts WHERE is_template = 0")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_templates(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM workouts WHERE is_template = 1 AND start_time IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    pub async fn count_historical(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workouts WHERE is_template = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    async fn insert_exercise(
        &self,
        workout_id: Uuid,
        position: i64,
        exercise: &Exercise,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO exercises (id, workout_id, position, name, sets_planned, sets_done, date_added)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(exercise.id.to_string())
        .bind(workout_id.to_string())
        .bind(position)
        .bind(&exercise.name)
        .bind(exercise.sets_planned as i64)
        .bind(exercise.sets_done as i64)
        .bind(exercise.date_added.to_rfc3339())
        .execute(&self.pool)
        .await?;

        for (set_position, detail) in exercise.set_details.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO set_details (
                    exercise_id, position, reps_planned, weight_planned_value,
                    weight_planned_unit, reps_done, weight_used_value, weight_used_unit
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(exercise.id.to_string())
            .bind(set_position as i64)
            .bind(detail.reps_planned as i64)
            .bind(detail.weight_planned.value)
            .bind(detail.weight_planned.unit.to_string())
            .bind(detail.completed.as_ref().map(|c| c.reps as i64))
            .bind(detail.completed.as_ref().map(|c| c.weight.value))
            .bind(detail.completed.as_ref().map(|c| c.weight.unit.to_string()))
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn hydrate_all(&self, rows: Vec<WorkoutRow>) -> Result<Vec<Workout>, sqlx::Error> {
        let mut workouts = Vec::with_capacity(rows.len());
        for row in rows {
            workouts.push(self.hydrate_workout(row).await?);
        }
        Ok(workouts)
    }

    async fn hydrate_workout(&self, row: WorkoutRow) -> Result<Workout, sqlx::Error> {
        let exercise_rows: Vec<ExerciseRow> = sqlx::query_as(
            "SELECT id, name, sets_planned, sets_done, date_added FROM exercises WHERE workout_id = ? ORDER BY position",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let mut exercises = Vec::with_capacity(exercise_rows.len());
        for exercise_row in exercise_rows {
            exercises.push(self.hydrate_exercise(exercise_row).await?);
        }

        Ok(Workout {
            id: Uuid::parse_str(&row.id).unwrap(),
            name: row.name,
            is_template: row.is_template != 0,
            date_added: parse_timestamp(&row.date_added),
            start_time: row.start_time.as_deref().map(parse_timestamp),
            end_time: row.end_time.as_deref().map(parse_timestamp),
            exercises,
        })
    }

    async fn hydrate_exercise(&self, row: ExerciseRow) -> Result<Exercise, sqlx::Error> {
        let detail_rows: Vec<SetDetailRow> = sqlx::query_as(
            r#"
            SELECT reps_planned, weight_planned_value, weight_planned_unit,
                   reps_done, weight_used_value, weight_used_unit
            FROM set_details WHERE exercise_id = ? ORDER BY position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let set_details = detail_rows.into_iter().map(hydrate_set_detail).collect();

        Ok(Exercise {
            id: Uuid::parse_str(&row.id).unwrap(),
            name: row.name,
            sets_planned: row.sets_planned as u32,
            sets_done: row.sets_done as u32,
            set_details,
            date_added: parse_timestamp(&row.date_added),
        })
    }
}

fn hydrate_set_detail(row: SetDetailRow) -> SetDetail {
    let completed = match (row.reps_done, row.weight_used_value, row.weight_used_unit) {
        (Some(reps), Some(value), Some(unit)) => Some(CompletedSet {
            reps: reps as u32,
            weight: Weight::new(value, parse_unit(&unit)),
        }),
        _ => None,
    };

    SetDetail {
        reps_planned: row.reps_planned as u32,
        weight_planned: Weight::new(row.weight_planned_value, parse_unit(&row.weight_planned_unit)),
        completed,
    }
}

pub(crate) fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn parse_unit(s: &str) -> WeightUnit {
    s.parse().unwrap_or(WeightUnit::Kilograms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn make_repo() -> (WorkoutRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(Some(temp_dir.path().join("test.db"))).await.unwrap();
        (WorkoutRepository::new(pool), temp_dir)
    }

    fn sample_workout() -> Workout {
        let mut workout = Workout::new("Leg Day");
        workout.add(Exercise::new("Squat", 3, 10, Weight::kilograms(40.0)));
        workout.add(Exercise::new("Lunge", 2, 12, Weight::kilograms(20.0)));
        workout
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let (repo, _dir) = make_repo().await;
        let mut workout = sample_workout();
        workout.exercises[0].add_set(10, Weight::kilograms(42.5));
        repo.insert(&workout).await.unwrap();

        let loaded = repo.get_by_id(workout.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Leg Day");
        assert_eq!(loaded.exercises.len(), 2);
        assert_eq!(loaded.exercises[0].sets_done, 1);
        assert_eq!(
            loaded.exercises[0].set_details[0].weight_used(),
            Some(Weight::kilograms(42.5))
        );
        assert!(loaded.exercises[1].set_details[0].completed.is_none());
    }

    #[tokio::test]
    async fn test_template_and_historical_listing() {
        let (repo, _dir) = make_repo().await;

        let older = Workout::new("A");
        let newer = Workout::new("B");
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let mut done = sample_workout();
        done.start();
        done.end();
        repo.insert(&done).await.unwrap();

        let templates = repo.list_templates().await.unwrap();
        assert_eq!(templates.len(), 2);
        // Oldest template first
        assert_eq!(templates[0].id, older.id);

        let historical = repo.list_historical().await.unwrap();
        assert_eq!(historical.len(), 1);
        assert_eq!(historical[0].id, done.id);
    }

    #[tokio::test]
    async fn test_delete_cascades_children() {
        let (repo, _dir) = make_repo().await;
        let workout = sample_workout();
        repo.insert(&workout).await.unwrap();
        repo.delete(workout.id).await.unwrap();

        assert!(repo.get_by_id(workout.id).await.unwrap().is_none());
        assert_eq!(repo.count_templates().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_children() {
        let (repo, _dir) = make_repo().await;
        let mut workout = sample_workout();
        repo.insert(&workout).await.unwrap();

        workout.exercises.truncate(1);
        workout.name = "Leg Day (short)".to_string();
        repo.update(&workout).await.unwrap();

        let loaded = repo.get_by_id(workout.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Leg Day (short)");
        assert_eq!(loaded.exercises.len(), 1);
    }
}
