//! In-memory mirrors of the persisted collections.
//!
//! Reads are served from memory; every mutation updates the mirror and
//! immediately attempts a persistent save. Save failures are swallowed
//! (logged, never surfaced) — the mirrors remain the source of truth for
//! the rest of the process.

use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{
    CacheRepository, InstructionRepository, UserInfoRepository, WorkoutRepository,
};
use crate::models::{ExerciseWeightsCache, UserInfo, Workout};
use crate::sync::{Instruction, PendingInstruction};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no template workout with id {0}")]
    UnknownTemplate(Uuid),
}

pub struct DataStore {
    workouts: WorkoutRepository,
    instructions: InstructionRepository,
    caches: CacheRepository,
    profile: UserInfoRepository,

    pub template_workouts: Vec<Workout>,
    pub historical_workouts: Vec<Workout>,
    pub weights_caches: Vec<ExerciseWeightsCache>,
    pub pending_instructions: Vec<PendingInstruction>,
    pub user_info: UserInfo,
}

impl DataStore {
    /// Loads all mirrors from the store, creating the user info singleton
    /// on first access.
    pub async fn new(pool: SqlitePool) -> Result<Self, sqlx::Error> {
        let workouts = WorkoutRepository::new(pool.clone());
        let instructions = InstructionRepository::new(pool.clone());
        let caches = CacheRepository::new(pool.clone());
        let profile = UserInfoRepository::new(pool);

        let user_info = profile.load_or_create().await?;
        let template_workouts = workouts.list_templates().await?;
        let historical_workouts = workouts.list_historical().await?;
        let weights_caches = caches.list().await?;
        let pending_instructions = instructions.list().await?;

        Ok(Self {
            workouts,
            instructions,
            caches,
            profile,
            template_workouts,
            historical_workouts,
            weights_caches,
            pending_instructions,
            user_info,
        })
    }

    // Template workouts

    pub async fn add_template_workout(&mut self, workout: Workout) {
        assert!(
            workout.is_template,
            "Attempted to add historical workout as template."
        );
        save_best_effort("insert template", self.workouts.insert(&workout).await);
        self.template_workouts.push(workout);
        self.template_workouts
            .sort_by(|a, b| a.date_added.cmp(&b.date_added));
    }

    /// Overwrites the stored template matching the reference's identity.
    pub async fn update_template_workout(&mut self, reference: &Workout) -> Result<(), StoreError> {
        let template = self
            .template_workouts
            .iter_mut()
            .find(|w| w.id == reference.id)
            .ok_or(StoreError::UnknownTemplate(reference.id))?;
        template.apply(reference);
        save_best_effort("update template", self.workouts.update(reference).await);
        Ok(())
    }

    pub async fn delete_template_workout(&mut self, id: Uuid) {
        self.template_workouts.retain(|w| w.id != id);
        save_best_effort("delete template", self.workouts.delete(id).await);
    }

    pub async fn delete_all_template_workouts(&mut self) {
        self.template_workouts.clear();
        save_best_effort("delete templates", self.workouts.delete_templates().await);
    }

    /// The template a new session defaults to.
    pub fn suggested_template(&self) -> Option<&Workout> {
        self.template_workouts.first()
    }

    /// Re-reads the persisted template count (mirror cross-check).
    pub async fn fetch_template_count(&self) -> i64 {
        self.workouts.count_templates().await.unwrap_or(-1)
    }

    // Historical workouts

    pub async fn add_historical_workout(&mut self, workout: Workout) {
        assert!(
            !workout.is_template,
            "Attempted to add template workout as historical."
        );
        save_best_effort("insert historical", self.workouts.insert(&workout).await);
        self.insert_historical_mirror(workout);
    }

    pub async fn delete_all_historical_workouts(&mut self) {
        self.historical_workouts.clear();
        save_best_effort("delete historical", self.workouts.delete_historical().await);
    }

    // Active session

    pub async fn active_session(&self) -> Result<Option<Workout>, sqlx::Error> {
        self.workouts.find_active().await
    }

    /// Persists a newly started session (a started clean copy of a template).
    pub async fn begin_session(&mut self, session: &Workout) {
        save_best_effort("insert session", self.workouts.insert(session).await);
    }

    /// Persists in-progress session state after a completed set.
    pub async fn save_session(&mut self, session: &Workout) {
        save_best_effort("update session", self.workouts.update(session).await);
    }

    /// Drops an in-progress session without recording it.
    pub async fn discard_session(&mut self, id: Uuid) {
        save_best_effort("discard session", self.workouts.delete(id).await);
    }

    /// Finalizes an ended session: the row flips to historical in place and
    /// joins the historical mirror.
    pub async fn complete_session(&mut self, session: Workout) {
        assert!(!session.is_template, "Session must be ended first.");
        save_best_effort("complete session", self.workouts.update(&session).await);
        self.insert_historical_mirror(session);
    }

    // Pending sync instructions

    pub async fn add_pending_instruction(&mut self, instruction: Instruction) {
        let pending = PendingInstruction::new(instruction);
        save_best_effort("insert instruction", self.instructions.insert(&pending).await);
        self.pending_instructions.push(pending);
    }

    pub async fn delete_pending_instruction(&mut self, id: Uuid) {
        self.pending_instructions.retain(|p| p.id != id);
        save_best_effort("delete instruction", self.instructions.delete(id).await);
    }

    /// Removes and returns all pending instructions, oldest first.
    pub async fn take_pending_instructions(&mut self) -> Vec<PendingInstruction> {
        let pending = std::mem::take(&mut self.pending_instructions);
        for instruction in &pending {
            save_best_effort(
                "delete instruction",
                self.instructions.delete(instruction.id).await,
            );
        }
        pending
    }

    // Exercise weights caches

    pub async fn add_weights_cache(&mut self, cache: ExerciseWeightsCache) {
        save_best_effort("insert cache", self.caches.insert(&cache).await);
        self.weights_caches.push(cache);
        self.weights_caches.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Concatenates a partial cache onto the same-named cache, creating it
    /// when none exists. A name mismatch inside the merge is recoverable
    /// and only logged.
    pub async fn merge_weights_cache(&mut self, partial: &ExerciseWeightsCache) {
        match self
            .weights_caches
            .iter()
            .position(|c| c.name == partial.name)
        {
            Some(index) => {
                let before = self.weights_caches[index].weights.len();
                if let Err(e) = self.weights_caches[index].merge_from(partial) {
                    tracing::warn!("Skipped weights cache merge: {}", e);
                    return;
                }
                let cache = self.weights_caches[index].clone();
                save_best_effort(
                    "append cache entries",
                    self.caches.append_entries(&cache, before).await,
                );
            }
            None => self.add_weights_cache(partial.clone()).await,
        }
    }

    // User info

    pub async fn update_user_info(&mut self, change: impl FnOnce(&mut UserInfo)) {
        change(&mut self.user_info);
        save_best_effort("save user info", self.profile.save(&self.user_info).await);
    }

    fn insert_historical_mirror(&mut self, workout: Workout) {
        // Most recent first
        self.historical_workouts.push(workout);
        self.historical_workouts
            .sort_by(|a, b| b.date_added.cmp(&a.date_added));
    }
}

fn save_best_effort(context: &str, result: Result<(), sqlx::Error>) {
    if let Err(e) = result {
        tracing::warn!("Persistent save failed ({}): {}", context, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{Exercise, Weight};
    use tempfile::TempDir;

    async fn make_store() -> (DataStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(Some(temp_dir.path().join("test.db"))).await.unwrap();
        (DataStore::new(pool).await.unwrap(), temp_dir)
    }

    #[tokio::test]
    async fn test_template_counts_agree_after_each_operation() {
        let (mut store, _dir) = make_store().await;

        let first = Workout::new("Template1");
        let second = Workout::new("Template2");
        for workout in [first.clone(), second.clone()] {
            store.add_template_workout(workout).await;
            assert_eq!(
                store.template_workouts.len() as i64,
                store.fetch_template_count().await
            );
        }

        store.delete_template_workout(first.id).await;
        assert_eq!(store.template_workouts.len(), 1);
        assert_eq!(store.fetch_template_count().await, 1);

        store.delete_all_template_workouts().await;
        assert!(store.template_workouts.is_empty());
        assert_eq!(store.fetch_template_count().await, 0);
    }

    #[tokio::test]
    async fn test_add_historical_keeps_most_recent_first() {
        let (mut store, _dir) = make_store().await;

        let mut older = Workout::new("Older");
        older.start();
        older.end();
        let mut newer = Workout::new("Newer");
        newer.date_added = older.date_added + chrono::Duration::seconds(10);
        newer.start();
        newer.end();

        store.add_historical_workout(older.clone()).await;
        store.add_historical_workout(newer.clone()).await;
        assert_eq!(store.historical_workouts[0].id, newer.id);
        assert_eq!(store.historical_workouts[1].id, older.id);
    }

    #[tokio::test]
    async fn test_update_template_requires_known_identity() {
        let (mut store, _dir) = make_store().await;
        let unknown = Workout::new("Ghost");
        assert!(matches!(
            store.update_template_workout(&unknown).await,
            Err(StoreError::UnknownTemplate(id)) if id == unknown.id
        ));

        let mut known = Workout::new("Known");
        store.add_template_workout(known.clone()).await;
        known.name = "Renamed".to_string();
        store.update_template_workout(&known).await.unwrap();
        assert_eq!(store.template_workouts[0].name, "Renamed");
    }

    #[tokio::test]
    async fn test_user_info_singleton_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(Some(temp_dir.path().join("test.db"))).await.unwrap();

        let mut store = DataStore::new(pool.clone()).await.unwrap();
        store
            .update_user_info(|info| {
                info.weight_preference = crate::models::WeightPreference::Pounds
            })
            .await;

        let reloaded = DataStore::new(pool).await.unwrap();
        assert_eq!(
            reloaded.user_info.weight_preference,
            crate::models::WeightPreference::Pounds
        );
    }

    #[tokio::test]
    async fn test_merge_weights_cache_by_name() {
        let (mut store, _dir) = make_store().await;

        let partial = ExerciseWeightsCache::new("Squat", vec![Weight::kilograms(80.0)]);
        store.merge_weights_cache(&partial).await;
        assert_eq!(store.weights_caches.len(), 1);

        // A second partial with a different id but the same name concatenates
        let more = ExerciseWeightsCache::new(
            "Squat",
            vec![Weight::kilograms(85.0), Weight::kilograms(82.5)],
        );
        store.merge_weights_cache(&more).await;
        assert_eq!(store.weights_caches.len(), 1);
        assert_eq!(store.weights_caches[0].weights.len(), 3);
    }

    #[tokio::test]
    async fn test_session_lifecycle_via_store() {
        let (mut store, _dir) = make_store().await;

        let mut template = Workout::new("Leg Day");
        template.add(Exercise::new("Squat", 3, 10, Weight::kilograms(40.0)));
        store.add_template_workout(template.clone()).await;

        let mut session = template.clean_copy();
        session.start();
        store.begin_session(&session).await;

        // The started copy does not appear among templates
        let reloaded = store.active_session().await.unwrap().unwrap();
        assert_eq!(reloaded.id, session.id);
        assert_eq!(store.fetch_template_count().await, 1);

        session.exercises[0].add_set(10, Weight::kilograms(42.5));
        store.save_session(&session).await;

        session.end();
        store.complete_session(session.clone()).await;
        assert_eq!(store.historical_workouts.len(), 1);
        assert!(store.active_session().await.unwrap().is_none());
        assert_eq!(store.fetch_template_count().await, 1);
    }
}
