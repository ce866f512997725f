use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{ExerciseWeightsCache, Weight};

use super::workout_repo::parse_unit;

pub struct CacheRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CacheRow {
    id: String,
    name: String,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    value: f64,
    unit: String,
}

impl CacheRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All caches, ordered by exercise name.
    pub async fn list(&self) -> Result<Vec<ExerciseWeightsCache>, sqlx::Error> {
        let rows: Vec<CacheRow> = sqlx::query_as("SELECT * FROM weights_caches ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        let mut caches = Vec::with_capacity(rows.len());
        for row in rows {
            let entries: Vec<EntryRow> = sqlx::query_as(
                "SELECT value, unit FROM weights_cache_entries WHERE cache_id = ? ORDER BY position",
            )
            .bind(&row.id)
            .fetch_all(&self.pool)
            .await?;

            caches.push(ExerciseWeightsCache {
                id: Uuid::parse_str(&row.id).unwrap(),
                name: row.name,
                weights: entries
                    .into_iter()
                    .map(|e| Weight::new(e.value, parse_unit(&e.unit)))
                    .collect(),
            });
        }
        Ok(caches)
    }

    pub async fn insert(&self, cache: &ExerciseWeightsCache) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO weights_caches (id, name) VALUES (?, ?)")
            .bind(cache.id.to_string())
            .bind(&cache.name)
            .execute(&self.pool)
            .await?;
        self.insert_entries(cache, 0).await
    }

    /// Rewrites a cache's entry list after a merge. Entries are append-only,
    /// so only positions past `from_position` need writing.
    pub async fn append_entries(
        &self,
        cache: &ExerciseWeightsCache,
        from_position: usize,
    ) -> Result<(), sqlx::Error> {
        self.insert_entries(cache, from_position).await
    }

    async fn insert_entries(
        &self,
        cache: &ExerciseWeightsCache,
        from_position: usize,
    ) -> Result<(), sqlx::Error> {
        for (position, weight) in cache.weights.iter().enumerate().skip(from_position) {
            sqlx::query(
                "INSERT INTO weights_cache_entries (cache_id, position, value, unit) VALUES (?, ?, ?, ?)",
            )
            .bind(cache.id.to_string())
            .bind(position as i64)
            .bind(weight.value)
            .bind(weight.unit.to_string())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM weights_caches")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn make_repo() -> (CacheRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(Some(temp_dir.path().join("test.db"))).await.unwrap();
        (CacheRepository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (repo, _dir) = make_repo().await;
        let cache = ExerciseWeightsCache::new(
            "Bench Press",
            vec![Weight::kilograms(100.0), Weight::pounds(225.0)],
        );
        repo.insert(&cache).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], cache);
    }

    #[tokio::test]
    async fn test_append_entries_preserves_order() {
        let (repo, _dir) = make_repo().await;
        let mut cache = ExerciseWeightsCache::new("Squat", vec![Weight::kilograms(80.0)]);
        repo.insert(&cache).await.unwrap();

        let before = cache.weights.len();
        cache.weights.push(Weight::kilograms(85.0));
        cache.weights.push(Weight::kilograms(82.5));
        repo.append_entries(&cache, before).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].weights.len(), 3);
        assert_eq!(listed[0].weights[2], Weight::kilograms(82.5));
    }
}
