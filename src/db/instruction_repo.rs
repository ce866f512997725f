use sqlx::SqlitePool;
use uuid::Uuid;

use crate::sync::{Instruction, PendingInstruction};

use super::workout_repo::parse_timestamp;

/// Persists sync instructions while they await transmission.
pub struct InstructionRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct InstructionRow {
    id: String,
    date_added: String,
    instruction: String,
}

impl InstructionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Pending instructions in enqueue (FIFO) order.
    pub async fn list(&self) -> Result<Vec<PendingInstruction>, sqlx::Error> {
        let rows: Vec<InstructionRow> =
            sqlx::query_as("SELECT id, date_added, instruction FROM pending_instructions ORDER BY rowid ASC")
                .fetch_all(&self.pool)
                .await?;

        let mut pending = Vec::with_capacity(rows.len());
        for row in rows {
            let instruction: Instruction = match serde_json::from_str(&row.instruction) {
                Ok(instruction) => instruction,
                Err(e) => {
                    // A row we cannot decode can never be sent; drop it.
                    tracing::warn!("Dropping undecodable pending instruction: {}", e);
                    self.delete(Uuid::parse_str(&row.id).unwrap()).await?;
                    continue;
                }
            };
            pending.push(PendingInstruction {
                id: Uuid::parse_str(&row.id).unwrap(),
                date_added: parse_timestamp(&row.date_added),
                instruction,
            });
        }
        Ok(pending)
    }

    pub async fn insert(&self, pending: &PendingInstruction) -> Result<(), sqlx::Error> {
        let encoded = serde_json::to_string(&pending.instruction)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query("INSERT INTO pending_instructions (id, date_added, instruction) VALUES (?, ?, ?)")
            .bind(pending.id.to_string())
            .bind(pending.date_added.to_rfc3339())
            .bind(encoded)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM pending_instructions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_instructions")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::Workout;
    use tempfile::TempDir;

    async fn make_repo() -> (InstructionRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(Some(temp_dir.path().join("test.db"))).await.unwrap();
        (InstructionRepository::new(pool), temp_dir)
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let (repo, _dir) = make_repo().await;

        let first = PendingInstruction::new(Instruction::AddTemplateWorkout(Workout::new("A")));
        let second = PendingInstruction::new(Instruction::DeleteAllTemplateWorkouts {});
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let (repo, _dir) = make_repo().await;
        let pending = PendingInstruction::new(Instruction::DeleteAllHistoricalWorkouts {});
        repo.insert(&pending).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);
        repo.delete(pending.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
