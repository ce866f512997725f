use sqlx::SqlitePool;

use crate::models::{AggregationMethod, UserInfo, WeightPreference};

/// Persists the singleton [`UserInfo`] record.
pub struct UserInfoRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserInfoRow {
    weight_preference: String,
    was_companion_installed: i64,
    aggregation_method: String,
}

impl UserInfoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Loads the user info record, creating it on first access.
    ///
    /// The schema's single-row constraint makes a duplicate impossible to
    /// insert; finding anything other than zero or one row is a programmer
    /// error.
    pub async fn load_or_create(&self) -> Result<UserInfo, sqlx::Error> {
        let rows: Vec<UserInfoRow> = sqlx::query_as("SELECT weight_preference, was_companion_installed, aggregation_method FROM user_info")
            .fetch_all(&self.pool)
            .await?;

        assert!(rows.len() <= 1, "Multiple user_info rows found");

        match rows.into_iter().next() {
            Some(row) => Ok(UserInfo {
                weight_preference: row
                    .weight_preference
                    .parse()
                    .unwrap_or(WeightPreference::System),
                was_companion_installed: row.was_companion_installed != 0,
                aggregation_method: row
                    .aggregation_method
                    .parse()
                    .unwrap_or(AggregationMethod::All),
            }),
            None => {
                let info = UserInfo::default();
                self.save(&info).await?;
                Ok(info)
            }
        }
    }

    pub async fn save(&self, info: &UserInfo) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_info (id, weight_preference, was_companion_installed, aggregation_method)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                weight_preference = excluded.weight_preference,
                was_companion_installed = excluded.was_companion_installed,
                aggregation_method = excluded.aggregation_method
            "#,
        )
        .bind(info.weight_preference.to_string())
        .bind(info.was_companion_installed as i64)
        .bind(info.aggregation_method.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
