//! User settings storage, keyed by `user_id` with upsert semantics.

use shared::UserSettings;
use sqlx::Row;

use crate::storage::db::SqliteConnection;
use crate::storage::error::StoreResult;

#[derive(Clone)]
pub struct SettingsRepository {
    conn: SqliteConnection,
}

impl SettingsRepository {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: &str) -> StoreResult<Option<UserSettings>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, monthly_income, setup_completed, active_goal_id, created_at, updated_at
            FROM user_settings
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.conn.pool())
        .await?;

        Ok(row.map(|r| Self::from_row(&r)))
    }

    /// Insert or replace the single row for this user.
    pub async fn upsert(&self, settings: &UserSettings) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_settings (user_id, monthly_income, setup_completed, active_goal_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                monthly_income = excluded.monthly_income,
                setup_completed = excluded.setup_completed,
                active_goal_id = excluded.active_goal_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&settings.user_id)
        .bind(settings.monthly_income)
        .bind(settings.setup_completed)
        .bind(&settings.active_goal_id)
        .bind(settings.created_at)
        .bind(settings.updated_at)
        .execute(self.conn.pool())
        .await?;
        Ok(())
    }

    fn from_row(row: &sqlx::sqlite::SqliteRow) -> UserSettings {
        UserSettings {
            user_id: row.get("user_id"),
            monthly_income: row.get("monthly_income"),
            setup_completed: row.get("setup_completed"),
            active_goal_id: row.get("active_goal_id"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
