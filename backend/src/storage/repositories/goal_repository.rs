//! Savings goal storage. Goals are listed oldest first so the earliest
//! remaining goal can be promoted when the active one is deleted.

use shared::SavingsGoal;
use sqlx::Row;

use crate::storage::db::SqliteConnection;
use crate::storage::error::{StoreError, StoreResult};

#[derive(Clone)]
pub struct GoalRepository {
    conn: SqliteConnection,
}

impl GoalRepository {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, goal: &SavingsGoal) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO savings_goals (id, user_id, title, description, target_amount, target_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&goal.id)
        .bind(&goal.user_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_amount)
        .bind(goal.target_date)
        .bind(goal.created_at)
        .execute(self.conn.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str, id: &str) -> StoreResult<Option<SavingsGoal>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, title, description, target_amount, target_date, created_at
            FROM savings_goals
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.conn.pool())
        .await?;

        Ok(row.map(|r| Self::from_row(&r)))
    }

    /// All goals for a user, earliest-inserted first.
    pub async fn list(&self, user_id: &str) -> StoreResult<Vec<SavingsGoal>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, title, description, target_amount, target_date, created_at
            FROM savings_goals
            WHERE user_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn.pool())
        .await?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    pub async fn update(&self, goal: &SavingsGoal) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE savings_goals
            SET title = ?, description = ?, target_amount = ?, target_date = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target_amount)
        .bind(goal.target_date)
        .bind(&goal.user_id)
        .bind(&goal.id)
        .execute(self.conn.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("savings goal"));
        }
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM savings_goals WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.conn.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &sqlx::sqlite::SqliteRow) -> SavingsGoal {
        SavingsGoal {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            target_amount: row.get("target_amount"),
            target_date: row.get("target_date"),
            created_at: row.get("created_at"),
        }
    }
}
