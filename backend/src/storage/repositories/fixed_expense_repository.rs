//! Recurring monthly cost storage.

use chrono::{DateTime, Utc};
use shared::FixedExpense;
use sqlx::Row;

use crate::storage::db::SqliteConnection;
use crate::storage::error::{StoreError, StoreResult};

#[derive(Clone)]
pub struct FixedExpenseRepository {
    conn: SqliteConnection,
}

impl FixedExpenseRepository {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, fixed: &FixedExpense) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fixed_expenses (id, user_id, name, amount, category, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&fixed.id)
        .bind(&fixed.user_id)
        .bind(&fixed.name)
        .bind(fixed.amount)
        .bind(&fixed.category)
        .bind(fixed.created_at)
        .execute(self.conn.pool())
        .await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str, id: &str) -> StoreResult<Option<FixedExpense>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, amount, category, created_at
            FROM fixed_expenses
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.conn.pool())
        .await?;

        Ok(row.map(|r| Self::from_row(&r)))
    }

    pub async fn list(&self, user_id: &str) -> StoreResult<Vec<FixedExpense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, amount, category, created_at
            FROM fixed_expenses
            WHERE user_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.conn.pool())
        .await?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    pub async fn earliest_created_at(&self, user_id: &str) -> StoreResult<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            r#"
            SELECT MIN(created_at) AS earliest
            FROM fixed_expenses
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(self.conn.pool())
        .await?;

        Ok(row.get::<Option<DateTime<Utc>>, _>("earliest"))
    }

    pub async fn update(&self, fixed: &FixedExpense) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE fixed_expenses
            SET name = ?, amount = ?, category = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(&fixed.name)
        .bind(fixed.amount)
        .bind(&fixed.category)
        .bind(&fixed.user_id)
        .bind(&fixed.id)
        .execute(self.conn.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("fixed expense"));
        }
        Ok(())
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fixed_expenses WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.conn.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &sqlx::sqlite::SqliteRow) -> FixedExpense {
        FixedExpense {
            id: row.get("id"),
            user_id: row.get("user_id"),
            name: row.get("name"),
            amount: row.get("amount"),
            category: row.get("category"),
            created_at: row.get("created_at"),
        }
    }
}
