//! Persisted month rollover amounts, at most one row per
//! `(user_id, year, month)`.

use shared::{Month, MonthlyCarryover};
use sqlx::Row;

use crate::storage::db::SqliteConnection;
use crate::storage::error::StoreResult;

#[derive(Clone)]
pub struct CarryoverRepository {
    conn: SqliteConnection,
}

impl CarryoverRepository {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: &str, month: Month) -> StoreResult<Option<MonthlyCarryover>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, year, month, carryover_amount, computed_at
            FROM monthly_carryovers
            WHERE user_id = ? AND year = ? AND month = ?
            "#,
        )
        .bind(user_id)
        .bind(month.year)
        .bind(month.month)
        .fetch_optional(self.conn.pool())
        .await?;

        Ok(row.map(|r| MonthlyCarryover {
            user_id: r.get("user_id"),
            year: r.get("year"),
            month: r.get("month"),
            carryover_amount: r.get("carryover_amount"),
            computed_at: r.get("computed_at"),
        }))
    }

    /// Idempotent per month key: repeated writes replace the stored amount.
    pub async fn upsert(&self, carryover: &MonthlyCarryover) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO monthly_carryovers (user_id, year, month, carryover_amount, computed_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, year, month) DO UPDATE SET
                carryover_amount = excluded.carryover_amount,
                computed_at = excluded.computed_at
            "#,
        )
        .bind(&carryover.user_id)
        .bind(carryover.year)
        .bind(carryover.month)
        .bind(carryover.carryover_amount)
        .bind(carryover.computed_at)
        .execute(self.conn.pool())
        .await?;
        Ok(())
    }
}
