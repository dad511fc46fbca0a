//! Ledger entry storage. Every operation is scoped to a single user.

use chrono::NaiveDate;
use shared::{Expense, Month};
use sqlx::Row;

use crate::storage::db::SqliteConnection;
use crate::storage::error::{StoreError, StoreResult};

#[derive(Clone)]
pub struct ExpenseRepository {
    conn: SqliteConnection,
}

impl ExpenseRepository {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, expense: &Expense) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, user_id, amount, category, description, expense_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.user_id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.expense_date)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .execute(self.conn.pool())
        .await?;
        Ok(())
    }

    /// Insert a batch of entries in a single transaction: all rows land or
    /// none do.
    pub async fn create_batch(&self, expenses: &[Expense]) -> StoreResult<()> {
        if expenses.is_empty() {
            return Ok(());
        }

        let mut tx = self.conn.pool().begin().await?;
        for expense in expenses {
            sqlx::query(
                r#"
                INSERT INTO expenses (id, user_id, amount, category, description, expense_date, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&expense.id)
            .bind(&expense.user_id)
            .bind(expense.amount)
            .bind(&expense.category)
            .bind(&expense.description)
            .bind(expense.expense_date)
            .bind(expense.created_at)
            .bind(expense.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, user_id: &str, id: &str) -> StoreResult<Option<Expense>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, amount, category, description, expense_date, created_at, updated_at
            FROM expenses
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(self.conn.pool())
        .await?;

        Ok(row.map(|r| Self::from_row(&r)))
    }

    /// Entries dated within the given month, oldest first.
    pub async fn list_by_month(&self, user_id: &str, month: Month) -> StoreResult<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, amount, category, description, expense_date, created_at, updated_at
            FROM expenses
            WHERE user_id = ? AND expense_date >= ? AND expense_date <= ?
            ORDER BY expense_date ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(month.first_day())
        .bind(month.last_day())
        .fetch_all(self.conn.pool())
        .await?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    pub async fn list_by_date(&self, user_id: &str, date: NaiveDate) -> StoreResult<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, amount, category, description, expense_date, created_at, updated_at
            FROM expenses
            WHERE user_id = ? AND expense_date = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(self.conn.pool())
        .await?;

        Ok(rows.iter().map(Self::from_row).collect())
    }

    /// The earliest ledger date for a user, used to locate the ledger start.
    pub async fn earliest_expense_date(&self, user_id: &str) -> StoreResult<Option<NaiveDate>> {
        let row = sqlx::query(
            r#"
            SELECT MIN(expense_date) AS earliest
            FROM expenses
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(self.conn.pool())
        .await?;

        Ok(row.get::<Option<NaiveDate>, _>("earliest"))
    }

    pub async fn update(&self, expense: &Expense) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET amount = ?, category = ?, description = ?, expense_date = ?, updated_at = ?
            WHERE user_id = ? AND id = ?
            "#,
        )
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(expense.expense_date)
        .bind(expense.updated_at)
        .bind(&expense.user_id)
        .bind(&expense.id)
        .execute(self.conn.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("expense"));
        }
        Ok(())
    }

    /// Returns true when a row was actually deleted.
    pub async fn delete(&self, user_id: &str, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(self.conn.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Expense {
        Expense {
            id: row.get("id"),
            user_id: row.get("user_id"),
            amount: row.get("amount"),
            category: row.get("category"),
            description: row.get("description"),
            expense_date: row.get("expense_date"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
