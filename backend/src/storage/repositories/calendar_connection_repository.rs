//! Persisted calendar provider token state, one row per user.

use shared::CalendarConnection;
use sqlx::Row;

use crate::storage::db::SqliteConnection;
use crate::storage::error::StoreResult;

#[derive(Clone)]
pub struct CalendarConnectionRepository {
    conn: SqliteConnection,
}

impl CalendarConnectionRepository {
    pub fn new(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: &str) -> StoreResult<Option<CalendarConnection>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, access_token, refresh_token, expires_at, updated_at
            FROM calendar_connections
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.conn.pool())
        .await?;

        Ok(row.map(|r| CalendarConnection {
            user_id: r.get("user_id"),
            access_token: r.get("access_token"),
            refresh_token: r.get("refresh_token"),
            expires_at: r.get("expires_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn upsert(&self, connection: &CalendarConnection) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO calendar_connections (user_id, access_token, refresh_token, expires_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&connection.user_id)
        .bind(&connection.access_token)
        .bind(&connection.refresh_token)
        .bind(connection.expires_at)
        .bind(connection.updated_at)
        .execute(self.conn.pool())
        .await?;
        Ok(())
    }

    pub async fn delete(&self, user_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM calendar_connections WHERE user_id = ?")
            .bind(user_id)
            .execute(self.conn.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
