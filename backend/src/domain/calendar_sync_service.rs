//! Calendar provider integration: token persistence, refresh-before-expiry
//! and event listing.
//!
//! Failures here must never reach the budget view. A missing, expired or
//! unrefreshable connection degrades to "disconnected" and an empty event
//! list.

use anyhow::Result;
use chrono::{Duration, Utc};
use shared::{CalendarConnection, CalendarEvent, Month};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::calendar_provider::CalendarProvider;
use crate::storage::{CalendarConnectionRepository, SqliteConnection};

/// Tokens expiring within this margin are refreshed before use.
const REFRESH_MARGIN_SECONDS: i64 = 60;

#[derive(Clone)]
pub struct CalendarSyncService {
    connection_repository: CalendarConnectionRepository,
    provider: Arc<dyn CalendarProvider>,
}

impl CalendarSyncService {
    pub fn new(conn: SqliteConnection, provider: Arc<dyn CalendarProvider>) -> Self {
        Self {
            connection_repository: CalendarConnectionRepository::new(conn),
            provider,
        }
    }

    /// Start the authorization handshake.
    pub fn connect_url(&self, user_id: &str) -> Result<String> {
        self.provider.authorize_url(user_id)
    }

    /// Complete the handshake: exchange the code and persist the tokens.
    pub async fn complete_connection(&self, user_id: &str, code: &str) -> Result<()> {
        let tokens = self.provider.exchange_code(code).await?;
        let now = Utc::now();
        self.connection_repository
            .upsert(&CalendarConnection {
                user_id: user_id.to_string(),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_at: now + Duration::seconds(tokens.expires_in),
                updated_at: now,
            })
            .await?;

        info!("Calendar connected for user {}", user_id);
        Ok(())
    }

    /// Whether a usable connection exists: a live token, or an expired one
    /// we could still refresh.
    pub async fn status(&self, user_id: &str) -> Result<bool> {
        let Some(connection) = self.connection_repository.get(user_id).await? else {
            return Ok(false);
        };
        Ok(connection.expires_at > Utc::now() || connection.refresh_token.is_some())
    }

    /// Events overlapping the given month. Degrades to an empty list on any
    /// provider or connection failure.
    pub async fn events_for_month(&self, user_id: &str, month: Month) -> Vec<CalendarEvent> {
        let access_token = match self.fresh_access_token(user_id).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No calendar connection for user {}, returning no events", user_id);
                return Vec::new();
            }
            Err(e) => {
                warn!("Calendar token handling failed for user {}: {}", user_id, e);
                return Vec::new();
            }
        };

        // Provider window is [start, end); one retry on a transient failure,
        // then degrade to no events
        let (start, end) = (month.first_day(), month.next().first_day());
        match self.provider.list_events(&access_token, start, end).await {
            Ok(events) => events,
            Err(first) => {
                debug!(
                    "Calendar event listing failed for user {}, retrying once: {}",
                    user_id, first
                );
                match self.provider.list_events(&access_token, start, end).await {
                    Ok(events) => events,
                    Err(e) => {
                        warn!("Calendar event listing failed for user {}: {}", user_id, e);
                        Vec::new()
                    }
                }
            }
        }
    }

    /// A token valid for at least the refresh margin, refreshing and
    /// re-persisting when needed. `None` means disconnected.
    async fn fresh_access_token(&self, user_id: &str) -> Result<Option<String>> {
        let Some(connection) = self.connection_repository.get(user_id).await? else {
            return Ok(None);
        };

        let deadline = Utc::now() + Duration::seconds(REFRESH_MARGIN_SECONDS);
        if connection.expires_at > deadline {
            return Ok(Some(connection.access_token));
        }

        let Some(refresh_token) = connection.refresh_token.clone() else {
            info!(
                "Calendar token expired without refresh token for user {}, disconnecting",
                user_id
            );
            self.connection_repository.delete(user_id).await?;
            return Ok(None);
        };

        match self.provider.refresh(&refresh_token).await {
            Ok(tokens) => {
                let now = Utc::now();
                let refreshed = CalendarConnection {
                    user_id: user_id.to_string(),
                    access_token: tokens.access_token.clone(),
                    // Providers may rotate or omit the refresh token
                    refresh_token: tokens.refresh_token.or(Some(refresh_token)),
                    expires_at: now + Duration::seconds(tokens.expires_in),
                    updated_at: now,
                };
                self.connection_repository.upsert(&refreshed).await?;
                debug!("Refreshed calendar token for user {}", user_id);
                Ok(Some(tokens.access_token))
            }
            Err(e) => {
                warn!(
                    "Calendar token refresh failed for user {}, disconnecting: {}",
                    user_id, e
                );
                self.connection_repository.delete(user_id).await?;
                Ok(None)
            }
        }
    }
}
