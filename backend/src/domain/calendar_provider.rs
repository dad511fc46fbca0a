//! Seam to the external calendar provider.
//!
//! The provider is an external collaborator: the service only needs an
//! authorization handshake, a token refresh and a read-only event listing,
//! so it is modelled as a trait and injected. The wire transport behind a
//! real provider lives outside this crate; tests substitute fakes.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{CalendarEvent, TokenSet};

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// URL the user opens to start the authorization handshake.
    fn authorize_url(&self, user_id: &str) -> Result<String>;

    /// Exchange the handshake code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<TokenSet>;

    /// Obtain a fresh token set from a refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet>;

    /// Events within `[start, end)`.
    async fn list_events(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CalendarEvent>>;
}

/// Stand-in used when no provider is wired up. Every operation reports the
/// integration as unavailable, which callers degrade to "disconnected".
pub struct UnconfiguredProvider;

#[async_trait]
impl CalendarProvider for UnconfiguredProvider {
    fn authorize_url(&self, _user_id: &str) -> Result<String> {
        Err(anyhow::anyhow!("No calendar provider is configured"))
    }

    async fn exchange_code(&self, _code: &str) -> Result<TokenSet> {
        Err(anyhow::anyhow!("No calendar provider is configured"))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenSet> {
        Err(anyhow::anyhow!("No calendar provider is configured"))
    }

    async fn list_events(
        &self,
        _access_token: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<CalendarEvent>> {
        Err(anyhow::anyhow!("No calendar provider is configured"))
    }
}
