//! User settings: lazy creation on first access and partial updates.

use anyhow::Result;
use chrono::Utc;
use shared::{UpdateSettingsRequest, UserSettings};
use tracing::info;

use crate::storage::{GoalRepository, SettingsRepository, SqliteConnection};

#[derive(Clone)]
pub struct SettingsService {
    settings_repository: SettingsRepository,
    goal_repository: GoalRepository,
}

impl SettingsService {
    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            settings_repository: SettingsRepository::new(conn.clone()),
            goal_repository: GoalRepository::new(conn),
        }
    }

    /// Fetch the user's settings, creating the row with defaults on first
    /// access. Settings are never deleted.
    pub async fn get_or_create(&self, user_id: &str) -> Result<UserSettings> {
        if let Some(settings) = self.settings_repository.get(user_id).await? {
            return Ok(settings);
        }

        let now = Utc::now();
        let settings = UserSettings {
            user_id: user_id.to_string(),
            monthly_income: 0,
            setup_completed: false,
            active_goal_id: None,
            created_at: now,
            updated_at: now,
        };
        self.settings_repository.upsert(&settings).await?;

        info!("Created settings for user {}", user_id);
        Ok(settings)
    }

    /// Apply a partial update. Absent fields are left untouched.
    pub async fn update(
        &self,
        user_id: &str,
        request: UpdateSettingsRequest,
    ) -> Result<UserSettings> {
        info!("Updating settings for user {}: {:?}", user_id, request);

        let mut settings = self.get_or_create(user_id).await?;

        if let Some(monthly_income) = request.monthly_income {
            if monthly_income < 0 {
                return Err(anyhow::anyhow!("Monthly income cannot be negative"));
            }
            settings.monthly_income = monthly_income;
        }

        if let Some(setup_completed) = request.setup_completed {
            settings.setup_completed = setup_completed;
        }

        if let Some(active_goal_id) = request.active_goal_id {
            if let Some(ref goal_id) = active_goal_id {
                if self.goal_repository.get(user_id, goal_id).await?.is_none() {
                    return Err(anyhow::anyhow!("Savings goal not found: {}", goal_id));
                }
            }
            settings.active_goal_id = active_goal_id;
        }

        settings.updated_at = Utc::now();
        self.settings_repository.upsert(&settings).await?;

        Ok(settings)
    }

    /// Point the settings row at a different active goal. Used by the goal
    /// service when goals are created or deleted.
    pub(crate) async fn set_active_goal(
        &self,
        user_id: &str,
        goal_id: Option<String>,
    ) -> Result<()> {
        let mut settings = self.get_or_create(user_id).await?;
        settings.active_goal_id = goal_id;
        settings.updated_at = Utc::now();
        self.settings_repository.upsert(&settings).await?;
        Ok(())
    }
}
