//! Savings goal management.
//!
//! Exactly one goal governs budget math at any time, referenced explicitly
//! by `UserSettings::active_goal_id`. The first goal a user creates becomes
//! active; deleting the active goal promotes the earliest remaining one.

use anyhow::Result;
use chrono::Utc;
use shared::{CreateGoalRequest, SavingsGoal, UpdateGoalRequest};
use tracing::{info, warn};

use crate::domain::settings_service::SettingsService;
use crate::storage::{GoalRepository, SqliteConnection};

const MAX_TITLE_LENGTH: usize = 256;

#[derive(Clone)]
pub struct GoalService {
    goal_repository: GoalRepository,
    settings_service: SettingsService,
}

impl GoalService {
    pub fn new(conn: SqliteConnection, settings_service: SettingsService) -> Self {
        Self {
            goal_repository: GoalRepository::new(conn),
            settings_service,
        }
    }

    pub async fn create(&self, user_id: &str, request: CreateGoalRequest) -> Result<SavingsGoal> {
        info!("Creating goal for user {}: {:?}", user_id, request);

        Self::validate(&request.title, request.target_amount)?;

        let goal = SavingsGoal {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: request.title.trim().to_string(),
            description: request.description,
            target_amount: request.target_amount,
            target_date: request.target_date,
            created_at: Utc::now(),
        };
        self.goal_repository.create(&goal).await?;

        // The first goal becomes the active one
        let settings = self.settings_service.get_or_create(user_id).await?;
        if settings.active_goal_id.is_none() {
            self.settings_service
                .set_active_goal(user_id, Some(goal.id.clone()))
                .await?;
            info!("Goal {} set active for user {}", goal.id, user_id);
        }

        Ok(goal)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateGoalRequest,
    ) -> Result<SavingsGoal> {
        info!("Updating goal {} for user {}: {:?}", id, user_id, request);

        let mut goal = self
            .goal_repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Savings goal not found: {}", id))?;

        if let Some(title) = request.title {
            goal.title = title.trim().to_string();
        }
        if let Some(description) = request.description {
            goal.description = description;
        }
        if let Some(target_amount) = request.target_amount {
            goal.target_amount = target_amount;
        }
        if let Some(target_date) = request.target_date {
            goal.target_date = target_date;
        }
        Self::validate(&goal.title, goal.target_amount)?;

        self.goal_repository.update(&goal).await?;
        Ok(goal)
    }

    /// Delete a goal. When the active goal goes away the earliest remaining
    /// goal takes over, matching the original earliest-inserted ordering.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        info!("Deleting goal {} for user {}", id, user_id);

        if !self.goal_repository.delete(user_id, id).await? {
            return Err(anyhow::anyhow!("Savings goal not found: {}", id));
        }

        let settings = self.settings_service.get_or_create(user_id).await?;
        if settings.active_goal_id.as_deref() == Some(id) {
            let successor = self
                .goal_repository
                .list(user_id)
                .await?
                .into_iter()
                .next()
                .map(|g| g.id);
            info!(
                "Active goal {} deleted for user {}, promoting {:?}",
                id, user_id, successor
            );
            self.settings_service
                .set_active_goal(user_id, successor)
                .await?;
        }
        Ok(())
    }

    pub async fn list(&self, user_id: &str) -> Result<(Vec<SavingsGoal>, Option<String>)> {
        let goals = self.goal_repository.list(user_id).await?;
        let settings = self.settings_service.get_or_create(user_id).await?;
        Ok((goals, settings.active_goal_id))
    }

    /// The goal currently governing budget math, if any.
    pub async fn active_goal(&self, user_id: &str) -> Result<Option<SavingsGoal>> {
        let settings = self.settings_service.get_or_create(user_id).await?;
        let Some(goal_id) = settings.active_goal_id else {
            return Ok(None);
        };

        let goal = self.goal_repository.get(user_id, &goal_id).await?;
        if goal.is_none() {
            warn!(
                "Active goal {} for user {} no longer exists",
                goal_id, user_id
            );
        }
        Ok(goal)
    }

    fn validate(title: &str, target_amount: i64) -> Result<()> {
        if title.trim().is_empty() {
            return Err(anyhow::anyhow!("Goal title cannot be empty"));
        }
        if title.len() > MAX_TITLE_LENGTH {
            return Err(anyhow::anyhow!(
                "Goal title cannot exceed {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        if target_amount <= 0 {
            return Err(anyhow::anyhow!("Goal target amount must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn service() -> GoalService {
        let conn = SqliteConnection::connect_test().await.unwrap();
        let settings_service = SettingsService::new(conn.clone());
        GoalService::new(conn, settings_service)
    }

    fn goal_request(title: &str, target_amount: i64) -> CreateGoalRequest {
        CreateGoalRequest {
            title: title.to_string(),
            description: String::new(),
            target_amount,
            target_date: date(2026, 1, 1),
        }
    }

    #[tokio::test]
    async fn test_first_goal_becomes_active() {
        let service = service().await;

        let first = service.create("user-1", goal_request("Trip", 100_000)).await.unwrap();
        let second = service.create("user-1", goal_request("Camera", 50_000)).await.unwrap();

        let (goals, active_id) = service.list("user-1").await.unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(active_id.as_deref(), Some(first.id.as_str()));

        let active = service.active_goal("user-1").await.unwrap().unwrap();
        assert_eq!(active.id, first.id);
        assert_ne!(active.id, second.id);
    }

    #[tokio::test]
    async fn test_deleting_active_goal_promotes_earliest_remaining() {
        let service = service().await;

        let first = service.create("user-1", goal_request("Trip", 100_000)).await.unwrap();
        let second = service.create("user-1", goal_request("Camera", 50_000)).await.unwrap();
        let _third = service.create("user-1", goal_request("Sofa", 70_000)).await.unwrap();

        service.delete("user-1", &first.id).await.unwrap();

        let active = service.active_goal("user-1").await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn test_deleting_last_goal_clears_active() {
        let service = service().await;

        let goal = service.create("user-1", goal_request("Trip", 100_000)).await.unwrap();
        service.delete("user-1", &goal.id).await.unwrap();

        assert!(service.active_goal("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_inactive_goal_keeps_active() {
        let service = service().await;

        let first = service.create("user-1", goal_request("Trip", 100_000)).await.unwrap();
        let second = service.create("user-1", goal_request("Camera", 50_000)).await.unwrap();

        service.delete("user-1", &second.id).await.unwrap();

        let active = service.active_goal("user-1").await.unwrap().unwrap();
        assert_eq!(active.id, first.id);
    }

    #[tokio::test]
    async fn test_validation() {
        let service = service().await;

        assert!(service.create("user-1", goal_request("", 100_000)).await.is_err());
        assert!(service.create("user-1", goal_request("Trip", 0)).await.is_err());
        assert!(service.create("user-1", goal_request("Trip", -5)).await.is_err());
    }

    #[tokio::test]
    async fn test_update_goal() {
        let service = service().await;

        let goal = service.create("user-1", goal_request("Trip", 100_000)).await.unwrap();
        let updated = service
            .update(
                "user-1",
                &goal.id,
                UpdateGoalRequest {
                    title: None,
                    description: Some("Okinawa".to_string()),
                    target_amount: Some(150_000),
                    target_date: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.target_amount, 150_000);
        assert_eq!(updated.description, "Okinawa");
        assert_eq!(updated.title, "Trip");
    }
}
