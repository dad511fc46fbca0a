//! Recurring monthly costs. Each entry contributes its full amount to every
//! month regardless of when it was created.

use anyhow::Result;
use chrono::Utc;
use shared::{CreateFixedExpenseRequest, FixedExpense, UpdateFixedExpenseRequest};
use tracing::info;

use crate::storage::{FixedExpenseRepository, SqliteConnection};

#[derive(Clone)]
pub struct FixedExpenseService {
    fixed_expense_repository: FixedExpenseRepository,
}

impl FixedExpenseService {
    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            fixed_expense_repository: FixedExpenseRepository::new(conn),
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        request: CreateFixedExpenseRequest,
    ) -> Result<FixedExpense> {
        info!("Creating fixed expense for user {}: {:?}", user_id, request);

        Self::validate(&request.name, request.amount)?;

        let fixed = FixedExpense {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: request.name.trim().to_string(),
            amount: request.amount,
            category: request.category,
            created_at: Utc::now(),
        };
        self.fixed_expense_repository.create(&fixed).await?;

        Ok(fixed)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateFixedExpenseRequest,
    ) -> Result<FixedExpense> {
        info!(
            "Updating fixed expense {} for user {}: {:?}",
            id, user_id, request
        );

        let mut fixed = self
            .fixed_expense_repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Fixed expense not found: {}", id))?;

        if let Some(name) = request.name {
            fixed.name = name.trim().to_string();
        }
        if let Some(amount) = request.amount {
            fixed.amount = amount;
        }
        if let Some(category) = request.category {
            fixed.category = category;
        }
        Self::validate(&fixed.name, fixed.amount)?;

        self.fixed_expense_repository.update(&fixed).await?;
        Ok(fixed)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        info!("Deleting fixed expense {} for user {}", id, user_id);

        if !self.fixed_expense_repository.delete(user_id, id).await? {
            return Err(anyhow::anyhow!("Fixed expense not found: {}", id));
        }
        Ok(())
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<FixedExpense>> {
        Ok(self.fixed_expense_repository.list(user_id).await?)
    }

    fn validate(name: &str, amount: i64) -> Result<()> {
        if name.trim().is_empty() {
            return Err(anyhow::anyhow!("Fixed expense name cannot be empty"));
        }
        if amount <= 0 {
            return Err(anyhow::anyhow!("Fixed expense amount must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> FixedExpenseService {
        let conn = SqliteConnection::connect_test().await.unwrap();
        FixedExpenseService::new(conn)
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let service = service().await;

        let fixed = service
            .create(
                "user-1",
                CreateFixedExpenseRequest {
                    name: "Rent".to_string(),
                    amount: 80_000,
                    category: "住居費".to_string(),
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                "user-1",
                &fixed.id,
                UpdateFixedExpenseRequest {
                    name: None,
                    amount: Some(85_000),
                    category: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, 85_000);
        assert_eq!(updated.name, "Rent");

        service.delete("user-1", &fixed.id).await.unwrap();
        assert!(service.list("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let service = service().await;

        for amount in [0, -500] {
            let result = service
                .create(
                    "user-1",
                    CreateFixedExpenseRequest {
                        name: "Rent".to_string(),
                        amount,
                        category: "住居費".to_string(),
                    },
                )
                .await;
            assert!(result.is_err());
        }
    }

    #[tokio::test]
    async fn test_list_scoped_to_user() {
        let service = service().await;

        service
            .create(
                "user-1",
                CreateFixedExpenseRequest {
                    name: "Rent".to_string(),
                    amount: 80_000,
                    category: "住居費".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(service.list("user-2").await.unwrap().is_empty());
    }
}
