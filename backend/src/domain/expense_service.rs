//! Ledger entry management: single CRUD plus weekday bulk insert.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use shared::{CreateExpenseBatchRequest, CreateExpenseRequest, Expense, Month, UpdateExpenseRequest};
use tracing::info;

use crate::storage::{ExpenseRepository, SqliteConnection};

const MAX_DESCRIPTION_LENGTH: usize = 256;
/// Upper bound on a bulk-insert date range.
const MAX_BATCH_RANGE_DAYS: i64 = 366;

#[derive(Clone)]
pub struct ExpenseService {
    expense_repository: ExpenseRepository,
}

impl ExpenseService {
    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            expense_repository: ExpenseRepository::new(conn),
        }
    }

    pub async fn create(&self, user_id: &str, request: CreateExpenseRequest) -> Result<Expense> {
        info!("Creating expense for user {}: {:?}", user_id, request);

        Self::validate_amount(request.amount)?;
        Self::validate_text(&request.category, &request.description)?;

        let now = Utc::now();
        let expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            amount: request.amount,
            category: request.category,
            description: request.description,
            expense_date: request.expense_date,
            created_at: now,
            updated_at: now,
        };
        self.expense_repository.create(&expense).await?;

        Ok(expense)
    }

    /// Bulk insert: one entry per date in the range whose weekday is in
    /// `days_of_week` (0 = Sunday … 6 = Saturday). All rows land in a single
    /// storage transaction.
    pub async fn create_batch(
        &self,
        user_id: &str,
        request: CreateExpenseBatchRequest,
    ) -> Result<Vec<Expense>> {
        info!("Bulk inserting expenses for user {}: {:?}", user_id, request);

        Self::validate_amount(request.amount)?;
        Self::validate_text(&request.category, &request.description)?;

        if request.days_of_week.is_empty() {
            return Err(anyhow::anyhow!("At least one day of week is required"));
        }
        if request.days_of_week.iter().any(|d| *d > 6) {
            return Err(anyhow::anyhow!(
                "Invalid day of week. Must be 0-6 (Sunday-Saturday)"
            ));
        }
        if request.start_date > request.end_date {
            return Err(anyhow::anyhow!("Start date must not be after end date"));
        }
        if (request.end_date - request.start_date).num_days() > MAX_BATCH_RANGE_DAYS {
            return Err(anyhow::anyhow!(
                "Date range too large. Maximum is {} days",
                MAX_BATCH_RANGE_DAYS
            ));
        }

        let now = Utc::now();
        let mut expenses = Vec::new();
        let mut date = request.start_date;
        while date <= request.end_date {
            let weekday = date.weekday().num_days_from_sunday() as u8;
            if request.days_of_week.contains(&weekday) {
                expenses.push(Expense {
                    id: uuid::Uuid::new_v4().to_string(),
                    user_id: user_id.to_string(),
                    amount: request.amount,
                    category: request.category.clone(),
                    description: request.description.clone(),
                    expense_date: date,
                    created_at: now,
                    updated_at: now,
                });
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        self.expense_repository.create_batch(&expenses).await?;

        info!(
            "Bulk inserted {} expenses for user {}",
            expenses.len(),
            user_id
        );
        Ok(expenses)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        request: UpdateExpenseRequest,
    ) -> Result<Expense> {
        info!("Updating expense {} for user {}: {:?}", id, user_id, request);

        let mut expense = self
            .expense_repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Expense not found: {}", id))?;

        if let Some(amount) = request.amount {
            Self::validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(category) = request.category {
            expense.category = category;
        }
        if let Some(description) = request.description {
            expense.description = description;
        }
        if let Some(expense_date) = request.expense_date {
            expense.expense_date = expense_date;
        }
        Self::validate_text(&expense.category, &expense.description)?;

        expense.updated_at = Utc::now();
        self.expense_repository.update(&expense).await?;

        Ok(expense)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        info!("Deleting expense {} for user {}", id, user_id);

        if !self.expense_repository.delete(user_id, id).await? {
            return Err(anyhow::anyhow!("Expense not found: {}", id));
        }
        Ok(())
    }

    pub async fn list_month(&self, user_id: &str, month: Month) -> Result<Vec<Expense>> {
        Ok(self.expense_repository.list_by_month(user_id, month).await?)
    }

    pub async fn list_date(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Expense>> {
        Ok(self.expense_repository.list_by_date(user_id, date).await?)
    }

    fn validate_amount(amount: i64) -> Result<()> {
        if amount == 0 {
            return Err(anyhow::anyhow!("Amount cannot be zero"));
        }
        Ok(())
    }

    fn validate_text(category: &str, description: &str) -> Result<()> {
        if category.trim().is_empty() {
            return Err(anyhow::anyhow!("Category cannot be empty"));
        }
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(anyhow::anyhow!(
                "Description cannot exceed {} characters",
                MAX_DESCRIPTION_LENGTH
            ));
        }
        Ok(())
    }
}
