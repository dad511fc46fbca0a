//! Month rollover: the surplus or deficit carried from one month into the
//! next.
//!
//! The calculator is a single-hop lookback: `carryover(M)` is derived from
//! month `M−1`'s ledger alone, on the assumption that `M−1`'s own carry-over
//! was already folded into its persisted row. It never recurses through
//! history, so a missing or wrong intermediate row drifts silently; that
//! limitation is preserved on purpose. Results are upserted per
//! `(user, year, month)` so repeated reads do not redrive the lookback.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use shared::{FixedExpense, Month, MonthlyCarryover, SavingsGoal, UserSettings};
use tracing::{debug, info};

use crate::domain::budget::total_expenses;
use crate::storage::{CarryoverRepository, ExpenseRepository, SqliteConnection};

#[derive(Clone)]
pub struct CarryoverService {
    carryover_repository: CarryoverRepository,
    expense_repository: ExpenseRepository,
}

impl CarryoverService {
    pub fn new(conn: SqliteConnection) -> Self {
        Self {
            carryover_repository: CarryoverRepository::new(conn.clone()),
            expense_repository: ExpenseRepository::new(conn),
        }
    }

    /// Carry-over for `month`, reading the persisted row when present and
    /// computing + upserting it otherwise.
    pub async fn get_or_compute(
        &self,
        user_id: &str,
        month: Month,
        settings: &UserSettings,
        fixed_expenses: &[FixedExpense],
        active_goal: Option<&SavingsGoal>,
        ledger_start: NaiveDate,
    ) -> Result<i64> {
        let previous = month.prev();

        // There is no month before the user existed
        if previous < Month::of(ledger_start) {
            debug!(
                "Carry-over for {}-{:02}: previous month precedes ledger start, using 0",
                month.year, month.month
            );
            return Ok(0);
        }

        if let Some(stored) = self.carryover_repository.get(user_id, month).await? {
            debug!(
                "Carry-over for {}-{:02}: stored row {}",
                month.year, month.month, stored.carryover_amount
            );
            return Ok(stored.carryover_amount);
        }

        let previous_expenses = self
            .expense_repository
            .list_by_month(user_id, previous)
            .await?;

        let monthly_needed = active_goal.map(SavingsGoal::monthly_installment).unwrap_or(0);
        let total_fixed: i64 = fixed_expenses.iter().map(|f| f.amount).sum();
        let amount = settings.monthly_income
            - total_fixed
            - monthly_needed
            - total_expenses(&previous_expenses);

        self.carryover_repository
            .upsert(&MonthlyCarryover {
                user_id: user_id.to_string(),
                year: month.year,
                month: month.month,
                carryover_amount: amount,
                computed_at: Utc::now(),
            })
            .await?;

        info!(
            "Computed carry-over for user {} into {}-{:02}: {}",
            user_id, month.year, month.month, amount
        );
        Ok(amount)
    }
}
