//! Kakeibo backend: a personal budgeting service.
//!
//! Users record income and expenses, set a monthly income and fixed
//! recurring costs, define a savings goal, and read a derived
//! daily/weekly/monthly spendable budget, with an optional external-calendar
//! overlay on the budget calendar.

use std::sync::Arc;

use crate::domain::{
    BudgetService, CalendarProvider, CalendarSyncService, CarryoverService, ExpenseService,
    FixedExpenseService, GoalService, SettingsService,
};
use crate::storage::SqliteConnection;

pub mod domain;
pub mod io;
pub mod storage;

/// Application state shared across request handlers. All services are cheap
/// to clone; the SQLite pool behind them is shared.
#[derive(Clone)]
pub struct AppState {
    pub settings_service: SettingsService,
    pub expense_service: ExpenseService,
    pub fixed_expense_service: FixedExpenseService,
    pub goal_service: GoalService,
    pub budget_service: BudgetService,
    pub calendar_sync_service: CalendarSyncService,
}

impl AppState {
    /// Wire every service onto one injected connection and calendar
    /// provider.
    pub fn new(conn: SqliteConnection, provider: Arc<dyn CalendarProvider>) -> Self {
        let settings_service = SettingsService::new(conn.clone());
        let goal_service = GoalService::new(conn.clone(), settings_service.clone());
        let carryover_service = CarryoverService::new(conn.clone());
        let budget_service = BudgetService::new(
            conn.clone(),
            settings_service.clone(),
            goal_service.clone(),
            carryover_service,
        );

        Self {
            settings_service,
            expense_service: ExpenseService::new(conn.clone()),
            fixed_expense_service: FixedExpenseService::new(conn.clone()),
            goal_service,
            budget_service,
            calendar_sync_service: CalendarSyncService::new(conn, provider),
        }
    }
}
