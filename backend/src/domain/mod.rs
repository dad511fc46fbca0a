//! Domain layer: the budget derivation engine and the services around it.
//!
//! Services own their repositories and expose request/response style
//! operations; the engine itself ([`budget`]) is a pure function with no
//! storage access and no failure mode.

pub mod budget;
pub mod budget_service;
pub mod calendar;
pub mod calendar_provider;
pub mod calendar_sync_service;
pub mod carryover_service;
pub mod expense_service;
pub mod fixed_expense_service;
pub mod goal_service;
pub mod settings_service;

pub use budget_service::BudgetService;
pub use calendar_provider::{CalendarProvider, UnconfiguredProvider};
pub use calendar_sync_service::CalendarSyncService;
pub use carryover_service::CarryoverService;
pub use expense_service::ExpenseService;
pub use fixed_expense_service::FixedExpenseService;
pub use goal_service::GoalService;
pub use settings_service::SettingsService;
