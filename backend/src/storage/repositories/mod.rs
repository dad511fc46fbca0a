pub mod calendar_connection_repository;
pub mod carryover_repository;
pub mod expense_repository;
pub mod fixed_expense_repository;
pub mod goal_repository;
pub mod settings_repository;

pub use calendar_connection_repository::CalendarConnectionRepository;
pub use carryover_repository::CarryoverRepository;
pub use expense_repository::ExpenseRepository;
pub use fixed_expense_repository::FixedExpenseRepository;
pub use goal_repository::GoalRepository;
pub use settings_repository::SettingsRepository;
