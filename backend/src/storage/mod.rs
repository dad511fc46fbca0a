//! Storage layer: SQLite connection management and one repository per
//! entity. Repositories carry no business logic; every query is scoped by
//! `user_id` and failures surface as [`error::StoreError`].

pub mod db;
pub mod error;
pub mod repositories;

pub use db::SqliteConnection;
pub use error::{StoreError, StoreResult};
pub use repositories::{
    CalendarConnectionRepository, CarryoverRepository, ExpenseRepository,
    FixedExpenseRepository, GoalRepository, SettingsRepository,
};
