use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Category label conventionally paired with income entries.
///
/// Display-only convention: the sign of `Expense::amount` is the sole
/// income/expense discriminator, never this label.
pub const INCOME_CATEGORY: &str = "収入";

/// Per-user budget configuration. One row per user, created lazily on first
/// access and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: String,
    /// Monthly income in integer currency units (non-negative)
    pub monthly_income: i64,
    /// Whether the setup wizard has been completed
    pub setup_completed: bool,
    /// The savings goal currently governing budget math, if any
    pub active_goal_id: Option<String>,
    /// Doubles as the user's ledger start date when no earlier entries exist
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A recurring monthly cost applied identically to every month.
///
/// No start/end date and no prorating: `created_at` is bookkeeping only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpense {
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// Amount in integer currency units (positive)
    pub amount: i64,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// A savings goal with a target amount and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    /// Target amount in integer currency units (positive)
    pub target_amount: i64,
    pub target_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    /// The fixed monthly installment toward this goal, set at creation time.
    ///
    /// `ceil(target_amount / max(1, ceil(days_to_target / 30)))`, a constant
    /// installment that does not shrink as the goal is partially funded.
    pub fn monthly_installment(&self) -> i64 {
        let days = (self.target_date - self.created_at.date_naive()).num_days();
        let months = (days + 29).div_euclid(30).max(1);
        (self.target_amount + months - 1).div_euclid(months)
    }
}

/// A ledger entry.
///
/// Sign convention: positive = money spent, negative = money received. The
/// sign is the discriminator; `category` is free-form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub user_id: String,
    /// Amount in integer currency units (positive = spent, negative = received)
    pub amount: i64,
    pub category: String,
    pub description: String,
    /// Calendar date of the entry, no time component
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Whether this entry records money received rather than spent.
    pub fn is_income(&self) -> bool {
        self.amount < 0
    }
}

/// The previous month's leftover budget, persisted per `(user, year, month)`
/// so the current month's figure does not require re-deriving history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCarryover {
    pub user_id: String,
    pub year: i32,
    pub month: u32,
    /// May be negative (prior-month overspend)
    pub carryover_amount: i64,
    pub computed_at: DateTime<Utc>,
}

/// Persisted token state for the external calendar provider. One row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConnection {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token material returned by the calendar provider's authorization exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until `access_token` expires
    pub expires_in: i64,
}

/// A calendar month key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month a given date falls in.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> i64 {
        (self.last_day() - self.first_day()).num_days() + 1
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Inclusive month range, oldest first. Empty when `from > to`.
    pub fn range(from: Month, to: Month) -> Vec<Month> {
        let mut months = Vec::new();
        let mut m = from;
        while m <= to {
            months.push(m);
            m = m.next();
        }
        months
    }
}

/// How a displayed month relates to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthClass {
    Past,
    Current,
    Future,
}

/// Advisory classification of the remaining budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetHealth {
    Healthy,
    RunningLow,
    OverBudget,
}

/// The derived budget for one month, as produced by the budget engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetView {
    pub month: Month,
    pub class: MonthClass,
    /// Fixed monthly installment toward the active goal (0 without one)
    pub monthly_needed_for_goal: i64,
    /// `monthly_income − total_fixed_expenses − monthly_needed_for_goal`
    pub base_monthly_budget: i64,
    /// Sign-aware sum of ledger entries dated within the month
    pub total_month_expenses: i64,
    /// `base_monthly_budget − total_month_expenses`, before carry-over
    pub displayed_remaining: i64,
    /// Carry-over applied to this month (0 for future months)
    pub carryover: i64,
    /// The headline figure; negative is a valid, displayed state
    pub remaining_budget: i64,
    pub remaining_days: i64,
    /// Floor-divided per-day allowance, clamped to zero
    pub daily_budget: i64,
    /// Floor-divided per-week allowance, clamped to zero
    pub weekly_budget: i64,
    /// `monthly_needed_for_goal + remaining_budget`
    pub actual_monthly_savings: i64,
    pub health: BudgetHealth,
}

/// Spending detail for a single date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Sign-aware sum of entries on this date
    pub day_total: i64,
    /// `−day_total`: positive means net income that day
    pub day_net: i64,
    /// `max(0, daily_budget − day_total)`
    pub daily_remaining: i64,
    pub entries: Vec<Expense>,
}

/// One category's share of a month's spending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: i64,
    /// Percentage of the grouped total (0 when the total is 0)
    pub percentage: f64,
}

/// An event from the external calendar provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
}

impl CalendarEvent {
    /// All-day events carry a date but no time-of-day on their start.
    pub fn is_all_day(&self) -> bool {
        self.start.date_time.is_none()
    }
}

/// Start or end marker of a provider event: either a timestamp or a bare date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EventTime {
    /// The calendar date this marker falls on, if it carries one at all.
    pub fn as_date(&self) -> Option<NaiveDate> {
        self.date.or_else(|| self.date_time.map(|dt| dt.date_naive()))
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Partial update for user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSettingsRequest {
    pub monthly_income: Option<i64>,
    pub setup_completed: Option<bool>,
    /// `Some(None)` clears the active goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_goal_id: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseRequest {
    /// Positive = spent, negative = received
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub expense_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

/// Bulk insert: one entry per date in `[start_date, end_date]` whose weekday
/// is in `days_of_week` (0 = Sunday … 6 = Saturday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateExpenseBatchRequest {
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub days_of_week: Vec<u8>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseListResponse {
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseBatchResponse {
    pub created: Vec<Expense>,
    pub created_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFixedExpenseRequest {
    pub name: String,
    pub amount: i64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFixedExpenseRequest {
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedExpenseListResponse {
    pub fixed_expenses: Vec<FixedExpense>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    pub description: String,
    pub target_amount: i64,
    pub target_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target_amount: Option<i64>,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalListResponse {
    pub goals: Vec<SavingsGoal>,
    pub active_goal_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRangeResponse {
    pub months: Vec<BudgetView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdownResponse {
    pub categories: Vec<CategoryBreakdown>,
    pub total: i64,
}

/// Handshake start: the URL the user opens to authorize the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConnectResponse {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarCallbackRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarStatusResponse {
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEventsResponse {
    pub events: Vec<CalendarEvent>,
}

/// Uniform failure body for every API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
