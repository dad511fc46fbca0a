//! Budget derivation engine.
//!
//! A pure computation over an immutable snapshot of a user's entities: given
//! the monthly income, fixed costs, the active savings goal, the month's
//! ledger entries and the carry-over rolled in from the previous month, it
//! produces the headline remaining budget, per-day and per-week allowances,
//! per-day detail and category aggregates. Both the dashboard and the
//! analytics views go through this one function.
//!
//! Numeric conventions: integer currency units throughout; ceiling when
//! rounding the goal installment, floor when splitting the remaining budget
//! into allowances, so the engine never promises more than is available.
//! There is no failure mode here: inputs are validated upstream and every
//! division is guarded.

use chrono::NaiveDate;
use shared::{
    BudgetHealth, BudgetView, CategoryBreakdown, DaySummary, Expense, FixedExpense, Month,
    MonthClass, SavingsGoal, UserSettings,
};

/// Fraction of the base budget under which the advisory flips to
/// `RunningLow`. Compared exactly, without rounding.
const LOW_BUDGET_RATIO: f64 = 0.2;

/// Snapshot of everything a single-month derivation needs.
#[derive(Debug, Clone, Copy)]
pub struct BudgetInputs<'a> {
    pub month: Month,
    pub settings: &'a UserSettings,
    pub fixed_expenses: &'a [FixedExpense],
    pub active_goal: Option<&'a SavingsGoal>,
    pub month_expenses: &'a [Expense],
    /// Carry-over for this month; ignored when the month is in the future
    pub carryover: i64,
    /// Earliest of settings creation, first ledger entry, first fixed cost
    pub ledger_start: NaiveDate,
    pub today: NaiveDate,
}

/// Classify a month against today's date.
pub fn classify_month(month: Month, today: NaiveDate) -> MonthClass {
    let current = Month::of(today);
    if month < current {
        MonthClass::Past
    } else if month > current {
        MonthClass::Future
    } else {
        MonthClass::Current
    }
}

/// Days left to budget over: whole days from today to the end of the month
/// for the current month, the month's full length otherwise.
pub fn remaining_days(month: Month, class: MonthClass, today: NaiveDate) -> i64 {
    match class {
        MonthClass::Current => (month.last_day() - today).num_days().max(0),
        MonthClass::Past | MonthClass::Future => month.days_in_month(),
    }
}

/// Sign-aware sum of ledger entries: income entries carry negative amounts
/// and reduce the total.
pub fn total_expenses(expenses: &[Expense]) -> i64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Derive the budget view for one month.
pub fn derive_budget(inputs: &BudgetInputs<'_>) -> BudgetView {
    let monthly_needed_for_goal = inputs
        .active_goal
        .map(SavingsGoal::monthly_installment)
        .unwrap_or(0);

    let total_fixed: i64 = inputs.fixed_expenses.iter().map(|f| f.amount).sum();
    let base_monthly_budget =
        inputs.settings.monthly_income - total_fixed - monthly_needed_for_goal;

    let total_month_expenses = total_expenses(inputs.month_expenses);
    let displayed_remaining = base_monthly_budget - total_month_expenses;

    let class = classify_month(inputs.month, inputs.today);

    // A future month cannot yet know the leftover chain; carry-over only
    // applies once the month has started.
    let carryover = match class {
        MonthClass::Future => 0,
        MonthClass::Past | MonthClass::Current => inputs.carryover,
    };

    let before_ledger_start = inputs.month < Month::of(inputs.ledger_start);
    let remaining_budget = if before_ledger_start {
        0
    } else {
        displayed_remaining + carryover
    };

    let days = remaining_days(inputs.month, class, inputs.today);
    let (daily_budget, weekly_budget) = if before_ledger_start {
        (0, 0)
    } else {
        let weeks = (days + 6).div_euclid(7);
        (
            remaining_budget.div_euclid(days.max(1)).max(0),
            remaining_budget.div_euclid(weeks.max(1)).max(0),
        )
    };

    let health = if remaining_budget < 0 {
        BudgetHealth::OverBudget
    } else if (remaining_budget as f64) < (base_monthly_budget as f64) * LOW_BUDGET_RATIO {
        BudgetHealth::RunningLow
    } else {
        BudgetHealth::Healthy
    };

    BudgetView {
        month: inputs.month,
        class,
        monthly_needed_for_goal,
        base_monthly_budget,
        total_month_expenses,
        displayed_remaining,
        carryover,
        remaining_budget,
        remaining_days: days,
        daily_budget,
        weekly_budget,
        actual_monthly_savings: monthly_needed_for_goal + remaining_budget,
        health,
    }
}

/// Spending detail for one date within a month's entry set.
pub fn day_summary(date: NaiveDate, expenses: &[Expense], daily_budget: i64) -> DaySummary {
    let entries: Vec<Expense> = expenses
        .iter()
        .filter(|e| e.expense_date == date)
        .cloned()
        .collect();
    let day_total = total_expenses(&entries);

    DaySummary {
        date,
        day_total,
        // Flipped so a positive number reads as net income that day
        day_net: -day_total,
        daily_remaining: (daily_budget - day_total).max(0),
        entries,
    }
}

/// Group expense-sign entries by category with each category's share of the
/// grouped total, sorted descending by amount. Income-sign entries are
/// excluded from the grouping.
pub fn aggregate_categories(expenses: &[Expense]) -> Vec<CategoryBreakdown> {
    let mut totals: Vec<(String, i64)> = Vec::new();
    for expense in expenses.iter().filter(|e| e.amount > 0) {
        match totals.iter_mut().find(|(c, _)| c == &expense.category) {
            Some((_, total)) => *total += expense.amount,
            None => totals.push((expense.category.clone(), expense.amount)),
        }
    }

    let grand_total: i64 = totals.iter().map(|(_, t)| t).sum();

    let mut breakdown: Vec<CategoryBreakdown> = totals
        .into_iter()
        .map(|(category, total)| CategoryBreakdown {
            category,
            total,
            percentage: if grand_total > 0 {
                total as f64 / grand_total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    breakdown.sort_by(|a, b| b.total.cmp(&a.total));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        date(y, m, d).and_hms_opt(0, 0, 0).unwrap().and_utc()
    }

    fn settings(monthly_income: i64) -> UserSettings {
        UserSettings {
            user_id: "user-1".to_string(),
            monthly_income,
            setup_completed: true,
            active_goal_id: None,
            created_at: ts(2024, 1, 1),
            updated_at: ts(2024, 1, 1),
        }
    }

    fn fixed(amount: i64) -> FixedExpense {
        FixedExpense {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            name: "rent".to_string(),
            amount,
            category: "住居費".to_string(),
            created_at: ts(2024, 1, 1),
        }
    }

    // Installment works out to exactly 20_000 per month.
    fn goal_needing_20000() -> SavingsGoal {
        SavingsGoal {
            id: "goal-1".to_string(),
            user_id: "user-1".to_string(),
            title: "Trip".to_string(),
            description: String::new(),
            target_amount: 120_000,
            target_date: date(2025, 7, 1),
            created_at: ts(2025, 1, 2),
        }
    }

    fn entry(amount: i64, category: &str, day: NaiveDate) -> Expense {
        Expense {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "user-1".to_string(),
            amount,
            category: category.to_string(),
            description: String::new(),
            expense_date: day,
            created_at: ts(2024, 1, 1),
            updated_at: ts(2024, 1, 1),
        }
    }

    fn inputs<'a>(
        month: Month,
        settings: &'a UserSettings,
        fixed_expenses: &'a [FixedExpense],
        active_goal: Option<&'a SavingsGoal>,
        month_expenses: &'a [Expense],
        carryover: i64,
        today: NaiveDate,
    ) -> BudgetInputs<'a> {
        BudgetInputs {
            month,
            settings,
            fixed_expenses,
            active_goal,
            month_expenses,
            carryover,
            ledger_start: date(2024, 1, 1),
            today,
        }
    }

    #[test]
    fn test_zero_entry_baseline() {
        let settings = settings(300_000);
        let fixed_expenses = [fixed(100_000)];
        let goal = goal_needing_20000();
        let view = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &fixed_expenses,
            Some(&goal),
            &[],
            0,
            date(2025, 6, 1),
        ));

        // Scenario A: 300_000 − 100_000 − 20_000
        assert_eq!(view.monthly_needed_for_goal, 20_000);
        assert_eq!(view.base_monthly_budget, 180_000);
        assert_eq!(view.remaining_budget, 180_000);
        assert_eq!(view.actual_monthly_savings, 200_000);
        assert_eq!(view.health, BudgetHealth::Healthy);
    }

    #[test]
    fn test_logged_expenses_reduce_remaining() {
        let settings = settings(300_000);
        let fixed_expenses = [fixed(100_000)];
        let goal = goal_needing_20000();
        let expenses = [
            entry(30_000, "食費", date(2025, 6, 5)),
            entry(20_000, "交際費", date(2025, 6, 20)),
        ];
        // Scenario B: viewed as a past month with 30 days
        let view = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &fixed_expenses,
            Some(&goal),
            &expenses,
            0,
            date(2025, 7, 15),
        ));

        assert_eq!(view.class, MonthClass::Past);
        assert_eq!(view.total_month_expenses, 50_000);
        assert_eq!(view.remaining_budget, 130_000);
        assert_eq!(view.remaining_days, 30);
        assert_eq!(view.daily_budget, 130_000 / 30); // 4_333
        assert_eq!(view.daily_budget, 4_333);
    }

    #[test]
    fn test_income_entries_offset_spending() {
        let settings = settings(300_000);
        let expenses = [
            entry(50_000, "食費", date(2025, 6, 5)),
            entry(-30_000, shared::INCOME_CATEGORY, date(2025, 6, 10)),
        ];
        let view = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &[],
            None,
            &expenses,
            0,
            date(2025, 6, 1),
        ));

        assert_eq!(view.total_month_expenses, 20_000);
        assert_eq!(view.remaining_budget, 280_000);
    }

    #[test]
    fn test_carryover_applied_to_current_month_only() {
        let settings = settings(300_000);
        let fixed_expenses = [fixed(100_000)];
        let goal = goal_needing_20000();

        // Scenario C, current month: displayed 180_000, carry-over −10_000
        let current = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &fixed_expenses,
            Some(&goal),
            &[],
            -10_000,
            date(2025, 6, 15),
        ));
        assert_eq!(current.class, MonthClass::Current);
        assert_eq!(current.displayed_remaining, 180_000);
        assert_eq!(current.remaining_budget, 170_000);

        // Same displayed figure viewed as a future month: carry-over ignored
        let future = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &fixed_expenses,
            Some(&goal),
            &[],
            -10_000,
            date(2025, 5, 15),
        ));
        assert_eq!(future.class, MonthClass::Future);
        assert_eq!(future.carryover, 0);
        assert_eq!(future.remaining_budget, 180_000);
    }

    #[test]
    fn test_future_month_ignores_any_carryover_value() {
        let settings = settings(250_000);
        let today = date(2025, 3, 10);
        let month = Month::new(2025, 8);

        let a = derive_budget(&inputs(month, &settings, &[], None, &[], 0, today));
        let b = derive_budget(&inputs(month, &settings, &[], None, &[], 999_999, today));
        let c = derive_budget(&inputs(month, &settings, &[], None, &[], -999_999, today));

        assert_eq!(a.remaining_budget, b.remaining_budget);
        assert_eq!(a.remaining_budget, c.remaining_budget);
    }

    #[test]
    fn test_carryover_applied_to_past_month() {
        let settings = settings(300_000);
        let view = derive_budget(&inputs(
            Month::new(2025, 4),
            &settings,
            &[],
            None,
            &[],
            25_000,
            date(2025, 6, 15),
        ));
        assert_eq!(view.class, MonthClass::Past);
        assert_eq!(view.remaining_budget, 325_000);
    }

    #[test]
    fn test_month_before_ledger_start_is_all_zero() {
        let settings = settings(300_000);
        let fixed_expenses = [fixed(50_000)];
        let mut input = inputs(
            Month::new(2023, 11),
            &settings,
            &fixed_expenses,
            None,
            &[],
            77_000,
            date(2025, 6, 15),
        );
        input.ledger_start = date(2024, 1, 1);

        let view = derive_budget(&input);
        assert_eq!(view.remaining_budget, 0);
        assert_eq!(view.daily_budget, 0);
        assert_eq!(view.weekly_budget, 0);
    }

    #[test]
    fn test_allowances_never_negative() {
        let settings = settings(100_000);
        let fixed_expenses = [fixed(150_000)];
        let view = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &fixed_expenses,
            None,
            &[],
            0,
            date(2025, 6, 10),
        ));

        assert!(view.remaining_budget < 0);
        assert_eq!(view.daily_budget, 0);
        assert_eq!(view.weekly_budget, 0);
        assert_eq!(view.health, BudgetHealth::OverBudget);
    }

    #[test]
    fn test_remaining_days_current_month() {
        let month = Month::new(2025, 6);
        let class = classify_month(month, date(2025, 6, 10));
        assert_eq!(class, MonthClass::Current);
        // 20 whole days between June 10 and June 30
        assert_eq!(remaining_days(month, class, date(2025, 6, 10)), 20);
        // Last day of the month leaves zero; the division guard covers it
        assert_eq!(remaining_days(month, class, date(2025, 6, 30)), 0);
    }

    #[test]
    fn test_last_day_of_month_division_guard() {
        let settings = settings(300_000);
        let view = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &[],
            None,
            &[],
            0,
            date(2025, 6, 30),
        ));
        assert_eq!(view.remaining_days, 0);
        // Guarded as a one-day, one-week month
        assert_eq!(view.daily_budget, 300_000);
        assert_eq!(view.weekly_budget, 300_000);
    }

    #[test]
    fn test_weekly_budget_uses_ceiled_weeks() {
        let settings = settings(310_000);
        // Past 31-day month: ceil(31 / 7) = 5 weeks
        let view = derive_budget(&inputs(
            Month::new(2025, 5),
            &settings,
            &[],
            None,
            &[],
            0,
            date(2025, 6, 15),
        ));
        assert_eq!(view.remaining_days, 31);
        assert_eq!(view.weekly_budget, 310_000 / 5);
        assert_eq!(view.daily_budget, 10_000);
    }

    #[test]
    fn test_running_low_threshold_is_fractional() {
        let settings = settings(100_000);
        let expenses = [entry(80_001, "食費", date(2025, 6, 2))];
        // remaining 19_999 < 100_000 * 0.2
        let low = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &[],
            None,
            &expenses,
            0,
            date(2025, 6, 5),
        ));
        assert_eq!(low.health, BudgetHealth::RunningLow);

        // remaining exactly 20_000 is not below the threshold
        let fine_expenses = [entry(80_000, "食費", date(2025, 6, 2))];
        let fine = derive_budget(&inputs(
            Month::new(2025, 6),
            &settings,
            &[],
            None,
            &fine_expenses,
            0,
            date(2025, 6, 5),
        ));
        assert_eq!(fine.health, BudgetHealth::Healthy);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let settings = settings(275_000);
        let fixed_expenses = [fixed(80_000), fixed(12_000)];
        let goal = goal_needing_20000();
        let expenses = [
            entry(4_200, "食費", date(2025, 6, 3)),
            entry(-15_000, shared::INCOME_CATEGORY, date(2025, 6, 8)),
        ];
        let input = inputs(
            Month::new(2025, 6),
            &settings,
            &fixed_expenses,
            Some(&goal),
            &expenses,
            -3_000,
            date(2025, 6, 12),
        );

        assert_eq!(derive_budget(&input), derive_budget(&input));
    }

    #[test]
    fn test_day_summary_sign_flip() {
        let day = date(2025, 6, 10);
        let expenses = [
            entry(1_500, "食費", day),
            entry(-5_000, shared::INCOME_CATEGORY, day),
            entry(9_999, "食費", date(2025, 6, 11)),
        ];

        let summary = day_summary(day, &expenses, 4_000);
        assert_eq!(summary.entries.len(), 2);
        assert_eq!(summary.day_total, -3_500);
        assert_eq!(summary.day_net, 3_500);
        // Net income day leaves the full daily budget available
        assert_eq!(summary.daily_remaining, 7_500);
    }

    #[test]
    fn test_day_summary_overspent_day_clamps_remaining() {
        let day = date(2025, 6, 10);
        let expenses = [entry(6_000, "食費", day)];

        let summary = day_summary(day, &expenses, 4_000);
        assert_eq!(summary.day_total, 6_000);
        assert_eq!(summary.day_net, -6_000);
        assert_eq!(summary.daily_remaining, 0);
    }

    #[test]
    fn test_category_aggregation_percentages() {
        let expenses = [
            entry(6_000, "食費", date(2025, 6, 1)),
            entry(3_000, "交通費", date(2025, 6, 2)),
            entry(1_000, "娯楽", date(2025, 6, 3)),
            entry(-20_000, shared::INCOME_CATEGORY, date(2025, 6, 4)),
        ];

        let categories = aggregate_categories(&expenses);
        assert_eq!(categories.len(), 3);
        assert_eq!(categories[0].category, "食費");
        assert_eq!(categories[0].total, 6_000);
        assert!((categories[0].percentage - 60.0).abs() < 1e-9);

        let sum: f64 = categories.iter().map(|c| c.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_aggregation_empty_total() {
        // Only income-sign entries: nothing to group, no percentages
        let expenses = [entry(-5_000, shared::INCOME_CATEGORY, date(2025, 6, 4))];
        let categories = aggregate_categories(&expenses);
        assert!(categories.is_empty());

        assert!(aggregate_categories(&[]).is_empty());
    }

    #[test]
    fn test_category_aggregation_stable_descending() {
        let expenses = [
            entry(2_000, "b", date(2025, 6, 1)),
            entry(5_000, "a", date(2025, 6, 1)),
            entry(2_000, "c", date(2025, 6, 1)),
        ];
        let categories = aggregate_categories(&expenses);
        let names: Vec<&str> = categories.iter().map(|c| c.category.as_str()).collect();
        // Ties keep first-seen order
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
