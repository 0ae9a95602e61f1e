use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::core::config::Config;
use crate::core::finance::Money;
use crate::core::model::{Expense, Priority};

/// Signed days between today and a due date. Zero or less means the
/// expense is already due.
#[must_use]
pub fn days_until_due(due_date: NaiveDate, today: NaiveDate) -> i64 {
    (due_date - today).num_days()
}

fn priority_points(priority: Priority) -> Decimal {
    match priority {
        Priority::High => dec!(100),
        Priority::Medium => dec!(50),
        Priority::Low => dec!(10),
    }
}

fn due_points(days: i64, config: &Config) -> Decimal {
    if days <= 0 {
        dec!(100)
    } else if days <= config.critical_days {
        dec!(80)
    } else if days <= config.urgent_days {
        dec!(60)
    } else if days <= config.moderate_days {
        dec!(30)
    } else {
        dec!(10)
    }
}

/// Fixed table of category points. Accepts both the Spanish tags the
/// original records use and the English equivalents; anything else
/// lands on the floor value.
fn category_points(category: Option<&str>) -> Decimal {
    let Some(tag) = category else {
        return dec!(5);
    };
    match tag.trim().to_lowercase().as_str() {
        "hipoteca" | "mortgage" | "alquiler" | "rent" => dec!(25),
        "servicios" | "utilities" | "salud" | "health" => dec!(20),
        "alimentacion" | "food" => dec!(15),
        "deuda" | "debt" => dec!(15),
        "transporte" | "transport" | "educacion" | "education" => dec!(10),
        _ => dec!(5),
    }
}

// The 100 divisor is a tunable carried over from the original formula,
// not a structural constant.
fn amount_points(amount: Money) -> Decimal {
    (dec!(20) - amount.value() / dec!(100)).max(Decimal::ZERO)
}

/// Composite priority score of an expense; an integer used only for
/// ranking.
///
/// Large amounts lower the score of non-high expenses so that cheap
/// obligations are knocked out first, while high-priority expenses
/// never get discounted for being big.
#[must_use]
pub fn priority_score(expense: &Expense, today: NaiveDate, config: &Config) -> i64 {
    let days = days_until_due(expense.due_date, today);
    let mut score = priority_points(expense.priority) * config.priority_weight
        + due_points(days, config) * config.due_weight
        + category_points(expense.category.as_deref()) * config.category_weight;
    if expense.priority != Priority::High {
        score += amount_points(expense.amount) * config.amount_weight;
    }
    score
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}
