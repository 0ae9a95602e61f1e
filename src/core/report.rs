use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::allocate::{ExpenseOutcome, Ledger};
use crate::core::finance::{Money, Percentage};
use crate::core::model::{Allocation, ExpenseStatus, Priority};
use crate::core::validate::ValidationWarning;

/// How many of the soonest uncovered deadlines the report surfaces.
const UPCOMING_LIMIT: usize = 5;
/// Deadlines within this many days count as upcoming.
const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub generated_at: NaiveDate,
    pub total_income: Money,
    pub total_expense: Money,
    pub covered: usize,
    pub partially_covered: usize,
    pub pending: usize,
    pub percent_covered: Percentage,
    pub surplus: Money,
    pub deficit: Money,
    /// 0..=100 blend of coverage, priority fulfilment and surplus
    /// minimization.
    pub efficiency: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorityGroup {
    pub count: usize,
    pub covered: usize,
    pub amount: Money,
    pub expenses: Vec<ExpenseOutcome>,
}

impl PriorityGroup {
    fn push(&mut self, expense: ExpenseOutcome) {
        self.count += 1;
        self.amount += expense.amount;
        if expense.status == ExpenseStatus::Covered {
            self.covered += 1;
        }
        self.expenses.push(expense);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub high: PriorityGroup,
    pub medium: PriorityGroup,
    pub low: PriorityGroup,
}

impl PriorityBreakdown {
    #[must_use]
    pub fn group(&self, priority: Priority) -> &PriorityGroup {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Deficit,
    Overdue,
    Surplus,
}

/// Advisory, ordered, non-exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub severity: Priority,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expenses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingDeadline {
    pub expense_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
    pub remaining: Money,
    pub status: ExpenseStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub by_priority: PriorityBreakdown,
    pub recommendations: Vec<Recommendation>,
    pub upcoming: Vec<UpcomingDeadline>,
    pub allocations: Vec<Allocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
}

fn summarize(ledger: &Ledger, today: NaiveDate) -> Summary {
    let total_income: Money = ledger.incomes.iter().map(|i| i.amount).sum();
    let total_expense: Money = ledger.expenses.iter().map(|e| e.amount).sum();
    let surplus: Money = ledger.incomes.iter().map(|i| i.remaining).sum();
    let deficit: Money = ledger.expenses.iter().map(|e| e.remaining).sum();

    let count_of = |status: ExpenseStatus| {
        ledger
            .expenses
            .iter()
            .filter(|e| e.status == status)
            .count()
    };

    let percent_covered = if total_expense.is_positive() {
        Percentage::of((total_expense - deficit).value(), total_expense.value())
    } else {
        Percentage::ONE_HUNDRED
    };

    Summary {
        generated_at: today,
        total_income,
        total_expense,
        covered: count_of(ExpenseStatus::Covered),
        partially_covered: count_of(ExpenseStatus::PartiallyCovered),
        pending: count_of(ExpenseStatus::Pending),
        percent_covered,
        surplus,
        deficit,
        efficiency: efficiency(ledger, percent_covered, total_income, surplus),
    }
}

/// Coverage 50%, priority fulfilment 30%, surplus minimization 20%.
/// Each factor lives in 0..=1, so the blend needs no clamping.
fn efficiency(
    ledger: &Ledger,
    percent_covered: Percentage,
    total_income: Money,
    surplus: Money,
) -> i64 {
    let coverage = percent_covered.as_factor();

    let high: Vec<_> = ledger
        .expenses
        .iter()
        .filter(|e| e.priority == Priority::High)
        .collect();
    let priority = if high.is_empty() {
        Decimal::ONE
    } else {
        let covered = high
            .iter()
            .filter(|e| e.status == ExpenseStatus::Covered)
            .count();
        Decimal::from(covered) / Decimal::from(high.len())
    };

    let optimization = if total_income.is_positive() {
        (Decimal::ONE - surplus.value() / total_income.value()).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    ((coverage * dec!(0.5) + priority * dec!(0.3) + optimization * dec!(0.2)) * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

fn recommendations(ledger: &Ledger, summary: &Summary) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if summary.deficit.is_positive() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Deficit,
            severity: Priority::High,
            message: format!(
                "Projected deficit of {}. Consider trimming optional expenses or finding additional income.",
                summary.deficit
            ),
            actions: vec![
                "Review low-priority expenses".to_string(),
                "Look for extra income".to_string(),
                "Renegotiate payment deadlines".to_string(),
            ],
            expenses: Vec::new(),
        });
    }

    let overdue: Vec<String> = ledger
        .expenses
        .iter()
        .filter(|e| e.days_until_due < 0 && e.status != ExpenseStatus::Covered)
        .map(|e| e.id.clone())
        .collect();
    if !overdue.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Overdue,
            severity: Priority::High,
            message: format!(
                "{} overdue expense(s) need immediate attention.",
                overdue.len()
            ),
            actions: Vec::new(),
            expenses: overdue,
        });
    }

    if summary.surplus.value() > summary.total_income.value() * dec!(0.1) {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Surplus,
            severity: Priority::Medium,
            message: format!(
                "Surplus of {} left after allocation. Consider an emergency fund or investing.",
                summary.surplus
            ),
            actions: vec![
                "Build an emergency fund".to_string(),
                "Consider investing".to_string(),
                "Prepay upcoming expenses".to_string(),
            ],
            expenses: Vec::new(),
        });
    }

    recommendations
}

fn upcoming(ledger: &Ledger) -> Vec<UpcomingDeadline> {
    let mut upcoming: Vec<UpcomingDeadline> = ledger
        .expenses
        .iter()
        .filter(|e| e.days_until_due <= UPCOMING_WINDOW_DAYS && e.status != ExpenseStatus::Covered)
        .map(|e| UpcomingDeadline {
            expense_id: e.id.clone(),
            name: e.name.clone(),
            due_date: e.due_date,
            days_until_due: e.days_until_due,
            remaining: e.remaining,
            status: e.status,
        })
        .collect();
    upcoming.sort_by_key(|d| d.days_until_due);
    upcoming.truncate(UPCOMING_LIMIT);
    upcoming
}

/// Assembles the report from a finished allocation run.
#[must_use]
pub fn build(ledger: Ledger, warnings: Vec<ValidationWarning>, today: NaiveDate) -> Report {
    let summary = summarize(&ledger, today);
    let recommendations = recommendations(&ledger, &summary);
    let upcoming = upcoming(&ledger);

    let mut by_priority = PriorityBreakdown::default();
    let Ledger {
        expenses,
        allocations,
        ..
    } = ledger;
    for expense in expenses {
        match expense.priority {
            Priority::High => by_priority.high.push(expense),
            Priority::Medium => by_priority.medium.push(expense),
            Priority::Low => by_priority.low.push(expense),
        }
    }

    Report {
        summary,
        by_priority,
        recommendations,
        upcoming,
        allocations,
        warnings,
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = &self.summary;
        writeln!(f, "Allocation report {}", s.generated_at)?;
        writeln!(
            f,
            "├── 💸 Income:   {:<12} surplus {}",
            s.total_income.to_string(),
            s.surplus
        )?;
        writeln!(
            f,
            "├── 🧾 Expenses: {:<12} deficit {}",
            s.total_expense.to_string(),
            s.deficit
        )?;
        writeln!(
            f,
            "├── 📊 Coverage: {} ({} covered / {} partial / {} pending), efficiency {}",
            s.percent_covered, s.covered, s.partially_covered, s.pending, s.efficiency
        )?;
        writeln!(f, "├── By priority:")?;
        for (label, group) in [
            ("high", &self.by_priority.high),
            ("medium", &self.by_priority.medium),
            ("low", &self.by_priority.low),
        ] {
            writeln!(
                f,
                "│   ├── {label:<8} {}/{} covered - {}",
                group.covered, group.count, group.amount
            )?;
        }
        if !self.upcoming.is_empty() {
            writeln!(f, "├── ⏰ Upcoming deadlines:")?;
            for deadline in &self.upcoming {
                writeln!(
                    f,
                    "│   ├── {} due {} ({} d) - {} outstanding",
                    deadline.expense_id, deadline.due_date, deadline.days_until_due,
                    deadline.remaining
                )?;
            }
        }
        if !self.warnings.is_empty() {
            writeln!(f, "├── ⚠️ Dropped records:")?;
            for warning in &self.warnings {
                writeln!(f, "│   ├── {warning}")?;
            }
        }
        writeln!(f, "└── 💡 Recommendations:")?;
        for recommendation in &self.recommendations {
            writeln!(
                f,
                "    ├── [{}] {}",
                recommendation.severity, recommendation.message
            )?;
        }
        Ok(())
    }
}
