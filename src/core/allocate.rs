use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::eligibility::is_eligible;
use crate::core::finance::{Money, Percentage};
use crate::core::model::{
    Allocation, AllocationKind, Expense, ExpenseStatus, Income, Priority,
};
use crate::core::scoring::{days_until_due, priority_score};

/// An income after allocation: what is left of it and which expenses it
/// funded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeOutcome {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub amount: Money,
    pub date: NaiveDate,
    pub remaining: Money,
    pub funded: Vec<String>,
}

impl IncomeOutcome {
    fn new(income: Income) -> Self {
        Self {
            id: income.id,
            source: income.source,
            amount: income.amount,
            date: income.date,
            remaining: income.amount,
            funded: Vec::new(),
        }
    }
}

/// An expense after allocation: its rank inputs, what remains unfunded
/// and the terminal status of this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseOutcome {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub score: i64,
    pub days_until_due: i64,
    pub remaining: Money,
    pub status: ExpenseStatus,
    pub funded_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_covered: Option<Percentage>,
}

impl ExpenseOutcome {
    fn new(expense: Expense, today: NaiveDate, config: &Config) -> Self {
        Self {
            score: priority_score(&expense, today, config),
            days_until_due: days_until_due(expense.due_date, today),
            remaining: expense.amount,
            status: ExpenseStatus::Pending,
            funded_by: Vec::new(),
            percent_covered: None,
            id: expense.id,
            name: expense.name,
            amount: expense.amount,
            due_date: expense.due_date,
            priority: expense.priority,
            category: expense.category,
        }
    }

    /// One-shot terminal classification once every eligible income has
    /// been tried. Re-running the allocator is the only way to change
    /// an expense's status afterwards.
    fn classify(&mut self) {
        assert!(
            self.remaining >= Money::ZERO,
            "negative remaining need on expense {}",
            self.id
        );
        if !self.remaining.is_positive() {
            self.status = ExpenseStatus::Covered;
        } else if self.remaining < self.amount {
            self.percent_covered = Some(Percentage::of(
                (self.amount - self.remaining).value(),
                self.amount.value(),
            ));
            self.status = ExpenseStatus::PartiallyCovered;
        } else {
            self.status = ExpenseStatus::Pending;
        }
    }
}

/// Result of one allocation run over a snapshot of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub incomes: Vec<IncomeOutcome>,
    pub expenses: Vec<ExpenseOutcome>,
    pub allocations: Vec<Allocation>,
}

/// Ranking comparator: score first, urgency second. The final amount
/// tie-break flips direction for a pair of high-priority expenses so
/// the biggest critical obligation is funded first, while elsewhere the
/// cheapest expense wins.
fn rank(a: &ExpenseOutcome, b: &ExpenseOutcome) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.days_until_due.cmp(&b.days_until_due))
        .then_with(|| {
            if a.priority == Priority::High && b.priority == Priority::High {
                b.amount.cmp(&a.amount)
            } else {
                a.amount.cmp(&b.amount)
            }
        })
}

/// Greedy fund assignment: expenses in rank order each drain the
/// earliest eligible incomes until satisfied or until nothing eligible
/// remains. Every allocation is the largest amount both sides allow, so
/// the pass is single-shot per pair.
#[must_use]
pub fn allocate(
    incomes: Vec<Income>,
    expenses: Vec<Expense>,
    config: &Config,
    today: NaiveDate,
) -> Ledger {
    let mut incomes: Vec<IncomeOutcome> = incomes.into_iter().map(IncomeOutcome::new).collect();
    incomes.sort_by_key(|income| income.date);

    let mut expenses: Vec<ExpenseOutcome> = expenses
        .into_iter()
        .map(|expense| ExpenseOutcome::new(expense, today, config))
        .collect();
    expenses.sort_by(rank);

    let mut allocations: Vec<Allocation> = Vec::new();
    for expense in &mut expenses {
        for income in &mut incomes {
            if !expense.remaining.is_positive() {
                break;
            }
            if !income.remaining.is_positive() {
                continue;
            }
            if !is_eligible(income.date, expense.due_date, expense.priority) {
                continue;
            }

            let amount = expense.remaining.min(income.remaining);
            let kind = if amount == expense.remaining {
                AllocationKind::Full
            } else {
                AllocationKind::Partial
            };
            allocations.push(Allocation::new(
                allocations.len(),
                &income.id,
                &expense.id,
                amount,
                today,
                kind,
            ));
            income.remaining -= amount;
            expense.remaining -= amount;
            income.funded.push(expense.id.clone());
            expense.funded_by.push(income.id.clone());
        }
        expense.classify();
    }

    Ledger {
        incomes,
        expenses,
        allocations,
    }
}
