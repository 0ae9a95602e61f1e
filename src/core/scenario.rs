use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::finance::Money;
use crate::core::model::{Expense, Income, Priority};
use crate::core::report::Report;

/// Per-income hypothetical override; absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeTweak {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Per-expense hypothetical override; absent fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTweak {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// A what-if: named overrides keyed by record id. Records without an
/// entry pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub incomes: HashMap<String, IncomeTweak>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expenses: HashMap<String, ExpenseTweak>,
}

/// A pipeline run tagged with the scenario that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub report: Report,
}

/// Applies income overrides onto cloned records; the base slice is
/// never touched.
#[must_use]
pub fn apply_incomes(incomes: &[Income], scenario: &Scenario) -> Vec<Income> {
    incomes
        .iter()
        .map(|income| {
            let mut income = income.clone();
            if let Some(tweak) = scenario.incomes.get(&income.id) {
                if let Some(amount) = tweak.amount {
                    income.amount = amount;
                }
                if let Some(date) = tweak.date {
                    income.date = date;
                }
            }
            income
        })
        .collect()
}

/// Applies expense overrides onto cloned records; the base slice is
/// never touched.
#[must_use]
pub fn apply_expenses(expenses: &[Expense], scenario: &Scenario) -> Vec<Expense> {
    expenses
        .iter()
        .map(|expense| {
            let mut expense = expense.clone();
            if let Some(tweak) = scenario.expenses.get(&expense.id) {
                if let Some(amount) = tweak.amount {
                    expense.amount = amount;
                }
                if let Some(due_date) = tweak.due_date {
                    expense.due_date = due_date;
                }
                if let Some(priority) = tweak.priority {
                    expense.priority = priority;
                }
            }
            expense
        })
        .collect()
}
