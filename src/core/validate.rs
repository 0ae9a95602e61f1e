use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::core::model::{Expense, Income};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    NonPositiveAmount,
    AlreadySettled,
}

/// One silently dropped record. Dropping is the designed behavior — a
/// tracker must not halt on one bad record — but the identity of what
/// was dropped travels with the report instead of vanishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub kind: RecordKind,
    pub id: String,
    pub reason: DropReason,
}

impl Display for ValidationWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
        };
        let reason = match self.reason {
            DropReason::NonPositiveAmount => "non-positive amount",
            DropReason::AlreadySettled => "already settled",
        };
        write!(f, "dropped {kind} {}: {reason}", self.id)
    }
}

/// Screens the caller's records before allocation: incomes must carry a
/// positive amount; expenses must carry a positive amount and not be in
/// a settled state. Survivors are cloned — the engine never touches the
/// caller's data.
#[must_use]
pub fn screen(
    incomes: &[Income],
    expenses: &[Expense],
) -> (Vec<Income>, Vec<Expense>, Vec<ValidationWarning>) {
    let mut warnings = Vec::new();

    let incomes = incomes
        .iter()
        .filter(|income| {
            if income.amount.is_positive() {
                return true;
            }
            warnings.push(ValidationWarning {
                kind: RecordKind::Income,
                id: income.id.clone(),
                reason: DropReason::NonPositiveAmount,
            });
            false
        })
        .cloned()
        .collect();

    let expenses = expenses
        .iter()
        .filter(|expense| {
            let reason = if !expense.amount.is_positive() {
                Some(DropReason::NonPositiveAmount)
            } else if expense.status.is_settled() {
                Some(DropReason::AlreadySettled)
            } else {
                None
            };
            match reason {
                Some(reason) => {
                    warnings.push(ValidationWarning {
                        kind: RecordKind::Expense,
                        id: expense.id.clone(),
                        reason,
                    });
                    false
                }
                None => true,
            }
        })
        .cloned()
        .collect();

    (incomes, expenses, warnings)
}

#[cfg(test)]
mod test_validate {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::{DropReason, RecordKind, screen};
    use crate::core::finance::Money;
    use crate::core::model::{Expense, ExpenseStatus, Income};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keeps_valid_records() {
        let incomes = vec![Income::new("i1", Money::new(dec!(100)), date(2025, 6, 1))];
        let expenses = vec![Expense::new("e1", Money::new(dec!(50)), date(2025, 6, 5))];
        let (incomes, expenses, warnings) = screen(&incomes, &expenses);
        assert_eq!(incomes.len(), 1);
        assert_eq!(expenses.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn drops_non_positive_amounts() {
        let incomes = vec![
            Income::new("i1", Money::ZERO, date(2025, 6, 1)),
            Income::new("i2", Money::new(dec!(-5)), date(2025, 6, 1)),
            Income::new("i3", Money::new(dec!(5)), date(2025, 6, 1)),
        ];
        let (incomes, _, warnings) = screen(&incomes, &[]);
        assert_eq!(incomes.len(), 1);
        assert_eq!(incomes[0].id, "i3");
        assert_eq!(warnings.len(), 2);
        assert!(
            warnings
                .iter()
                .all(|w| w.kind == RecordKind::Income
                    && w.reason == DropReason::NonPositiveAmount)
        );
    }

    #[test]
    fn drops_settled_expenses() {
        let mut paid = Expense::new("e1", Money::new(dec!(50)), date(2025, 6, 5));
        paid.status = ExpenseStatus::Paid;
        let mut cancelled = Expense::new("e2", Money::new(dec!(50)), date(2025, 6, 5));
        cancelled.status = ExpenseStatus::Cancelled;
        let open = Expense::new("e3", Money::new(dec!(50)), date(2025, 6, 5));

        let (_, expenses, warnings) = screen(&[], &[paid, cancelled, open]);
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].id, "e3");
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.reason == DropReason::AlreadySettled));
    }
}
