use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::core::finance::Money;
use crate::core::recurrence::Recurrence;

/// A funding source: an amount that becomes available on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub amount: Money,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Income {
    #[must_use]
    pub fn new(id: impl Into<String>, amount: Money, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            amount,
            date,
            source: None,
            recurrence: None,
        }
    }

    /// Projected payout dates, starting with the income's own date.
    #[must_use]
    pub fn upcoming_dates(&self, count: usize) -> Vec<NaiveDate> {
        match &self.recurrence {
            Some(r) => r.schedule(self.date, count),
            None => vec![self.date],
        }
    }

    /// The amount flattened to a per-month figure.
    #[must_use]
    pub fn monthly_equivalent(&self) -> Money {
        match &self.recurrence {
            Some(r) => Money::new(self.amount.value() * r.frequency.monthly_factor()),
            None => self.amount,
        }
    }
}

impl Display for Income {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] available {}", self.id, self.amount, self.date)?;
        if let Some(source) = &self.source {
            write!(f, " from {source}")?;
        }
        Ok(())
    }
}

/// Priority class of an expense.
///
/// Deserialization is lenient on purpose: the original records carry
/// the Spanish tags, and anything unrecognized ranks lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "high" | "alta" => Priority::High,
            "medium" | "media" => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Priority::from_tag(&tag))
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        write!(f, "{label}")
    }
}

/// Lifecycle state of an expense. `Paid` and `Cancelled` arrive from
/// the caller and exclude the record from allocation; the other three
/// are (re)assigned by the engine on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Covered,
    PartiallyCovered,
    Paid,
    Cancelled,
}

impl ExpenseStatus {
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "covered" | "cubierto" => ExpenseStatus::Covered,
            "partially_covered" | "parcialmente_cubierto" => ExpenseStatus::PartiallyCovered,
            "paid" | "pagado" => ExpenseStatus::Paid,
            "cancelled" | "canceled" | "cancelado" => ExpenseStatus::Cancelled,
            _ => ExpenseStatus::Pending,
        }
    }

    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, ExpenseStatus::Paid | ExpenseStatus::Cancelled)
    }
}

impl<'de> Deserialize<'de> for ExpenseStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(ExpenseStatus::from_tag(&tag))
    }
}

impl Display for ExpenseStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Covered => "covered",
            ExpenseStatus::PartiallyCovered => "partially_covered",
            ExpenseStatus::Paid => "paid",
            ExpenseStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// An obligation: an amount due by a date, with a priority class and an
/// optional category tag feeding the scoring table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub amount: Money,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ExpenseStatus,
}

impl Expense {
    #[must_use]
    pub fn new(id: impl Into<String>, amount: Money, due_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: None,
            amount,
            due_date,
            priority: Priority::default(),
            category: None,
            status: ExpenseStatus::default(),
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl Display for Expense {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] due {} ({})",
            self.id, self.amount, self.due_date, self.priority
        )
    }
}

/// Whether an allocation settles the expense's remaining need at the
/// moment it is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationKind {
    Full,
    Partial,
}

/// A slice of an income's amount assigned to an expense's need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: Uuid,
    pub income_id: String,
    pub expense_id: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub kind: AllocationKind,
}

impl Allocation {
    /// Builds the allocation with a deterministic id: a v5 UUID over
    /// (income, expense, sequence), so identical runs produce identical
    /// ledgers.
    ///
    /// # Panics
    /// On a non-positive amount; such an allocation is a bug in the
    /// allocator, never valid input.
    #[must_use]
    pub fn new(
        seq: usize,
        income_id: &str,
        expense_id: &str,
        amount: Money,
        date: NaiveDate,
        kind: AllocationKind,
    ) -> Self {
        assert!(
            amount.is_positive(),
            "allocation of {amount} from {income_id} to {expense_id}"
        );
        let name = format!("{income_id}/{expense_id}/{seq}");
        Self {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
            income_id: income_id.to_string(),
            expense_id: expense_id.to_string(),
            amount,
            date,
            kind,
        }
    }
}

impl Display for Allocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} : {}",
            self.income_id, self.expense_id, self.amount
        )
    }
}
