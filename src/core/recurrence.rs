use std::fmt::{Display, Formatter};

use chrono::{Datelike, Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// How often a recurring income repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[serde(alias = "diario")]
    Daily,
    #[serde(alias = "semanal")]
    Weekly,
    #[serde(alias = "quincenal")]
    Biweekly,
    #[serde(alias = "mensual")]
    Monthly,
}

impl Frequency {
    /// Next occurrence after `from`. Biweekly pay cycles run on 15-day
    /// steps; monthly steps clamp to the end of shorter months.
    #[must_use]
    pub fn advance(self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => from + Duration::days(1),
            Frequency::Weekly => from + Duration::days(7),
            Frequency::Biweekly => from + Duration::days(15),
            Frequency::Monthly => from
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Occurrences per month, for flattening a recurring amount into a
    /// monthly equivalent. Weekly uses the 4.33 average weeks per month.
    #[must_use]
    pub fn monthly_factor(self) -> Decimal {
        match self {
            Frequency::Daily => dec!(30),
            Frequency::Weekly => dec!(4.33),
            Frequency::Biweekly => dec!(2),
            Frequency::Monthly => Decimal::ONE,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        };
        write!(f, "{label}")
    }
}

/// Recurrence of an income: frequency plus an optional last valid date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

impl Recurrence {
    #[must_use]
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            until: None,
        }
    }

    #[must_use]
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.until = Some(end);
        self
    }

    /// Up to `count` occurrence dates starting at `start`. The start
    /// date itself is always the first occurrence; the schedule stops
    /// early once it would step past `until`.
    #[must_use]
    pub fn schedule(&self, start: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(count);
        let mut current = start;
        for _ in 0..count {
            dates.push(current);
            current = self.frequency.advance(current);
            if self.until.is_some_and(|end| current > end) {
                break;
            }
        }
        dates
    }

    /// Whether an income starting at `start` pays out on `date`.
    #[must_use]
    pub fn occurs_on(&self, start: NaiveDate, date: NaiveDate) -> bool {
        if date < start {
            return false;
        }
        if self.until.is_some_and(|end| date > end) {
            return false;
        }
        let days = (date - start).num_days();
        match self.frequency {
            Frequency::Daily => true,
            Frequency::Weekly => days % 7 == 0,
            Frequency::Biweekly => days % 15 == 0,
            Frequency::Monthly => start.day() == date.day(),
        }
    }
}

#[cfg(test)]
mod test_recurrence {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{Frequency, Recurrence};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(Frequency::Daily, date(2025, 6, 1), date(2025, 6, 2))]
    #[case(Frequency::Weekly, date(2025, 6, 1), date(2025, 6, 8))]
    #[case(Frequency::Biweekly, date(2025, 6, 1), date(2025, 6, 16))]
    #[case(Frequency::Monthly, date(2025, 6, 1), date(2025, 7, 1))]
    #[case(Frequency::Monthly, date(2025, 1, 31), date(2025, 2, 28))]
    fn advance(#[case] freq: Frequency, #[case] from: NaiveDate, #[case] expected: NaiveDate) {
        assert_eq!(freq.advance(from), expected);
    }

    #[test]
    fn schedule_without_end() {
        let r = Recurrence::new(Frequency::Monthly);
        assert_eq!(
            r.schedule(date(2025, 6, 15), 3),
            vec![date(2025, 6, 15), date(2025, 7, 15), date(2025, 8, 15)]
        );
    }

    #[test]
    fn schedule_stops_at_end_date() {
        let r = Recurrence::new(Frequency::Weekly).until(date(2025, 6, 20));
        assert_eq!(
            r.schedule(date(2025, 6, 1), 12),
            vec![date(2025, 6, 1), date(2025, 6, 8), date(2025, 6, 15)]
        );
    }

    #[test]
    fn single_occurrence_when_start_is_last() {
        let r = Recurrence::new(Frequency::Monthly).until(date(2025, 6, 1));
        assert_eq!(r.schedule(date(2025, 6, 1), 5), vec![date(2025, 6, 1)]);
    }

    #[rstest]
    #[case(Frequency::Weekly, date(2025, 6, 22), true)]
    #[case(Frequency::Weekly, date(2025, 6, 23), false)]
    #[case(Frequency::Biweekly, date(2025, 6, 16), true)]
    #[case(Frequency::Monthly, date(2025, 8, 1), true)]
    #[case(Frequency::Monthly, date(2025, 8, 2), false)]
    #[case(Frequency::Daily, date(2025, 9, 9), true)]
    fn occurs_on(#[case] freq: Frequency, #[case] probe: NaiveDate, #[case] expected: bool) {
        let r = Recurrence::new(freq);
        assert_eq!(r.occurs_on(date(2025, 6, 1), probe), expected);
    }

    #[test]
    fn never_occurs_before_start_or_after_end() {
        let r = Recurrence::new(Frequency::Daily).until(date(2025, 6, 10));
        assert!(!r.occurs_on(date(2025, 6, 5), date(2025, 6, 4)));
        assert!(!r.occurs_on(date(2025, 6, 5), date(2025, 6, 11)));
    }
}
