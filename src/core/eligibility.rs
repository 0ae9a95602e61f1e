use chrono::{Duration, NaiveDate};

use crate::core::model::Priority;

/// Grace window for high-priority expenses: income arriving up to this
/// many days after the due date still counts toward them.
pub const GRACE_DAYS: i64 = 3;

/// The latest availability date an income may have and still fund an
/// expense due on `due_date`.
#[must_use]
pub fn effective_deadline(due_date: NaiveDate, priority: Priority) -> NaiveDate {
    if priority == Priority::High {
        due_date + Duration::days(GRACE_DAYS)
    } else {
        due_date
    }
}

/// Temporal eligibility: the only constraint connecting an income to an
/// expense. No category or currency matching exists in this design.
#[must_use]
pub fn is_eligible(available: NaiveDate, due_date: NaiveDate, priority: Priority) -> bool {
    available <= effective_deadline(due_date, priority)
}

#[cfg(test)]
mod test_eligibility {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{effective_deadline, is_eligible};
    use crate::core::model::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn deadline_extends_only_for_high() {
        let due = date(2025, 6, 18);
        assert_eq!(effective_deadline(due, Priority::High), date(2025, 6, 21));
        assert_eq!(effective_deadline(due, Priority::Medium), due);
        assert_eq!(effective_deadline(due, Priority::Low), due);
    }

    #[rstest]
    // income on or before the due date always qualifies
    #[case(date(2025, 6, 18), Priority::Low, true)]
    #[case(date(2025, 6, 1), Priority::Medium, true)]
    // late income only qualifies for high priority, within the window
    #[case(date(2025, 6, 19), Priority::Medium, false)]
    #[case(date(2025, 6, 19), Priority::High, true)]
    #[case(date(2025, 6, 21), Priority::High, true)]
    #[case(date(2025, 6, 22), Priority::High, false)]
    fn eligibility(#[case] available: NaiveDate, #[case] priority: Priority, #[case] ok: bool) {
        assert_eq!(is_eligible(available, date(2025, 6, 18), priority), ok);
    }
}
