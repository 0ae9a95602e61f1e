use std::{fmt::Display, ops::Deref};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::core::{
    allocate::allocate,
    config::Config,
    model::{Expense, Income},
    report::{self, Report},
    scenario::{Scenario, ScenarioReport, apply_expenses, apply_incomes},
    validate,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cant load records")]
    CantLoadRecords,
    #[error("cant save report")]
    CantSaveReport,
}

/// The prioritization engine: an explicit instance holding its
/// configuration. There is no process-wide state; construct one per
/// configuration and share it freely.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the full pipeline over a snapshot of records: screening,
    /// scoring, allocation, statistics. The inputs are read-only —
    /// everything the run mutates is its own clone — and `today`
    /// anchors every date computation, so identical calls produce
    /// identical reports.
    #[must_use]
    pub fn prioritize(
        &self,
        incomes: &[Income],
        expenses: &[Expense],
        today: NaiveDate,
    ) -> Report {
        let (incomes, expenses, warnings) = validate::screen(incomes, expenses);
        let ledger = allocate(incomes, expenses, &self.config, today);
        report::build(ledger, warnings, today)
    }

    /// Re-runs the pipeline once per scenario, each time against a
    /// freshly derived copy of the base records.
    #[must_use]
    pub fn simulate(
        &self,
        incomes: &[Income],
        expenses: &[Expense],
        scenarios: &[Scenario],
        today: NaiveDate,
    ) -> Vec<ScenarioReport> {
        scenarios
            .iter()
            .map(|scenario| ScenarioReport {
                scenario: scenario.name.clone(),
                report: self.prioritize(
                    &apply_incomes(incomes, scenario),
                    &apply_expenses(expenses, scenario),
                    today,
                ),
            })
            .collect()
    }
}

pub type ReportId = String;

/// The record snapshot a repository hands to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub id: ReportId,
    pub report: Report,
}

impl Display for StoredReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.id)?;
        writeln!(f, "{}", self.report)
    }
}

impl From<(ReportId, Report)> for StoredReport {
    fn from(value: (ReportId, Report)) -> Self {
        Self {
            id: value.0,
            report: value.1,
        }
    }
}

/// Persistence seam of the surrounding application. The engine never
/// performs I/O; everything fallible lives behind this trait.
pub trait CoreRepo {
    fn location(&self) -> &str;
    fn get_records(&self) -> Option<RecordSet>;
    fn save_report(&self, report: &Report) -> Result<ReportId, Error>;
    fn report_ids<'r>(
        &'r self,
        from: Option<Cursor>,
        limit: usize,
    ) -> Box<dyn Iterator<Item = ReportId> + 'r>;
    fn report_by_id(&self, id: &ReportId) -> Option<StoredReport>;
}

pub fn get_records<R: CoreRepo>(provider: &R) -> Option<RecordSet> {
    provider.get_records()
}

/// Runs the engine over the repository's records and persists the
/// resulting report.
///
/// # Errors
/// `CantLoadRecords` when the repository has no readable records;
/// `CantSaveReport` when persisting fails.
pub fn run_and_save<R: CoreRepo>(
    repo: &R,
    engine: &Engine,
    today: NaiveDate,
) -> Result<StoredReport, Error> {
    let records = repo.get_records().ok_or(Error::CantLoadRecords)?;
    let report = engine.prioritize(&records.incomes, &records.expenses, today);
    let id = repo.save_report(&report)?;
    Ok(StoredReport { id, report })
}

pub type Cursor = String;

#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<Cursor>,
}

impl<T> Deref for Page<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<Cursor>) -> Self {
        Self { items, next_cursor }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn report_ids<R: CoreRepo>(repo: &R, from: Option<Cursor>, limit: usize) -> Page<ReportId> {
    let mut iter = repo.report_ids(from, limit + 1);
    let items: Vec<ReportId> = iter.by_ref().take(limit).collect();
    let next_cursor = iter.next();
    let page = Page::new(items, next_cursor);
    debug!(?page);
    page
}

pub fn report_by_id<R: CoreRepo>(repo: &R, id: &ReportId) -> Option<StoredReport> {
    repo.report_by_id(id)
}


#[cfg(test)]
mod test_repo {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::core::finance::Money;
    use crate::core::model::Income;

    struct InMemoryRepo {
        reports: Vec<StoredReport>,
        records: Option<RecordSet>,
    }

    impl CoreRepo for InMemoryRepo {
        fn location(&self) -> &str {
            "MemoryRepo"
        }
        fn get_records(&self) -> Option<RecordSet> {
            self.records.clone()
        }
        fn save_report(&self, _report: &Report) -> Result<ReportId, Error> {
            unimplemented!()
        }
        fn report_ids<'a>(
            &'a self,
            from: Option<Cursor>,
            limit: usize,
        ) -> Box<dyn Iterator<Item = ReportId> + 'a> {
            let mut items: Vec<_> = self.reports.iter().map(|r| r.id.clone()).collect();
            items.sort();
            let start = from
                .as_ref()
                .and_then(|cursor| items.iter().position(|r| r == cursor))
                .map_or(0, |idx| idx + 1);
            Box::new(items.into_iter().skip(start).take(limit))
        }
        fn report_by_id(&self, id: &ReportId) -> Option<StoredReport> {
            self.reports.iter().find(|r| &r.id == id).cloned()
        }
    }

    fn make_report(id: &str) -> StoredReport {
        let engine = Engine::default();
        let incomes = vec![Income::new(
            "i1",
            Money::new(dec!(100)),
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )];
        StoredReport {
            id: id.to_string(),
            report: engine.prioritize(&incomes, &[], NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        }
    }

    fn repo(ids: &[&str]) -> InMemoryRepo {
        InMemoryRepo {
            reports: ids.iter().map(|id| make_report(id)).collect(),
            records: None,
        }
    }

    #[test]
    fn empty_storage() {
        let page = report_ids(&repo(&[]), None, 10);
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn one_report() {
        let page = report_ids(&repo(&["first"]), None, 10);
        assert_eq!(page.items, vec!["first"]);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn from_param_skips_cursor() {
        let page = report_ids(&repo(&["a", "b", "c"]), Some("a".to_string()), 10);
        assert_eq!(page.items, vec!["b", "c"]);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn limit_yields_next_cursor() {
        let page = report_ids(&repo(&["a", "b", "c"]), None, 2);
        assert_eq!(page.items, vec!["a", "b"]);
        assert_eq!(page.next_cursor, Some("c".to_string()));
    }

    #[test]
    fn from_and_limit() {
        let page = report_ids(&repo(&["a", "b", "c"]), Some("a".to_string()), 1);
        assert_eq!(page.items, vec!["b"]);
        assert_eq!(page.next_cursor, Some("c".to_string()));
    }

    #[test]
    fn limit_zero() {
        let page = report_ids(&repo(&["a", "b"]), None, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor, Some("a".to_string()));
    }

    #[test]
    fn lookup_by_id() {
        let repo = repo(&["a", "b"]);
        assert!(report_by_id(&repo, &"b".to_string()).is_some());
        assert!(report_by_id(&repo, &"zzz".to_string()).is_none());
    }

    #[test]
    fn run_and_save_requires_records() {
        let repo = repo(&[]);
        let engine = Engine::default();
        let result = run_and_save(
            &repo,
            &engine,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        );
        assert!(matches!(result, Err(Error::CantLoadRecords)));
    }
}
