use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::{self, CoreRepo, RecordSet, ReportId};
use crate::core::finance::Money;
use crate::core::model::{Expense, ExpenseStatus, Income, Priority};
use crate::core::recurrence::{Frequency, Recurrence};
use crate::core::report::Report;
use crate::core::scenario::Scenario;

#[derive(Debug)]
pub enum Error {
    CantReadRecords,
    CantParseRecords,
    CantReadReport,
    CantParseReport,
    CantReadScenarios,
    CantParseScenarios,
}

#[derive(Deserialize)]
struct Root {
    pub records: RecordsDetails,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordsDetails {
    #[serde(default)]
    pub incomes: Vec<RawIncome>,
    #[serde(default)]
    pub expenses: Vec<RawExpense>,
}

/// One income row as written by a person: everything optional, checked
/// on conversion.
#[derive(Debug, Serialize, Deserialize)]
struct RawIncome {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub recurring: Option<bool>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawExpense {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

fn income_from_raw(raw: RawIncome, position: usize) -> Option<Income> {
    let id = raw.id.unwrap_or_else(|| format!("income-{position}"));
    let Some(amount) = raw.amount else {
        warn!("skipping income {id}: missing amount");
        return None;
    };
    let Some(date) = raw.date else {
        warn!("skipping income {id}: missing date");
        return None;
    };
    let recurrence = raw.recurring.unwrap_or(false).then(|| Recurrence {
        frequency: raw.frequency.unwrap_or(Frequency::Monthly),
        until: raw.end_date,
    });
    Some(Income {
        id,
        amount: Money::new(amount),
        date,
        source: raw.source,
        recurrence,
    })
}

fn expense_from_raw(raw: RawExpense, position: usize) -> Option<Expense> {
    let id = raw.id.unwrap_or_else(|| format!("expense-{position}"));
    let Some(amount) = raw.amount else {
        warn!("skipping expense {id}: missing amount");
        return None;
    };
    let Some(due_date) = raw.due_date else {
        warn!("skipping expense {id}: missing due date");
        return None;
    };
    Some(Expense {
        id,
        name: raw.name,
        amount: Money::new(amount),
        due_date,
        priority: raw
            .priority
            .as_deref()
            .map(Priority::from_tag)
            .unwrap_or_default(),
        category: raw.category,
        status: raw
            .status
            .as_deref()
            .map(ExpenseStatus::from_tag)
            .unwrap_or_default(),
    })
}

/// Converts a parsed records file, skipping rows that are missing their
/// amount or date. A skipped row never fails the file; the remaining
/// screening (non-positive amounts, settled statuses) belongs to the
/// engine, which reports it in the allocation run's warnings.
fn yaml_to_domain(yaml: RecordsDetails) -> RecordSet {
    let incomes = yaml
        .incomes
        .into_iter()
        .enumerate()
        .filter_map(|(n, raw)| income_from_raw(raw, n))
        .collect();
    let expenses = yaml
        .expenses
        .into_iter()
        .enumerate()
        .filter_map(|(n, raw)| expense_from_raw(raw, n))
        .collect();
    RecordSet { incomes, expenses }
}

fn records_from_str(yaml_data: &str) -> Result<RecordSet, Error> {
    let root: Root = serde_yaml::from_str(yaml_data).map_err(|e| {
        error!("cannot parse records file: {e}");
        Error::CantParseRecords
    })?;
    Ok(yaml_to_domain(root.records))
}

/// Parses the records file into the engine's input snapshot.
///
/// # Errors
/// - `CantReadRecords` - the file is unreadable
/// - `CantParseRecords` - the file is not valid records YAML
pub fn records_from_yaml(path: &Path) -> Result<RecordSet, Error> {
    let yaml_data = fs::read_to_string(path).map_err(|e| {
        error!("cannot read records file: {e}");
        Error::CantReadRecords
    })?;
    records_from_str(&yaml_data)
}

/// Reads a persisted report back from its JSON file.
///
/// # Errors
/// - `CantReadReport` - the file is unreadable
/// - `CantParseReport` - the file is not a valid report
pub fn report_from_json(path: &Path) -> Result<Report, Error> {
    let json_data = fs::read_to_string(path).map_err(|e| {
        error!("cannot read report file: {e}");
        Error::CantReadReport
    })?;
    serde_json::from_str(&json_data).map_err(|e| {
        error!("cannot parse report file {:?}: {e}", path.file_name());
        Error::CantParseReport
    })
}

#[derive(Deserialize)]
struct ScenariosRoot {
    pub scenarios: Vec<Scenario>,
}

/// Parses a scenario file: a `scenarios` list of named override sets.
///
/// # Errors
/// - `CantReadScenarios` - the file is unreadable
/// - `CantParseScenarios` - the file is not valid scenario YAML
pub fn scenarios_from_yaml(path: &Path) -> Result<Vec<Scenario>, Error> {
    let yaml_data = fs::read_to_string(path).map_err(|e| {
        error!("cannot read scenarios file: {e}");
        Error::CantReadScenarios
    })?;
    let root: ScenariosRoot = serde_yaml::from_str(&yaml_data).map_err(|e| {
        error!("cannot parse scenarios file: {e}");
        Error::CantParseScenarios
    })?;
    Ok(root.scenarios)
}

/// File layout: `records.yaml` plus a `reports/` directory of one JSON
/// file per saved run.
#[derive(Debug)]
pub struct FileSystem {
    root_dir: PathBuf,
    records_path: PathBuf,
    reports_path: PathBuf,
}

impl FileSystem {
    const DEFAULT_RECORDS_CONTENT: &'static str = include_str!("../example/records.yaml");

    fn root(&self) -> &PathBuf {
        &self.root_dir
    }

    fn records_path(&self) -> &PathBuf {
        &self.records_path
    }

    fn reports_path(&self) -> &PathBuf {
        &self.reports_path
    }

    fn prepare_storage(&self, default_records_content: &str) -> Result<(), String> {
        let root = &self.root_dir;
        info!("storage not found, initializing: {}", root.display());
        fs::create_dir_all(root).map_err(|e| format!("cannot create root directory: {e}"))?;
        fs::create_dir_all(self.reports_path())
            .map_err(|e| format!("cannot create reports directory: {e}"))?;
        info!("created directory: {}", self.reports_path().display());
        let records = self.records_path();
        if !records.exists() {
            fs::write(records, default_records_content)
                .map_err(|e| format!("cannot create records.yaml: {e}"))?;
            info!("created records file with an example: {}", records.display());
            info!("edit it to describe your incomes and expenses before running!");
        }
        info!("storage initialized: {}", root.display());
        Ok(())
    }

    /// Opens the storage root, creating the layout on first use.
    ///
    /// # Errors
    /// A message describing the directory or file that could not be
    /// created.
    pub fn init<P: AsRef<Path>>(root_dir: P) -> Result<Self, String> {
        let root_dir = root_dir.as_ref().to_path_buf();
        let fs = Self {
            records_path: root_dir.join("records.yaml"),
            reports_path: root_dir.join("reports"),
            root_dir,
        };
        if fs.root_dir.exists() && fs.records_path().exists() && fs.reports_path().exists() {
            return Ok(fs);
        }
        fs.prepare_storage(Self::DEFAULT_RECORDS_CONTENT)?;
        info!(fs = ?fs);
        Ok(fs)
    }

    fn full_storage(&self) -> impl Iterator<Item = ReportId> {
        let mut files: Vec<_> = match fs::read_dir(self.reports_path()) {
            Ok(rd) => rd
                .filter_map(|e| {
                    let path = e.ok()?.path();
                    if path.extension().is_some_and(|ext| ext == "json") {
                        path.file_name()
                            .map(|os_str| os_str.to_string_lossy().to_string())
                    } else {
                        None
                    }
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        files.sort_by(|a, b| b.cmp(a));
        files.into_iter()
    }
}

impl CoreRepo for FileSystem {
    fn location(&self) -> &str {
        self.root().to_str().unwrap_or_default()
    }

    fn get_records(&self) -> Option<RecordSet> {
        records_from_yaml(self.records_path()).ok()
    }

    fn save_report(&self, report: &Report) -> Result<ReportId, api::Error> {
        // the run date names the file, so a rerun on the same day
        // replaces that day's report
        let filename: ReportId = format!("{}.json", report.summary.generated_at);
        let result_path = &self.reports_path().join(&filename);
        let mut file = File::create(result_path).map_err(|_| api::Error::CantSaveReport)?;

        let json_result =
            serde_json::to_string_pretty(report).map_err(|_| api::Error::CantSaveReport)?;
        file.write_all(json_result.as_bytes())
            .map_err(|_| api::Error::CantSaveReport)?;

        info!("saved report to {result_path:?}");
        Ok(filename)
    }

    fn report_ids<'r>(
        &'r self,
        from: Option<api::Cursor>,
        limit: usize,
    ) -> Box<dyn Iterator<Item = ReportId> + 'r> {
        let files: Vec<_> = self.full_storage().collect();
        let start = from
            .as_ref()
            .and_then(|cursor| files.iter().position(|p| p == cursor))
            .map_or(0, |idx| idx + 1);
        let files: Vec<_> = files.into_iter().skip(start).take(limit).collect();
        Box::new(files.into_iter())
    }

    fn report_by_id(&self, id: &ReportId) -> Option<api::StoredReport> {
        let path = self.reports_path().join(id);
        match report_from_json(&path) {
            Ok(report) => Some(api::StoredReport {
                id: id.clone(),
                report,
            }),
            Err(e) => {
                error!("could not load report {id}: {e:?}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::records_from_str;
    use crate::core::model::{ExpenseStatus, Priority};
    use crate::core::recurrence::Frequency;

    #[test]
    fn parses_records_and_skips_incomplete_rows() {
        let yaml = r"
records:
  incomes:
    - id: nomina
      amount: 2500
      date: 2025-06-01
      source: Nómina
      recurring: true
      frequency: mensual
    - amount: 100
  expenses:
    - id: hipoteca
      amount: 1200
      due_date: 2025-06-05
      priority: alta
      category: hipoteca
    - id: misc
      amount: 40
      due_date: 2025-06-20
    - name: sin fecha
      amount: 75
";
        let records = records_from_str(yaml).unwrap();

        // the dateless income and the due-dateless expense are skipped
        assert_eq!(records.incomes.len(), 1);
        assert_eq!(records.expenses.len(), 2);

        let nomina = &records.incomes[0];
        assert_eq!(nomina.id, "nomina");
        let recurrence = nomina.recurrence.unwrap();
        assert_eq!(recurrence.frequency, Frequency::Monthly);
        assert_eq!(recurrence.until, None);

        let hipoteca = &records.expenses[0];
        assert_eq!(hipoteca.priority, Priority::High);
        assert_eq!(hipoteca.status, ExpenseStatus::Pending);
        // rows without an id get a positional one
        assert_eq!(records.expenses[1].id, "misc");
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let records = records_from_str("records: {}").unwrap();
        assert!(records.incomes.is_empty());
        assert!(records.expenses.is_empty());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(records_from_str("not: [valid").is_err());
    }
}
