use std::io::Read;

use budget_core::{
    ExpenseStatus, FinanceRepository, GoalStatus, IncomeKind, IncomeStatus, NewBudgetAllocation,
    NewExpenseRecord, NewFinancialGoal, NewIncomeEntry, Priority, RepositoryError,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when importing records.
#[derive(Debug, Error, PartialEq)]
pub enum RecordLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    /// `row` counts data rows from 1, not including the header.
    #[error("Row {row}: invalid {field} '{value}'")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for RecordLoaderError {
    fn from(err: csv::Error) -> Self {
        RecordLoaderError::CsvParse(err.to_string())
    }
}

/// Which table a CSV file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Income,
    Expenses,
    Allocations,
    Goals,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expenses => "expenses",
            Self::Allocations => "allocations",
            Self::Goals => "goals",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "expenses" => Some(Self::Expenses),
            "allocations" => Some(Self::Allocations),
            "goals" => Some(Self::Goals),
            _ => None,
        }
    }
}

/// Parsed rows, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Income(Vec<NewIncomeEntry>),
    Expenses(Vec<NewExpenseRecord>),
    Allocations(Vec<NewBudgetAllocation>),
    Goals(Vec<NewFinancialGoal>),
}

impl RecordBatch {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Income(_) => RecordKind::Income,
            Self::Expenses(_) => RecordKind::Expenses,
            Self::Allocations(_) => RecordKind::Allocations,
            Self::Goals(_) => RecordKind::Goals,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Income(rows) => rows.len(),
            Self::Expenses(rows) => rows.len(),
            Self::Allocations(rows) => rows.len(),
            Self::Goals(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `description,kind,amount,status,received_on`
///
/// `status` may be left empty and defaults to `active`.
#[derive(Debug, Deserialize)]
struct IncomeRow {
    description: String,
    kind: String,
    amount: Decimal,
    status: Option<String>,
    received_on: NaiveDate,
}

/// `description,amount,category,date,status`
///
/// `date` is either `YYYY-MM-DD` (midnight UTC), `YYYY-MM-DD HH:MM:SS` (UTC)
/// or RFC 3339. `status` defaults to `completed`.
#[derive(Debug, Deserialize)]
struct ExpenseRow {
    description: String,
    amount: Decimal,
    category: String,
    date: String,
    status: Option<String>,
}

/// `category,allocated_amount,spent_amount,priority`
#[derive(Debug, Deserialize)]
struct AllocationRow {
    category: String,
    allocated_amount: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    spent_amount: Option<Decimal>,
    priority: Option<String>,
}

/// `title,target_amount,current_amount,deadline,status`
#[derive(Debug, Deserialize)]
struct GoalRow {
    title: String,
    target_amount: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    current_amount: Option<Decimal>,
    deadline: Option<NaiveDate>,
    status: Option<String>,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, RecordLoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: T = result?;
        rows.push(row);
    }

    Ok(rows)
}

/// Parse a lowercase code column, falling back to `default` when the cell is
/// empty.
fn parse_code<T>(
    row: usize,
    field: &'static str,
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    default: Option<T>,
) -> Result<T, RecordLoaderError> {
    let invalid = |value: &str| RecordLoaderError::InvalidValue {
        row,
        field,
        value: value.to_string(),
    };

    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => parse(&raw.to_ascii_lowercase()).ok_or_else(|| invalid(raw)),
        None => default.ok_or_else(|| invalid("")),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_negative(
    row: usize,
    field: &'static str,
    amount: Decimal,
) -> Result<Decimal, RecordLoaderError> {
    if amount < Decimal::ZERO {
        return Err(RecordLoaderError::InvalidValue {
            row,
            field,
            value: amount.to_string(),
        });
    }
    Ok(amount)
}

/// Imports income, expenses, budget allocations and goals from CSV.
///
/// Columns are matched by header name, so their order does not matter.
/// Inserts go through [`FinanceRepository`], so any backend works.
pub struct RecordLoader;

impl RecordLoader {
    /// Parse and validate every row of `reader` as `kind`.
    ///
    /// Nothing is returned unless every row is valid.
    pub fn parse<R: Read>(
        kind: RecordKind,
        reader: R,
    ) -> Result<RecordBatch, RecordLoaderError> {
        match kind {
            RecordKind::Income => Self::parse_income(reader).map(RecordBatch::Income),
            RecordKind::Expenses => Self::parse_expenses(reader).map(RecordBatch::Expenses),
            RecordKind::Allocations => {
                Self::parse_allocations(reader).map(RecordBatch::Allocations)
            }
            RecordKind::Goals => Self::parse_goals(reader).map(RecordBatch::Goals),
        }
    }

    pub fn parse_income<R: Read>(reader: R) -> Result<Vec<NewIncomeEntry>, RecordLoaderError> {
        read_rows::<IncomeRow, _>(reader)?
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let row = i + 1;
                Ok(NewIncomeEntry {
                    kind: parse_code(
                        row,
                        "kind",
                        Some(r.kind.as_str()),
                        IncomeKind::parse,
                        None,
                    )?,
                    status: parse_code(
                        row,
                        "status",
                        r.status.as_deref(),
                        IncomeStatus::parse,
                        Some(IncomeStatus::Active),
                    )?,
                    amount: r.amount,
                    description: r.description,
                    received_on: r.received_on,
                })
            })
            .collect()
    }

    pub fn parse_expenses<R: Read>(
        reader: R
    ) -> Result<Vec<NewExpenseRecord>, RecordLoaderError> {
        read_rows::<ExpenseRow, _>(reader)?
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let row = i + 1;
                let date = parse_timestamp(&r.date).ok_or_else(|| {
                    RecordLoaderError::InvalidValue {
                        row,
                        field: "date",
                        value: r.date.clone(),
                    }
                })?;
                Ok(NewExpenseRecord {
                    status: parse_code(
                        row,
                        "status",
                        r.status.as_deref(),
                        ExpenseStatus::parse,
                        Some(ExpenseStatus::Completed),
                    )?,
                    description: r.description,
                    amount: r.amount,
                    category: r.category,
                    date,
                })
            })
            .collect()
    }

    pub fn parse_allocations<R: Read>(
        reader: R
    ) -> Result<Vec<NewBudgetAllocation>, RecordLoaderError> {
        read_rows::<AllocationRow, _>(reader)?
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let row = i + 1;
                Ok(NewBudgetAllocation {
                    allocated_amount: non_negative(row, "allocated_amount", r.allocated_amount)?,
                    spent_amount: r.spent_amount.unwrap_or(Decimal::ZERO),
                    priority: parse_code(
                        row,
                        "priority",
                        r.priority.as_deref(),
                        Priority::parse,
                        Some(Priority::default()),
                    )?,
                    category: r.category,
                })
            })
            .collect()
    }

    pub fn parse_goals<R: Read>(reader: R) -> Result<Vec<NewFinancialGoal>, RecordLoaderError> {
        read_rows::<GoalRow, _>(reader)?
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let row = i + 1;
                Ok(NewFinancialGoal {
                    target_amount: non_negative(row, "target_amount", r.target_amount)?,
                    current_amount: r.current_amount.unwrap_or(Decimal::ZERO),
                    status: parse_code(
                        row,
                        "status",
                        r.status.as_deref(),
                        GoalStatus::parse,
                        Some(GoalStatus::Active),
                    )?,
                    title: r.title,
                    deadline: r.deadline,
                })
            })
            .collect()
    }

    /// Insert every record in `batch`, returning how many were inserted.
    ///
    /// Rows are appended; loading the same file twice inserts it twice.
    pub async fn load<R: FinanceRepository + ?Sized>(
        repo: &R,
        batch: &RecordBatch,
    ) -> Result<usize, RecordLoaderError> {
        let mut inserted = 0;

        match batch {
            RecordBatch::Income(rows) => {
                for entry in rows {
                    repo.create_income(entry.clone()).await?;
                    inserted += 1;
                }
            }
            RecordBatch::Expenses(rows) => {
                for expense in rows {
                    repo.create_expense(expense.clone()).await?;
                    inserted += 1;
                }
            }
            RecordBatch::Allocations(rows) => {
                for allocation in rows {
                    repo.create_allocation(allocation.clone()).await?;
                    inserted += 1;
                }
            }
            RecordBatch::Goals(rows) => {
                for goal in rows {
                    repo.create_goal(goal.clone()).await?;
                    inserted += 1;
                }
            }
        }

        debug!(kind = batch.kind().as_str(), inserted, "records loaded");
        Ok(inserted)
    }
}
