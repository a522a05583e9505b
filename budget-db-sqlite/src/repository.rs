use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use budget_core::{
    AllocationStatus, BudgetAllocation, ExpenseRecord, ExpenseStatus, FinanceRepository,
    FinancialGoal, GoalStatus, IncomeEntry, IncomeKind, IncomeStatus, NewBudgetAllocation,
    NewExpenseRecord, NewFinancialGoal, NewIncomeEntry, Priority, RepositoryError,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            info!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", name, e)))
}

fn code<T>(
    row: &SqliteRow,
    name: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, RepositoryError> {
    let raw: String = column(row, name)?;
    parse(&raw).ok_or_else(|| RepositoryError::Database(format!("Invalid {}: {}", name, raw)))
}

fn row_to_income(row: &SqliteRow) -> Result<IncomeEntry, RepositoryError> {
    Ok(IncomeEntry {
        id: column(row, "id")?,
        description: column(row, "description")?,
        kind: code(row, "kind", IncomeKind::parse)?,
        amount: get_decimal(row, "amount")?,
        status: code(row, "status", IncomeStatus::parse)?,
        received_on: column::<NaiveDate>(row, "received_on")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_expense(row: &SqliteRow) -> Result<ExpenseRecord, RepositoryError> {
    Ok(ExpenseRecord {
        id: column(row, "id")?,
        description: column(row, "description")?,
        amount: get_decimal(row, "amount")?,
        category: column(row, "category")?,
        date: column::<DateTime<Utc>>(row, "date")?,
        status: code(row, "status", ExpenseStatus::parse)?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn row_to_allocation(row: &SqliteRow) -> Result<BudgetAllocation, RepositoryError> {
    Ok(BudgetAllocation {
        id: column(row, "id")?,
        category: column(row, "category")?,
        allocated_amount: get_decimal(row, "allocated_amount")?,
        spent_amount: get_decimal(row, "spent_amount")?,
        priority: code(row, "priority", Priority::parse)?,
        status: code(row, "status", AllocationStatus::parse)?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_goal(row: &SqliteRow) -> Result<FinancialGoal, RepositoryError> {
    Ok(FinancialGoal {
        id: column(row, "id")?,
        title: column(row, "title")?,
        target_amount: get_decimal(row, "target_amount")?,
        current_amount: get_decimal(row, "current_amount")?,
        deadline: column::<Option<NaiveDate>>(row, "deadline")?,
        status: code(row, "status", GoalStatus::parse)?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

const INCOME_COLUMNS: &str =
    "SELECT id, description, kind, amount, status, received_on, created_at, updated_at FROM income";

const EXPENSE_COLUMNS: &str =
    "SELECT id, description, amount, category, date, status, created_at FROM expenses";

const ALLOCATION_COLUMNS: &str = "SELECT id, category, allocated_amount, spent_amount, priority,
        status, created_at, updated_at
     FROM budget_allocations";

const GOAL_COLUMNS: &str = "SELECT id, title, target_amount, current_amount, deadline, status,
        created_at, updated_at
     FROM financial_goals";

impl SqliteRepository {
    async fn delete_by_id(
        &self,
        table: &'static str,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_income(
        &self,
        id: i64,
    ) -> Result<IncomeEntry, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", INCOME_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_income(&row)
    }

    async fn get_expense(
        &self,
        id: i64,
    ) -> Result<ExpenseRecord, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", EXPENSE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_expense(&row)
    }

    async fn get_goal(
        &self,
        id: i64,
    ) -> Result<FinancialGoal, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", GOAL_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_goal(&row)
    }
}

#[async_trait]
impl FinanceRepository for SqliteRepository {
    async fn create_income(
        &self,
        entry: NewIncomeEntry,
    ) -> Result<IncomeEntry, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO income (description, kind, amount, status, received_on, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.description)
        .bind(entry.kind.as_str())
        .bind(decimal_to_text(entry.amount))
        .bind(entry.status.as_str())
        .bind(entry.received_on)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_income(result.last_insert_rowid()).await
    }

    async fn list_income(
        &self,
        status: Option<IncomeStatus>,
    ) -> Result<Vec<IncomeEntry>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{} WHERE status = ? ORDER BY received_on DESC, id",
                    INCOME_COLUMNS
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY received_on DESC, id", INCOME_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_income).collect()
    }

    async fn delete_income(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        self.delete_by_id("income", id).await
    }

    async fn create_expense(
        &self,
        expense: NewExpenseRecord,
    ) -> Result<ExpenseRecord, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO expenses (description, amount, category, date, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.description)
        .bind(decimal_to_text(expense.amount))
        .bind(&expense.category)
        .bind(expense.date)
        .bind(expense.status.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_expense(result.last_insert_rowid()).await
    }

    async fn list_expenses_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExpenseRecord>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{} WHERE date >= ? ORDER BY date DESC, id DESC",
            EXPENSE_COLUMNS
        ))
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(%since, count = rows.len(), "loaded expenses");
        rows.iter().map(row_to_expense).collect()
    }

    async fn delete_expense(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        self.delete_by_id("expenses", id).await
    }

    async fn create_allocation(
        &self,
        allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO budget_allocations (
                category, allocated_amount, spent_amount, priority, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&allocation.category)
        .bind(decimal_to_text(allocation.allocated_amount))
        .bind(decimal_to_text(allocation.spent_amount))
        .bind(allocation.priority.as_str())
        .bind(AllocationStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_allocation(result.last_insert_rowid()).await
    }

    async fn get_allocation(
        &self,
        id: i64,
    ) -> Result<BudgetAllocation, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", ALLOCATION_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_allocation(&row)
    }

    async fn list_allocations(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<BudgetAllocation>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!("{} WHERE status = ? ORDER BY id", ALLOCATION_COLUMNS))
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY id", ALLOCATION_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_allocation).collect()
    }

    async fn update_allocation(
        &self,
        allocation: &BudgetAllocation,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE budget_allocations SET allocated_amount = ?, status = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(decimal_to_text(allocation.allocated_amount))
        .bind(allocation.status.as_str())
        .bind(Utc::now())
        .bind(allocation.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_allocation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        self.delete_by_id("budget_allocations", id).await
    }

    async fn create_goal(
        &self,
        goal: NewFinancialGoal,
    ) -> Result<FinancialGoal, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO financial_goals (
                title, target_amount, current_amount, deadline, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&goal.title)
        .bind(decimal_to_text(goal.target_amount))
        .bind(decimal_to_text(goal.current_amount))
        .bind(goal.deadline)
        .bind(goal.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        self.get_goal(result.last_insert_rowid()).await
    }

    async fn list_goals(
        &self,
        status: Option<GoalStatus>,
    ) -> Result<Vec<FinancialGoal>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!("{} WHERE status = ? ORDER BY id", GOAL_COLUMNS))
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY id", GOAL_COLUMNS))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_goal).collect()
    }
}
