use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{
    AllocationStatus, BudgetAllocation, ExpenseRecord, FinancialGoal, GoalStatus, IncomeEntry,
    IncomeStatus, NewBudgetAllocation, NewExpenseRecord, NewFinancialGoal, NewIncomeEntry,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait FinanceRepository: Send + Sync {
    // Income
    async fn create_income(&self, entry: NewIncomeEntry) -> Result<IncomeEntry, RepositoryError>;
    async fn list_income(
        &self,
        status: Option<IncomeStatus>,
    ) -> Result<Vec<IncomeEntry>, RepositoryError>;
    async fn delete_income(&self, id: i64) -> Result<(), RepositoryError>;

    // Expenses
    async fn create_expense(
        &self,
        expense: NewExpenseRecord,
    ) -> Result<ExpenseRecord, RepositoryError>;

    /// Expenses dated at or after `since`, newest first.
    async fn list_expenses_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExpenseRecord>, RepositoryError>;
    async fn delete_expense(&self, id: i64) -> Result<(), RepositoryError>;

    // Budget allocations
    async fn create_allocation(
        &self,
        allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation, RepositoryError>;
    async fn get_allocation(&self, id: i64) -> Result<BudgetAllocation, RepositoryError>;
    async fn list_allocations(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<BudgetAllocation>, RepositoryError>;

    /// Persists `allocated_amount` and `status` and refreshes `updated_at`.
    async fn update_allocation(
        &self,
        allocation: &BudgetAllocation,
    ) -> Result<(), RepositoryError>;
    async fn delete_allocation(&self, id: i64) -> Result<(), RepositoryError>;

    // Financial goals
    async fn create_goal(&self, goal: NewFinancialGoal) -> Result<FinancialGoal, RepositoryError>;
    async fn list_goals(
        &self,
        status: Option<GoalStatus>,
    ) -> Result<Vec<FinancialGoal>, RepositoryError>;
}
