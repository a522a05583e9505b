//! In-memory repository for service tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::db::{FinanceRepository, RepositoryError};
use crate::models::{
    AllocationStatus, BudgetAllocation, ExpenseRecord, ExpenseStatus, FinancialGoal, GoalStatus,
    IncomeEntry, IncomeKind, IncomeStatus, NewBudgetAllocation, NewExpenseRecord,
    NewFinancialGoal, NewIncomeEntry, Priority,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    income: Vec<IncomeEntry>,
    expenses: Vec<ExpenseRecord>,
    allocations: Vec<BudgetAllocation>,
    goals: Vec<FinancialGoal>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
    updates: AtomicUsize,
    fail_updates: AtomicBool,
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

impl MemoryRepository {
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub async fn add_income(
        &self,
        amount: Decimal,
        status: IncomeStatus,
    ) {
        self.create_income(NewIncomeEntry {
            description: "paycheck".to_string(),
            kind: IncomeKind::Salary,
            amount,
            status,
            received_on: epoch().date_naive(),
        })
        .await
        .unwrap();
    }

    pub async fn add_expense(
        &self,
        amount: Decimal,
        date: DateTime<Utc>,
        status: ExpenseStatus,
    ) {
        self.create_expense(NewExpenseRecord {
            description: "purchase".to_string(),
            amount,
            category: "general".to_string(),
            date,
            status,
        })
        .await
        .unwrap();
    }

    pub async fn add_allocation(
        &self,
        category: &str,
        amount: Decimal,
        priority: Priority,
        status: AllocationStatus,
    ) {
        let mut created = self
            .create_allocation(NewBudgetAllocation {
                category: category.to_string(),
                allocated_amount: amount,
                spent_amount: Decimal::ZERO,
                priority,
            })
            .await
            .unwrap();
        created.status = status;
        let mut tables = self.tables.lock().unwrap();
        if let Some(row) = tables.allocations.iter_mut().find(|a| a.id == created.id) {
            *row = created;
        }
    }

    pub async fn add_goal(
        &self,
        title: &str,
        status: GoalStatus,
    ) {
        self.create_goal(NewFinancialGoal {
            title: title.to_string(),
            target_amount: Decimal::new(1000000, 2),
            current_amount: Decimal::ZERO,
            deadline: None,
            status,
        })
        .await
        .unwrap();
    }
}

#[async_trait]
impl FinanceRepository for MemoryRepository {
    async fn create_income(&self, entry: NewIncomeEntry) -> Result<IncomeEntry, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let row = IncomeEntry {
            id: tables.next_id(),
            description: entry.description,
            kind: entry.kind,
            amount: entry.amount,
            status: entry.status,
            received_on: entry.received_on,
            created_at: epoch(),
            updated_at: epoch(),
        };
        tables.income.push(row.clone());
        Ok(row)
    }

    async fn list_income(
        &self,
        status: Option<IncomeStatus>,
    ) -> Result<Vec<IncomeEntry>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .income
            .iter()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .cloned()
            .collect())
    }

    async fn delete_income(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.income.len();
        tables.income.retain(|e| e.id != id);
        if tables.income.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_expense(
        &self,
        expense: NewExpenseRecord,
    ) -> Result<ExpenseRecord, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let row = ExpenseRecord {
            id: tables.next_id(),
            description: expense.description,
            amount: expense.amount,
            category: expense.category,
            date: expense.date,
            status: expense.status,
            created_at: epoch(),
        };
        tables.expenses.push(row.clone());
        Ok(row)
    }

    async fn list_expenses_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExpenseRecord>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<ExpenseRecord> = tables
            .expenses
            .iter()
            .filter(|e| e.date >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn delete_expense(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.expenses.len();
        tables.expenses.retain(|e| e.id != id);
        if tables.expenses.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_allocation(
        &self,
        allocation: NewBudgetAllocation,
    ) -> Result<BudgetAllocation, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let row = BudgetAllocation {
            id: tables.next_id(),
            category: allocation.category,
            allocated_amount: allocation.allocated_amount,
            spent_amount: allocation.spent_amount,
            priority: allocation.priority,
            status: AllocationStatus::Active,
            created_at: epoch(),
            updated_at: epoch(),
        };
        tables.allocations.push(row.clone());
        Ok(row)
    }

    async fn get_allocation(&self, id: i64) -> Result<BudgetAllocation, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        tables
            .allocations
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_allocations(
        &self,
        status: Option<AllocationStatus>,
    ) -> Result<Vec<BudgetAllocation>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .allocations
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect())
    }

    async fn update_allocation(
        &self,
        allocation: &BudgetAllocation,
    ) -> Result<(), RepositoryError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database("disk I/O error".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        let row = tables
            .allocations
            .iter_mut()
            .find(|a| a.id == allocation.id)
            .ok_or(RepositoryError::NotFound)?;
        row.allocated_amount = allocation.allocated_amount;
        row.status = allocation.status;
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_allocation(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.allocations.len();
        tables.allocations.retain(|a| a.id != id);
        if tables.allocations.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn create_goal(&self, goal: NewFinancialGoal) -> Result<FinancialGoal, RepositoryError> {
        let mut tables = self.tables.lock().unwrap();
        let row = FinancialGoal {
            id: tables.next_id(),
            title: goal.title,
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            deadline: goal.deadline,
            status: goal.status,
            created_at: epoch(),
            updated_at: epoch(),
        };
        tables.goals.push(row.clone());
        Ok(row)
    }

    async fn list_goals(
        &self,
        status: Option<GoalStatus>,
    ) -> Result<Vec<FinancialGoal>, RepositoryError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .goals
            .iter()
            .filter(|g| status.is_none_or(|s| g.status == s))
            .cloned()
            .collect())
    }
}
