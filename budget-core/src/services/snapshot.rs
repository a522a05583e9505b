use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{
    AmountOverflow, FinancialSummary, TrailingWindow, summarize, total_active_income,
    total_expenses,
};
use crate::db::{FinanceRepository, RepositoryError};
use crate::models::{
    AllocationStatus, BudgetAllocation, ExpenseRecord, ExpenseStatus, FinancialGoal, GoalStatus,
    IncomeEntry, IncomeStatus,
};

/// Records loaded from storage for one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    /// Active income entries.
    pub income: Vec<IncomeEntry>,
    /// Expenses inside the trailing window, newest first.
    pub expenses: Vec<ExpenseRecord>,
    /// Every allocation, active or already adjusted.
    pub allocations: Vec<BudgetAllocation>,
    /// Active goals.
    pub goals: Vec<FinancialGoal>,
}

impl FinancialSnapshot {
    pub async fn load<R>(
        repo: &R,
        now: DateTime<Utc>,
        window: TrailingWindow,
    ) -> Result<Self, RepositoryError>
    where
        R: FinanceRepository + ?Sized,
    {
        let income = repo.list_income(Some(IncomeStatus::Active)).await?;
        let recent = repo.list_expenses_since(window.start(now)).await?;
        let expenses = window.filter_expenses(&recent, now);
        let allocations = repo.list_allocations(None).await?;
        let goals = repo.list_goals(Some(GoalStatus::Active)).await?;

        debug!(
            income = income.len(),
            expenses = expenses.len(),
            allocations = allocations.len(),
            goals = goals.len(),
            window_days = window.days(),
            "loaded financial snapshot"
        );

        Ok(Self {
            income,
            expenses,
            allocations,
            goals,
        })
    }

    pub fn total_income(&self) -> Result<Decimal, AmountOverflow> {
        total_active_income(&self.income)
    }

    pub fn total_expenses(&self) -> Result<Decimal, AmountOverflow> {
        total_expenses(&self.expenses)
    }

    pub fn balance(&self) -> Result<Decimal, AmountOverflow> {
        self.total_income()?
            .checked_sub(self.total_expenses()?)
            .ok_or(AmountOverflow)
    }

    pub fn active_allocations(&self) -> Vec<BudgetAllocation> {
        self.allocations
            .iter()
            .filter(|a| a.status == AllocationStatus::Active)
            .cloned()
            .collect()
    }

    pub fn pending_expenses(&self) -> Vec<ExpenseRecord> {
        self.expenses
            .iter()
            .filter(|e| e.status == ExpenseStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> Result<FinancialSummary, AmountOverflow> {
        summarize(&self.income, &self.expenses, &self.goals)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::Priority;
    use crate::services::testing::MemoryRepository;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    async fn seeded() -> MemoryRepository {
        let repo = MemoryRepository::default();
        repo.add_income(dec!(4000.00), IncomeStatus::Active).await;
        repo.add_income(dec!(900.00), IncomeStatus::Inactive).await;
        repo.add_expense(dec!(150.00), now() - Duration::days(3), ExpenseStatus::Completed)
            .await;
        repo.add_expense(dec!(75.00), now() - Duration::days(10), ExpenseStatus::Pending)
            .await;
        repo.add_expense(dec!(500.00), now() - Duration::days(60), ExpenseStatus::Completed)
            .await;
        repo.add_expense(dec!(20.00), now() + Duration::days(2), ExpenseStatus::Pending)
            .await;
        repo.add_allocation("rent", dec!(1500.00), Priority::High, AllocationStatus::Active)
            .await;
        repo.add_allocation("fun", dec!(200.00), Priority::Low, AllocationStatus::Adjusted)
            .await;
        repo.add_goal("House", GoalStatus::Active).await;
        repo.add_goal("Boat", GoalStatus::Cancelled).await;
        repo
    }

    #[tokio::test]
    async fn load_applies_status_and_window_filters() {
        let repo = seeded().await;

        let snapshot = FinancialSnapshot::load(&repo, now(), TrailingWindow::default())
            .await
            .unwrap();

        assert_eq!(snapshot.income.len(), 1);
        assert_eq!(snapshot.expenses.len(), 2);
        assert_eq!(snapshot.allocations.len(), 2);
        assert_eq!(snapshot.goals.len(), 1);
        assert_eq!(snapshot.goals[0].title, "House");
    }

    #[tokio::test]
    async fn totals_and_balance() {
        let repo = seeded().await;

        let snapshot = FinancialSnapshot::load(&repo, now(), TrailingWindow::default())
            .await
            .unwrap();

        assert_eq!(snapshot.total_income(), Ok(dec!(4000.00)));
        assert_eq!(snapshot.total_expenses(), Ok(dec!(225.00)));
        assert_eq!(snapshot.balance(), Ok(dec!(3775.00)));
    }

    #[tokio::test]
    async fn active_allocations_and_pending_expenses() {
        let repo = seeded().await;

        let snapshot = FinancialSnapshot::load(&repo, now(), TrailingWindow::default())
            .await
            .unwrap();

        let active = snapshot.active_allocations();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].category, "rent");

        let pending = snapshot.pending_expenses();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].amount, dec!(75.00));
    }

    #[tokio::test]
    async fn summary_uses_snapshot_records() {
        let repo = seeded().await;

        let snapshot = FinancialSnapshot::load(&repo, now(), TrailingWindow::new(7))
            .await
            .unwrap();
        let summary = snapshot.summary().unwrap();

        assert_eq!(summary.total_expenses, dec!(150.00));
        assert_eq!(summary.balance, dec!(3850.00));
    }
}
