//! Load → reallocate → persist, with the calculator kept free of storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::calculations::{
    BudgetReallocator, ReallocationError, ReallocationPolicy, TrailingWindow, scale_factor,
};
use crate::db::{FinanceRepository, RepositoryError};
use crate::models::BudgetAllocation;
use crate::services::FinancialSnapshot;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdjustmentError {
    #[error(transparent)]
    Reallocation(#[from] ReallocationError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What a reallocation pass computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentOutcome {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub scale_factor: Decimal,
    /// Allocations as loaded, in the same order as `adjusted`.
    pub before: Vec<BudgetAllocation>,
    pub adjusted: Vec<BudgetAllocation>,
}

pub struct BudgetAdjustmentService<'a, R: FinanceRepository + ?Sized> {
    repo: &'a R,
    reallocator: BudgetReallocator,
    window: TrailingWindow,
    include_adjusted: bool,
}

impl<'a, R: FinanceRepository + ?Sized> BudgetAdjustmentService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self {
            repo,
            reallocator: BudgetReallocator::default(),
            window: TrailingWindow::default(),
            include_adjusted: false,
        }
    }

    pub fn with_policy(mut self, policy: ReallocationPolicy) -> Self {
        self.reallocator = BudgetReallocator::new(policy);
        self
    }

    pub fn with_window(mut self, window: TrailingWindow) -> Self {
        self.window = window;
        self
    }

    /// Also rescale allocations a previous pass already adjusted.
    pub fn include_adjusted(mut self, include: bool) -> Self {
        self.include_adjusted = include;
        self
    }

    /// Computes the new allocations without writing anything.
    pub async fn preview(
        &self,
        now: DateTime<Utc>,
    ) -> Result<AdjustmentOutcome, AdjustmentError> {
        let snapshot = FinancialSnapshot::load(self.repo, now, self.window).await?;
        let before = if self.include_adjusted {
            snapshot.allocations.clone()
        } else {
            snapshot.active_allocations()
        };

        let total_income = snapshot.total_income().map_err(ReallocationError::from)?;
        let total_expenses = snapshot.total_expenses().map_err(ReallocationError::from)?;
        let scale_factor = scale_factor(total_income, &before)?;
        let adjusted = self
            .reallocator
            .adjust(total_income, total_expenses, &before)?;

        Ok(AdjustmentOutcome {
            total_income,
            total_expenses,
            scale_factor,
            before,
            adjusted,
        })
    }

    /// Computes the new allocations and writes each one back.
    ///
    /// Nothing is written when the calculation fails.
    pub async fn apply(
        &self,
        now: DateTime<Utc>,
    ) -> Result<AdjustmentOutcome, AdjustmentError> {
        let outcome = self.preview(now).await?;

        for allocation in &outcome.adjusted {
            self.repo.update_allocation(allocation).await?;
        }

        info!(
            count = outcome.adjusted.len(),
            scale_factor = %outcome.scale_factor,
            "budget allocations adjusted"
        );

        Ok(outcome)
    }
}
