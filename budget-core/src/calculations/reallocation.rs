//! Budget reallocation: rescales category allocations to match income.
//!
//! The scale factor is `total_income / total_allocated`. Each allocation is
//! then rescaled according to its priority tier:
//!
//! | Priority | New amount |
//! |----------|------------|
//! | high     | `min(allocated × 1.1, allocated × scale)` |
//! | medium   | `allocated × scale` |
//! | low      | `allocated × min(scale, 0.8)` |
//!
//! Results are rounded to cents, half away from zero, and every returned
//! allocation is marked [`AllocationStatus::Adjusted`].
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use rust_decimal_macros::dec;
//! use budget_core::calculations::adjust;
//! use budget_core::{AllocationStatus, BudgetAllocation, Priority};
//!
//! let now = Utc::now();
//! let allocations = vec![BudgetAllocation {
//!     id: 1,
//!     category: "rent".to_string(),
//!     allocated_amount: dec!(200.00),
//!     spent_amount: dec!(0.00),
//!     priority: Priority::High,
//!     status: AllocationStatus::Active,
//!     created_at: now,
//!     updated_at: now,
//! }];
//!
//! let adjusted = adjust(dec!(300.00), dec!(0.00), &allocations).unwrap();
//!
//! assert_eq!(adjusted[0].allocated_amount, dec!(220.00));
//! assert_eq!(adjusted[0].status, AllocationStatus::Adjusted);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{AmountOverflow, round_currency, sum_amounts};
use crate::models::{AllocationStatus, BudgetAllocation, Priority};

/// Errors raised by the reallocation calculator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReallocationError {
    /// The allocation set cannot produce a finite scale factor, or a
    /// rescaled amount falls outside the `Decimal` range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<AmountOverflow> for ReallocationError {
    fn from(err: AmountOverflow) -> Self {
        ReallocationError::InvalidInput(err.to_string())
    }
}

/// Tier limits applied on top of the proportional scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReallocationPolicy {
    /// Largest factor a high-priority allocation may grow by.
    pub high_growth_cap: Decimal,
    /// Largest factor applied to a low-priority allocation.
    pub low_factor_cap: Decimal,
}

impl Default for ReallocationPolicy {
    fn default() -> Self {
        Self {
            high_growth_cap: Decimal::new(11, 1),
            low_factor_cap: Decimal::new(8, 1),
        }
    }
}

/// Calculator for priority-aware budget reallocation.
///
/// Stateless apart from its policy; safe to share between callers.
#[derive(Debug, Clone, Default)]
pub struct BudgetReallocator {
    policy: ReallocationPolicy,
}

impl BudgetReallocator {
    pub fn new(policy: ReallocationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReallocationPolicy {
        &self.policy
    }

    /// Rescales `allocations` against `total_income`.
    ///
    /// `total_expense_30d` is the caller's trailing 30-day spend. It is logged
    /// alongside the computation but does not enter the formula.
    ///
    /// # Errors
    ///
    /// Returns [`ReallocationError::InvalidInput`] if:
    /// - `allocations` is empty
    /// - any allocated amount is negative
    /// - the allocated amounts sum to zero
    /// - a total or rescaled amount overflows `Decimal`
    pub fn adjust(
        &self,
        total_income: Decimal,
        total_expense_30d: Decimal,
        allocations: &[BudgetAllocation],
    ) -> Result<Vec<BudgetAllocation>, ReallocationError> {
        let scale = scale_factor(total_income, allocations)?;

        debug!(
            %total_income,
            %total_expense_30d,
            %scale,
            count = allocations.len(),
            "reallocating budget"
        );

        allocations
            .iter()
            .map(|allocation| {
                Ok(BudgetAllocation {
                    allocated_amount: self.rescale(allocation, scale)?,
                    status: AllocationStatus::Adjusted,
                    ..allocation.clone()
                })
            })
            .collect()
    }

    /// Computes the new amount for a single allocation.
    ///
    /// Amounts are non-negative, so `min(a × cap, a × scale)` equals
    /// `a × min(cap, scale)` and only one product is formed.
    fn rescale(
        &self,
        allocation: &BudgetAllocation,
        scale: Decimal,
    ) -> Result<Decimal, ReallocationError> {
        let factor = match allocation.priority {
            Priority::High => scale.min(self.policy.high_growth_cap),
            Priority::Low => scale.min(self.policy.low_factor_cap),
            Priority::Medium => scale,
        };
        let new_amount = allocation
            .allocated_amount
            .checked_mul(factor)
            .ok_or_else(|| {
                ReallocationError::InvalidInput(format!(
                    "allocation {} rescaled by {factor} is out of range",
                    allocation.id
                ))
            })?;
        Ok(round_currency(new_amount))
    }
}

/// Ratio of total income to the total currently allocated.
///
/// # Errors
///
/// Same input conditions as [`BudgetReallocator::adjust`].
pub fn scale_factor(
    total_income: Decimal,
    allocations: &[BudgetAllocation],
) -> Result<Decimal, ReallocationError> {
    if allocations.is_empty() {
        return Err(ReallocationError::InvalidInput(
            "no allocations provided".to_string(),
        ));
    }

    if let Some(negative) = allocations
        .iter()
        .find(|a| a.allocated_amount < Decimal::ZERO)
    {
        return Err(ReallocationError::InvalidInput(format!(
            "allocation {} has negative amount {}",
            negative.id, negative.allocated_amount
        )));
    }

    let total_allocated = sum_amounts(allocations.iter().map(|a| a.allocated_amount))?;
    if total_allocated.is_zero() {
        return Err(ReallocationError::InvalidInput(
            "total allocated amount is zero".to_string(),
        ));
    }

    total_income.checked_div(total_allocated).ok_or_else(|| {
        ReallocationError::InvalidInput(format!(
            "scale factor {total_income} / {total_allocated} is out of range"
        ))
    })
}

/// Rescales allocations with the default [`ReallocationPolicy`].
pub fn adjust(
    total_income: Decimal,
    total_expense_30d: Decimal,
    allocations: &[BudgetAllocation],
) -> Result<Vec<BudgetAllocation>, ReallocationError> {
    BudgetReallocator::default().adjust(total_income, total_expense_30d, allocations)
}
