//! Orchestration over the repository and the pure calculations.

mod adjustment;
mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use adjustment::{AdjustmentError, AdjustmentOutcome, BudgetAdjustmentService};
pub use snapshot::FinancialSnapshot;
