//! Budget calculations.
//!
//! Everything here is pure: inputs are records already loaded by the caller
//! and nothing reads or writes storage.

pub mod common;
pub mod reallocation;
pub mod summary;
pub mod window;

pub use common::AmountOverflow;
pub use reallocation::{
    BudgetReallocator, ReallocationError, ReallocationPolicy, adjust, scale_factor,
};
pub use summary::{
    FinancialSummary, GoalProgress, summarize, total_active_income, total_expenses,
};
pub use window::TrailingWindow;
