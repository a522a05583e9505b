mod budget_allocation;
mod expense_record;
mod financial_goal;
mod income_entry;
mod priority;

pub use budget_allocation::{AllocationStatus, BudgetAllocation, NewBudgetAllocation};
pub use expense_record::{ExpenseRecord, ExpenseStatus, NewExpenseRecord};
pub use financial_goal::{FinancialGoal, GoalStatus, NewFinancialGoal};
pub use income_entry::{IncomeEntry, IncomeKind, IncomeStatus, NewIncomeEntry};
pub use priority::Priority;
