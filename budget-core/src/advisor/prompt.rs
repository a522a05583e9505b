//! Prompt assembly for the advisor.
//!
//! Records are embedded as JSON so the text service sees the same field
//! names the storage layer uses.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::models::{BudgetAllocation, ExpenseRecord, FinancialGoal};
use crate::services::FinancialSnapshot;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("failed to serialize prompt data: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, PromptError> {
    Ok(serde_json::to_string(value)?)
}

fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, PromptError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// General recommendations over recent spending, goals and budgets.
pub fn recommendations_prompt(
    expenses: &[ExpenseRecord],
    goals: &[FinancialGoal],
    allocations: &[BudgetAllocation],
) -> Result<String, PromptError> {
    Ok(format!(
        "Analyze the following financial data and provide personalized recommendations:\n\
         \n\
         Transactions: {}\n\
         Goals: {}\n\
         Budgets: {}\n\
         \n\
         Please provide:\n\
         1. An analysis of spending patterns\n\
         2. Suggestions for saving money\n\
         3. Recommendations for reaching the financial goals\n\
         4. Warnings about possible problems\n\
         \n\
         Answer clearly and objectively.",
        json(expenses)?,
        json(goals)?,
        json(allocations)?,
    ))
}

/// A user question answered strictly from the snapshot.
pub fn chat_prompt(
    question: &str,
    snapshot: &FinancialSnapshot,
) -> Result<String, PromptError> {
    Ok(format!(
        "As a financial assistant, analyze the client's financial data and answer the question:\n\
         \"{}\"\n\
         \n\
         Client financial data:\n\
         - Recent transactions: {}\n\
         - Recent income: {}\n\
         - Financial goals: {}\n\
         - Budgets: {}\n\
         \n\
         Base the answer ONLY on the data above, including:\n\
         1. A specific analysis of the client's data\n\
         2. Real figures from the transactions and income\n\
         3. Progress toward the goals\n\
         4. The state of the budgets\n\
         \n\
         Keep a professional but friendly tone. If the question cannot be answered \
         with the available data, say so.",
        question.trim(),
        json(&snapshot.expenses)?,
        json(&snapshot.income)?,
        json(&snapshot.goals)?,
        json(&snapshot.allocations)?,
    ))
}

/// Ordering of pending payments and goal contributions given the balance.
pub fn prioritization_prompt(
    balance: Decimal,
    pending_expenses: &[ExpenseRecord],
    goals: &[FinancialGoal],
) -> Result<String, PromptError> {
    Ok(format!(
        "Analyze the financial situation and prioritize the payments and goals:\n\
         \n\
         Available balance: {}\n\
         \n\
         Pending expenses:\n\
         {}\n\
         \n\
         Financial goals:\n\
         {}\n\
         \n\
         Please provide:\n\
         1. A priority rating for each expense\n\
         2. The recommended payment order\n\
         3. A suggested allocation toward the goals\n\
         4. Warnings about financial risks\n\
         5. Recommendations to optimize the budget",
        balance,
        pretty_json(pending_expenses)?,
        pretty_json(goals)?,
    ))
}
