//! Aggregated view of income, spending and goal progress.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{AmountOverflow, round_currency, sum_amounts};
use crate::models::{ExpenseRecord, ExpenseStatus, FinancialGoal, IncomeEntry, IncomeKind};

/// Expense category whose spending is reported as investment.
pub const INVESTMENT_CATEGORY: &str = "investment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub title: String,
    pub current_amount: Decimal,
    pub target_amount: Decimal,
    /// Fraction saved, rounded to two places.
    pub progress: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub income_by_kind: BTreeMap<IncomeKind, Decimal>,
    pub total_expenses: Decimal,
    pub expenses_by_category: BTreeMap<String, Decimal>,
    pub investment_total: Decimal,
    /// `total_income - total_expenses`
    pub balance: Decimal,
    pub daily_expenses: BTreeMap<NaiveDate, Decimal>,
    pub goals: Vec<GoalProgress>,
}

/// Sum of amounts over active income entries.
pub fn total_active_income(income: &[IncomeEntry]) -> Result<Decimal, AmountOverflow> {
    sum_amounts(income.iter().filter(|e| e.is_active()).map(|e| e.amount))
}

/// Sum of amounts over expenses that were not cancelled.
pub fn total_expenses(expenses: &[ExpenseRecord]) -> Result<Decimal, AmountOverflow> {
    sum_amounts(counted_expenses(expenses).map(|e| e.amount))
}

fn accumulate<K: Ord>(
    totals: &mut BTreeMap<K, Decimal>,
    key: K,
    amount: Decimal,
) -> Result<(), AmountOverflow> {
    let total = totals.entry(key).or_insert(Decimal::ZERO);
    *total = total.checked_add(amount).ok_or(AmountOverflow)?;
    Ok(())
}

fn counted_expenses(expenses: &[ExpenseRecord]) -> impl Iterator<Item = &ExpenseRecord> {
    expenses
        .iter()
        .filter(|e| e.status != ExpenseStatus::Cancelled)
}

/// Builds the summary. Inactive income and cancelled expenses are left out.
///
/// # Errors
///
/// [`AmountOverflow`] when any total does not fit in a `Decimal`.
pub fn summarize(
    income: &[IncomeEntry],
    expenses: &[ExpenseRecord],
    goals: &[FinancialGoal],
) -> Result<FinancialSummary, AmountOverflow> {
    let mut income_by_kind = BTreeMap::new();
    for entry in income.iter().filter(|e| e.is_active()) {
        accumulate(&mut income_by_kind, entry.kind, entry.amount)?;
    }

    let mut expenses_by_category = BTreeMap::new();
    let mut daily_expenses = BTreeMap::new();
    let investment_total = sum_amounts(
        counted_expenses(expenses)
            .filter(|e| e.category.eq_ignore_ascii_case(INVESTMENT_CATEGORY))
            .map(|e| e.amount),
    )?;
    for expense in counted_expenses(expenses) {
        accumulate(&mut expenses_by_category, expense.category.clone(), expense.amount)?;
        accumulate(&mut daily_expenses, expense.date.date_naive(), expense.amount)?;
    }

    let total_income = total_active_income(income)?;
    let total_expenses = total_expenses(expenses)?;

    Ok(FinancialSummary {
        total_income,
        income_by_kind,
        total_expenses,
        expenses_by_category,
        investment_total,
        balance: total_income
            .checked_sub(total_expenses)
            .ok_or(AmountOverflow)?,
        daily_expenses,
        goals: goals
            .iter()
            .map(|goal| {
                Ok(GoalProgress {
                    title: goal.title.clone(),
                    current_amount: goal.current_amount,
                    target_amount: goal.target_amount,
                    progress: round_currency(goal.progress().ok_or(AmountOverflow)?),
                })
            })
            .collect::<Result<_, AmountOverflow>>()?,
    })
}
