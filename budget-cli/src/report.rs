//! Plain-text rendering of command results.

use std::fmt;

use budget_core::BudgetAllocation;
use budget_core::calculations::FinancialSummary;
use budget_core::calculations::common::round_currency;
use budget_core::services::AdjustmentOutcome;
use rust_decimal::Decimal;

pub struct AllocationTable<'a>(pub &'a [BudgetAllocation]);

impl fmt::Display for AllocationTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No budget allocations.");
        }

        writeln!(
            f,
            "{:>4}  {:<18} {:<8} {:<9} {:>12} {:>12}",
            "ID", "CATEGORY", "PRIORITY", "STATUS", "ALLOCATED", "SPENT"
        )?;
        for a in self.0 {
            writeln!(
                f,
                "{:>4}  {:<18} {:<8} {:<9} {:>12.2} {:>12.2}",
                a.id,
                a.category,
                a.priority.as_str(),
                a.status.as_str(),
                a.allocated_amount,
                a.spent_amount
            )?;
        }
        Ok(())
    }
}

pub struct SummaryReport<'a> {
    pub summary: &'a FinancialSummary,
    pub window_days: u32,
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = self.summary;
        writeln!(f, "Total income:       {:>12.2}", s.total_income)?;
        writeln!(
            f,
            "Expenses ({:>2} days): {:>12.2}",
            self.window_days, s.total_expenses
        )?;
        writeln!(f, "Investments:        {:>12.2}", s.investment_total)?;
        writeln!(f, "Balance:            {:>12.2}", s.balance)?;

        if !s.income_by_kind.is_empty() {
            writeln!(f)?;
            writeln!(f, "Income by kind")?;
            for (kind, amount) in &s.income_by_kind {
                writeln!(f, "  {:<18}{:>12.2}", kind.as_str(), amount)?;
            }
        }

        if !s.expenses_by_category.is_empty() {
            writeln!(f)?;
            writeln!(f, "Expenses by category")?;
            for (category, amount) in &s.expenses_by_category {
                writeln!(f, "  {:<18}{:>12.2}", category, amount)?;
            }
        }

        if !s.goals.is_empty() {
            writeln!(f)?;
            writeln!(f, "Goals")?;
            for goal in &s.goals {
                writeln!(
                    f,
                    "  {:<18}{:>12.2} / {:<12.2} {:>5.1}%",
                    goal.title,
                    goal.current_amount,
                    goal.target_amount,
                    goal.progress * Decimal::ONE_HUNDRED
                )?;
            }
        }
        Ok(())
    }
}

pub struct AdjustmentReport<'a> {
    pub outcome: &'a AdjustmentOutcome,
    /// `false` for a dry run.
    pub applied: bool,
}

impl fmt::Display for AdjustmentReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let o = self.outcome;
        writeln!(f, "Total income:   {:>12.2}", o.total_income)?;
        writeln!(f, "Total expenses: {:>12.2}", o.total_expenses)?;
        writeln!(f, "Scale factor:   {:>12.4}", o.scale_factor)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<18} {:<8} {:>12} {:>12} {:>12}",
            "CATEGORY", "PRIORITY", "BEFORE", "AFTER", "CHANGE"
        )?;
        for (before, after) in o.before.iter().zip(&o.adjusted) {
            writeln!(
                f,
                "{:<18} {:<8} {:>12.2} {:>12.2} {:>+12.2}",
                after.category,
                after.priority.as_str(),
                before.allocated_amount,
                after.allocated_amount,
                round_currency(after.allocated_amount - before.allocated_amount)
            )?;
        }
        writeln!(f)?;
        if self.applied {
            writeln!(f, "{} allocations updated.", o.adjusted.len())
        } else {
            writeln!(f, "Dry run: nothing was saved.")
        }
    }
}
