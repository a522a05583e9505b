use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    Active,
    Adjusted,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Adjusted => "adjusted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "adjusted" => Some(Self::Adjusted),
            _ => None,
        }
    }
}

/// A budgeted amount assigned to one spending category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAllocation {
    pub id: i64,
    pub category: String,
    /// Never negative.
    pub allocated_amount: Decimal,
    /// Informational only; reallocation leaves it untouched.
    pub spent_amount: Decimal,
    pub priority: Priority,
    pub status: AllocationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new allocations (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBudgetAllocation {
    pub category: String,
    pub allocated_amount: Decimal,
    pub spent_amount: Decimal,
    pub priority: Priority,
}
