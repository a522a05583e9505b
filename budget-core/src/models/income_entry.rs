use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeKind {
    Salary,
    Investment,
    Freelance,
    Rental,
    Other,
}

impl IncomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Investment => "investment",
            Self::Freelance => "freelance",
            Self::Rental => "rental",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "salary" => Some(Self::Salary),
            "investment" => Some(Self::Investment),
            "freelance" => Some(Self::Freelance),
            "rental" => Some(Self::Rental),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeStatus {
    Active,
    Inactive,
}

impl IncomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub id: i64,
    pub description: String,
    pub kind: IncomeKind,
    pub amount: Decimal,
    pub status: IncomeStatus,
    pub received_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncomeEntry {
    /// Only active entries count toward total income.
    pub fn is_active(&self) -> bool {
        self.status == IncomeStatus::Active
    }
}

/// For creating new income entries (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIncomeEntry {
    pub description: String,
    pub kind: IncomeKind,
    pub amount: Decimal,
    pub status: IncomeStatus,
    pub received_on: NaiveDate,
}
