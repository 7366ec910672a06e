use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::numeric::lenient_decimal;

/// Whether a category (or bill) tracks money coming in or going out.
///
/// On the wire the backend uses the codes `THU` (income) and `CHI` (expense).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum CategoryType {
    #[serde(rename = "THU")]
    Income,
    #[serde(rename = "CHI")]
    Expense,
}

impl CategoryType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Wire code used by the backend and the local store.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Income => "THU",
            Self::Expense => "CHI",
        }
    }

    /// Accepts wire codes and English names, case-insensitive.
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "thu" | "income" | "in" => Some(Self::Income),
            "chi" | "expense" | "expenses" | "out" => Some(Self::Expense),
            _ => None,
        }
    }

    pub(crate) fn all() -> &'static [CategoryType] {
        &[Self::Income, Self::Expense]
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i64>,
    #[serde(rename = "category_name")]
    pub(crate) name: String,
    pub(crate) category_type: CategoryType,
    /// Share of the user's budget, 0-100.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub(crate) percentage_limit: Decimal,
    /// Planned amount.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub(crate) amount: Decimal,
    /// Amount accrued against the plan so far. May exceed `amount`.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub(crate) actual_amount: Decimal,
    pub(crate) user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

impl Category {
    pub(crate) fn new(
        name: String,
        category_type: CategoryType,
        percentage_limit: Decimal,
        amount: Decimal,
        user_id: i64,
    ) -> Self {
        Self {
            id: None,
            name,
            category_type,
            percentage_limit,
            amount,
            actual_amount: Decimal::ZERO,
            user_id,
            description: None,
        }
    }

    pub(crate) fn is_over_budget(&self) -> bool {
        self.actual_amount > self.amount
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub(crate) fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by ID in a slice.
    pub(crate) fn find_by_id(categories: &[Category], id: i64) -> Option<&Category> {
        categories.iter().find(|c| c.id == Some(id))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
