use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::numeric::lenient_decimal;
use super::CategoryType;

/// Bill dates travel as `dd-MM-yyyy`.
pub(crate) const BILL_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Bill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i64>,
    #[serde(rename = "type")]
    pub(crate) bill_type: CategoryType,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub(crate) amount: Decimal,
    /// Format: "dd-MM-yyyy"
    pub(crate) date: String,
    pub(crate) category_id: i64,
    #[serde(rename = "userId")]
    pub(crate) user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

impl Bill {
    pub(crate) fn new(
        bill_type: CategoryType,
        amount: Decimal,
        date: NaiveDate,
        category_id: i64,
        user_id: i64,
    ) -> Self {
        Self {
            id: None,
            bill_type,
            amount,
            date: date.format(BILL_DATE_FORMAT).to_string(),
            category_id,
            user_id,
            description: None,
        }
    }

    pub(crate) fn is_income(&self) -> bool {
        self.bill_type == CategoryType::Income
    }

    pub(crate) fn is_expense(&self) -> bool {
        self.bill_type == CategoryType::Expense
    }

    pub(crate) fn parsed_date(&self) -> Option<NaiveDate> {
        parse_bill_date(&self.date)
    }
}

/// Parse a bill date typed as `dd-mm-yyyy` or `dd/mm/yyyy`.
pub(crate) fn parse_bill_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, BILL_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}
