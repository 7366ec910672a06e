use rust_decimal::Decimal;
use thiserror::Error;

use super::allocation::{check_allocation, AllocationError, FULL_ALLOCATION};
use crate::models::{Category, CategoryType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum DraftError {
    #[error("category name cannot be empty")]
    EmptyName,
    #[error("percentage limit must be between 0 and 100, got {0}")]
    PercentageOutOfRange(Decimal),
    #[error("{field} cannot be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// What the create/edit category form collects before submitting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryDraft {
    pub(crate) name: String,
    pub(crate) category_type: CategoryType,
    pub(crate) percentage_limit: Decimal,
    pub(crate) amount: Decimal,
    pub(crate) actual_amount: Decimal,
    pub(crate) description: Option<String>,
}

impl CategoryDraft {
    pub(crate) fn new(
        name: String,
        category_type: CategoryType,
        percentage_limit: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            name,
            category_type,
            percentage_limit,
            amount,
            actual_amount: Decimal::ZERO,
            description: None,
        }
    }

    /// Pre-fill the edit form from an existing category.
    pub(crate) fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            category_type: category.category_type,
            percentage_limit: category.percentage_limit,
            amount: category.amount,
            actual_amount: category.actual_amount,
            description: category.description.clone(),
        }
    }

    /// Check the draft against the user's current categories. `editing_id`
    /// is the id of the category being edited, `None` when creating.
    pub(crate) fn validate(
        &self,
        snapshot: &[Category],
        editing_id: Option<i64>,
    ) -> Result<(), DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::EmptyName);
        }
        if self.percentage_limit < Decimal::ZERO || self.percentage_limit > FULL_ALLOCATION {
            return Err(DraftError::PercentageOutOfRange(self.percentage_limit));
        }
        for (field, value) in [("amount", self.amount), ("actual amount", self.actual_amount)] {
            if value < Decimal::ZERO {
                return Err(DraftError::NegativeAmount { field, value });
            }
        }
        check_allocation(
            snapshot,
            self.category_type,
            self.percentage_limit,
            editing_id,
        )?;
        Ok(())
    }

    /// Validate and turn the draft into a category owned by `user_id`.
    pub(crate) fn build(
        self,
        snapshot: &[Category],
        user_id: i64,
        editing_id: Option<i64>,
    ) -> Result<Category, DraftError> {
        self.validate(snapshot, editing_id)?;
        let description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(Category {
            id: editing_id,
            name: self.name.trim().to_string(),
            category_type: self.category_type,
            percentage_limit: self.percentage_limit,
            amount: self.amount,
            actual_amount: self.actual_amount,
            user_id,
            description,
        })
    }
}
