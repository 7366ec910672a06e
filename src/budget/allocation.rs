use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Category, CategoryType};

/// Same-type percentage limits may add up to this much and no more.
pub(crate) const FULL_ALLOCATION: Decimal = Decimal::ONE_HUNDRED;

/// Sum of `percentage_limit` over every category of `category_type`.
///
/// Negative limits contribute nothing, so the total is never below zero. The
/// total is not capped: inconsistent data can report more than 100.
pub(crate) fn total_allocated(categories: &[Category], category_type: CategoryType) -> Decimal {
    sum_limits(categories.iter(), category_type)
}

/// Like [`total_allocated`], skipping the category whose id is `exclude_id`.
/// An edit form passes the edited category's id here so its previous share
/// is not counted twice.
pub(crate) fn total_allocated_excluding(
    categories: &[Category],
    category_type: CategoryType,
    exclude_id: Option<i64>,
) -> Decimal {
    match exclude_id {
        Some(id) => sum_limits(
            categories.iter().filter(|c| c.id != Some(id)),
            category_type,
        ),
        None => total_allocated(categories, category_type),
    }
}

fn sum_limits<'a>(
    categories: impl Iterator<Item = &'a Category>,
    category_type: CategoryType,
) -> Decimal {
    categories
        .filter(|c| c.category_type == category_type)
        .map(|c| c.percentage_limit.max(Decimal::ZERO))
        .fold(Decimal::ZERO, |acc, limit| acc.saturating_add(limit))
}

/// True iff `current_total + proposed_delta` stays within 100%.
pub(crate) fn can_allocate(current_total: Decimal, proposed_delta: Decimal) -> bool {
    current_total
        .checked_add(proposed_delta)
        .is_some_and(|total| total <= FULL_ALLOCATION)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AllocationError {
    #[error(
        "{category_type} categories already use {allocated}% of the budget; \
         {requested}% more would exceed 100% (at most {available}% is free)"
    )]
    OverAllocated {
        category_type: CategoryType,
        allocated: Decimal,
        requested: Decimal,
        available: Decimal,
    },
}

/// Gate for a new or edited category's percentage. `editing_id` is the id of
/// the category being edited, if any.
pub(crate) fn check_allocation(
    categories: &[Category],
    category_type: CategoryType,
    percentage: Decimal,
    editing_id: Option<i64>,
) -> Result<(), AllocationError> {
    let allocated = total_allocated_excluding(categories, category_type, editing_id);
    if can_allocate(allocated, percentage) {
        return Ok(());
    }
    tracing::debug!(
        %category_type,
        %allocated,
        %percentage,
        "allocation rejected"
    );
    Err(AllocationError::OverAllocated {
        category_type,
        allocated: allocated.normalize(),
        requested: percentage.normalize(),
        available: remaining(allocated).normalize(),
    })
}

fn remaining(allocated: Decimal) -> Decimal {
    (FULL_ALLOCATION - allocated.min(FULL_ALLOCATION)).max(Decimal::ZERO)
}

/// Per-type totals for one user's category snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct AllocationSummary {
    pub(crate) income: Decimal,
    pub(crate) expense: Decimal,
}

impl AllocationSummary {
    pub(crate) fn from_categories(categories: &[Category]) -> Self {
        Self {
            income: total_allocated(categories, CategoryType::Income),
            expense: total_allocated(categories, CategoryType::Expense),
        }
    }

    pub(crate) fn total(&self, category_type: CategoryType) -> Decimal {
        match category_type {
            CategoryType::Income => self.income,
            CategoryType::Expense => self.expense,
        }
    }

    /// Percentage still free for `category_type`, floored at zero.
    pub(crate) fn remaining(&self, category_type: CategoryType) -> Decimal {
        remaining(self.total(category_type))
    }

    /// Whether another category of this type can still claim a share.
    pub(crate) fn can_add(&self, category_type: CategoryType) -> bool {
        self.total(category_type) < FULL_ALLOCATION
    }
}
