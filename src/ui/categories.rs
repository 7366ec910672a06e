use rust_decimal::Decimal;

use crate::budget::{progress, AllocationSummary};
use crate::models::{Category, CategoryType};
use crate::ui::util::{format_amount, format_percent, progress_bar, truncate};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum TypeFilter {
    #[default]
    All,
    Only(CategoryType),
}

impl TypeFilter {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        CategoryType::parse(s).map(Self::Only)
    }

    pub(crate) fn matches(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => category.category_type == *t,
        }
    }
}

/// Ordering by planned amount. `Default` keeps the backend's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum AmountSort {
    #[default]
    Default,
    Asc,
    Desc,
}

impl AmountSort {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" | "none" => Some(Self::Default),
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

pub(crate) fn select(
    categories: &[Category],
    filter: TypeFilter,
    sort: AmountSort,
) -> Vec<&Category> {
    let mut selected: Vec<&Category> = categories
        .iter()
        .filter(|c| filter.matches(c))
        .collect();
    match sort {
        AmountSort::Default => {}
        AmountSort::Asc => selected.sort_by(|a, b| a.amount.cmp(&b.amount)),
        AmountSort::Desc => selected.sort_by(|a, b| b.amount.cmp(&a.amount)),
    }
    selected
}

/// One table row per category with its progress bar.
pub(crate) fn render_list(categories: &[&Category], symbol: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(categories.len() + 2);
    lines.push(format!(
        "{:<4} {:<18} {:<8} {:>7} {:>16} {:>16}  Progress",
        "ID", "Name", "Type", "Limit", "Planned", "Actual"
    ));
    lines.push("─".repeat(100));
    for cat in categories {
        let pct = progress(cat.amount, cat.actual_amount);
        let marker = if cat.is_over_budget() { " over" } else { "" };
        lines.push(format!(
            "{:<4} {:<18} {:<8} {:>7} {:>16} {:>16}  {} {:>3}%{marker}",
            cat.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            truncate(&cat.name, 18),
            cat.category_type.as_str(),
            format_percent(cat.percentage_limit),
            format_amount(cat.amount, symbol),
            format_amount(cat.actual_amount, symbol),
            progress_bar(pct, BAR_WIDTH),
            pct,
        ));
    }
    lines
}

/// Per-type allocation lines for the summary view.
pub(crate) fn render_summary(summary: &AllocationSummary) -> Vec<String> {
    CategoryType::all()
        .iter()
        .map(|t| {
            let total = summary.total(*t);
            let state = if total > Decimal::ONE_HUNDRED {
                "over-allocated"
            } else if summary.can_add(*t) {
                "open"
            } else {
                "full"
            };
            format!(
                "  {:<8} {:>7} allocated  {:>7} free  ({state})",
                t.as_str(),
                format_percent(total),
                format_percent(summary.remaining(*t)),
            )
        })
        .collect()
}
