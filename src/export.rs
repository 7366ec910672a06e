use anyhow::{Context, Result};
use std::io::Write;

use crate::budget::progress;
use crate::models::Category;

const CATEGORIES_HEADER: &[&str] = &[
    "id",
    "name",
    "type",
    "percentage_limit",
    "amount",
    "actual_amount",
    "progress",
    "description",
];

/// Write categories as CSV in repository order. Returns the number of rows.
pub(crate) fn write_categories_csv(categories: &[Category], writer: impl Write) -> Result<usize> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(CATEGORIES_HEADER)
        .context("CSV write error")?;

    for cat in categories {
        csv.write_record([
            cat.id.map(|id| id.to_string()).unwrap_or_default(),
            cat.name.clone(),
            cat.category_type.code().to_string(),
            cat.percentage_limit.normalize().to_string(),
            format!("{:.2}", cat.amount),
            format!("{:.2}", cat.actual_amount),
            progress(cat.amount, cat.actual_amount).to_string(),
            cat.description.clone().unwrap_or_default(),
        ])
        .context("CSV write error")?;
    }

    csv.flush().context("CSV flush error")?;
    Ok(categories.len())
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod export_tests;
