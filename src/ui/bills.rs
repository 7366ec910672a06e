use crate::models::{Bill, Category};
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render_list(bills: &[Bill], categories: &[Category], symbol: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(bills.len() + 2);
    lines.push(format!(
        "{:<5} {:<10} {:<8} {:>16}  {:<18} Description",
        "ID", "Date", "Type", "Amount", "Category"
    ));
    lines.push("─".repeat(80));
    for bill in bills {
        let cat_name = Category::find_by_id(categories, bill.category_id)
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown");
        let amount = if bill.is_expense() {
            -bill.amount
        } else {
            bill.amount
        };
        lines.push(format!(
            "{:<5} {:<10} {:<8} {:>16}  {:<18} {}",
            bill.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            bill.date,
            bill.bill_type.as_str(),
            format_amount(amount, symbol),
            truncate(cat_name, 18),
            truncate(bill.description.as_deref().unwrap_or(""), 30),
        ));
    }
    lines
}
