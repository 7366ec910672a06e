use rust_decimal::Decimal;

/// Format a decimal amount with thousand separators and 2 decimal places,
/// prefixed by `symbol`.
/// e.g. `1234567.89` → `"$1,234,567.89"`
pub(crate) fn format_amount(val: Decimal, symbol: &str) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val < Decimal::ZERO {
        format!("-{symbol}{with_commas}.{dec_part}")
    } else {
        format!("{symbol}{with_commas}.{dec_part}")
    }
}

/// Percentage without trailing zeros: `25.50` → `"25.5%"`.
pub(crate) fn format_percent(val: Decimal) -> String {
    format!("{}%", val.normalize())
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// Text progress bar for a 0-100 completion value.
pub(crate) fn progress_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * width / 100;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
