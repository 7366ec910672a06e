use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Parse decimal text the way the backend sends it. Anything that is not a
/// number (empty, "abc", "NaN") becomes zero.
pub(crate) fn coerce_str(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or_else(|_| {
            if !trimmed.is_empty() {
                tracing::debug!(value = trimmed, "non-numeric value coerced to 0");
            }
            Decimal::ZERO
        })
}

/// Coerce an arbitrary JSON value to a decimal. Numbers and numeric strings
/// parse; `null`, booleans, arrays, objects and junk strings become zero.
pub(crate) fn coerce_value(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => coerce_str(&n.to_string()),
        serde_json::Value::String(s) => coerce_str(s),
        serde_json::Value::Null => Decimal::ZERO,
        other => {
            tracing::debug!(value = %other, "non-numeric value coerced to 0");
            Decimal::ZERO
        }
    }
}

/// `deserialize_with` helper for amount and percentage fields. Pair it with
/// `#[serde(default)]` so a missing field also reads as zero.
pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_value).unwrap_or_default())
}
