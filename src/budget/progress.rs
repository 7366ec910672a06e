use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Completion of a category as a whole percentage in `0..=100`.
///
/// Zero for a zero plan or nothing accrued. Otherwise
/// `round(actual_amount / amount * 100)`, rounding halves away from zero,
/// then clamped so over-spending shows as 100.
pub(crate) fn progress(amount: Decimal, actual_amount: Decimal) -> u8 {
    if amount.is_zero() || actual_amount.is_zero() {
        return 0;
    }

    let percent = actual_amount
        .checked_div(amount)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    let Some(percent) = percent else {
        // Only reachable with a tiny plan and a huge actual amount.
        return if amount.is_sign_positive() == actual_amount.is_sign_positive() {
            100
        } else {
            0
        };
    };

    percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
        .to_u8()
        .unwrap_or(0)
}
