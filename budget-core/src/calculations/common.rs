//! Currency helpers shared by the budget calculations.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// A running total left the range `Decimal` can represent.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("amount total is out of range")]
pub struct AmountOverflow;

/// Rounds a decimal value to currency precision (two places), half away from zero.
///
/// Values at exactly 0.005 round to 0.01, and -0.005 rounds to -0.01.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use budget_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(5.024)), dec!(5.02));
/// assert_eq!(round_currency(dec!(5.025)), dec!(5.03));
/// assert_eq!(round_currency(dec!(-5.025)), dec!(-5.03));
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums an iterator of amounts. An empty iterator sums to zero.
///
/// # Errors
///
/// [`AmountOverflow`] when the total does not fit in a `Decimal`.
pub fn sum_amounts<I>(amounts: I) -> Result<Decimal, AmountOverflow>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount).ok_or(AmountOverflow))
}
