//! Invariant engine.
//!
//! Pure fixed-point arithmetic behind every pricing decision of the pool. Nothing here reads
//! storage or queries rate providers: callers gather `(balance, rate)` pairs first and hand
//! them in, so the same inputs always yield the same outputs.
//!
//! All products are formed in 256-bit space before the single division, and any result that
//! does not fit a [`Balance`] is reported as [`ArithmeticError::Overflow`] instead of wrapping.

use alloc::vec::Vec;
use polkadot_sdk::{
  sp_core::U256,
  sp_runtime::{ArithmeticError, PerThing, Permill},
};
use primitives::{Balance, params::PRECISION};

/// Aggregate value `Σ balance_i * rate_i / PRECISION` of a set of holdings.
///
/// Products are accumulated before dividing once, so the result does not depend on the
/// iteration order of `terms`.
pub fn pool_value<I>(terms: I) -> Result<Balance, ArithmeticError>
where
  I: IntoIterator<Item = (Balance, Balance)>,
{
  let mut acc = U256::zero();
  for (balance, rate) in terms {
    let term = U256::from(balance)
      .checked_mul(U256::from(rate))
      .ok_or(ArithmeticError::Overflow)?;
    acc = acc.checked_add(term).ok_or(ArithmeticError::Overflow)?;
  }
  to_balance(acc / U256::from(PRECISION))
}

/// `a * b / c`, rounded down.
pub fn mul_div(a: Balance, b: Balance, c: Balance) -> Result<Balance, ArithmeticError> {
  if c == 0 {
    return Err(ArithmeticError::DivisionByZero);
  }
  // u128 * u128 always fits in 256 bits
  to_balance(U256::from(a).saturating_mul(U256::from(b)) / U256::from(c))
}

/// Shares owed for a deposit that moved the pool value from `value_before` to `value_after`.
///
/// An empty pool mints the deposited value one-to-one; holdings left without shares do not
/// count towards the mint. Otherwise the mint is the same fraction of the outstanding supply
/// as the deposit is of the prior value.
pub fn shares_for_deposit(
  total_shares: Balance,
  value_before: Balance,
  value_after: Balance,
) -> Result<Balance, ArithmeticError> {
  let gained = value_after
    .checked_sub(value_before)
    .ok_or(ArithmeticError::Underflow)?;
  if total_shares == 0 {
    return Ok(gained);
  }
  mul_div(total_shares, gained, value_before)
}

/// Units of one asset paid out for burning `shares_in` of `total_shares`.
pub fn payout_for_shares(
  balance: Balance,
  shares_in: Balance,
  total_shares: Balance,
) -> Result<Balance, ArithmeticError> {
  mul_div(balance, shares_in, total_shares)
}

/// Whether a weight table is acceptable for a basket: non-empty, no zero entry and an exact
/// sum of [`PRECISION`].
pub fn weights_are_valid(weights: &[Balance]) -> bool {
  if weights.is_empty() || weights.iter().any(|w| *w == 0) {
    return false;
  }
  weights
    .iter()
    .try_fold(0u128, |acc, w| acc.checked_add(*w))
    .is_some_and(|sum| sum == PRECISION)
}

/// Weights of the survivors once the entry at `removed` leaves the basket.
///
/// The departing weight is spread over the survivors in proportion to their own weights.
/// Floor rounding leaves a few units of dust, which are credited to the heaviest survivor
/// (lowest position on ties) so the result sums to exactly [`PRECISION`]. The returned vector
/// keeps the survivors' relative order.
pub fn renormalize_weights(
  weights: &[Balance],
  removed: usize,
) -> Result<Vec<Balance>, ArithmeticError> {
  let survivors: Vec<Balance> = weights
    .iter()
    .enumerate()
    .filter(|(index, _)| *index != removed)
    .map(|(_, weight)| *weight)
    .collect();
  let survivor_total = survivors
    .iter()
    .try_fold(0u128, |acc, w| acc.checked_add(*w))
    .ok_or(ArithmeticError::Overflow)?;

  let mut renormalized = survivors
    .iter()
    .map(|weight| mul_div(*weight, PRECISION, survivor_total))
    .collect::<Result<Vec<_>, _>>()?;

  let assigned = renormalized
    .iter()
    .try_fold(0u128, |acc, w| acc.checked_add(*w))
    .ok_or(ArithmeticError::Overflow)?;
  let dust = PRECISION
    .checked_sub(assigned)
    .ok_or(ArithmeticError::Underflow)?;

  let mut heaviest = 0usize;
  for (position, weight) in survivors.iter().enumerate() {
    if *weight > survivors[heaviest] {
      heaviest = position;
    }
  }
  if let Some(slot) = renormalized.get_mut(heaviest) {
    *slot = slot.checked_add(dust).ok_or(ArithmeticError::Overflow)?;
  }

  Ok(renormalized)
}

/// Lowest post-removal value accepted when `tolerance` of `value_before` may be lost.
pub fn min_value_after_removal(value_before: Balance, tolerance: Permill) -> Balance {
  value_before.saturating_sub(tolerance.mul_floor(value_before))
}

fn to_balance(value: U256) -> Result<Balance, ArithmeticError> {
  if value > U256::from(Balance::MAX) {
    return Err(ArithmeticError::Overflow);
  }
  Ok(value.as_u128())
}
