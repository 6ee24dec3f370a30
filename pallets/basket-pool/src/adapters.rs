//! Adapter traits for the basket pool
//!
//! The pallet never prices an asset or talks to a trading venue itself. Both concerns are
//! supplied by the runtime through the traits below, keeping the pool generic over where rates
//! and liquidity come from.

use frame::prelude::*;

/// Live value-per-unit quotes.
///
/// A rate is a fixed-point value scaled by `PRECISION`. Providers are queried on every
/// valuation and their answers are never cached. Zero is a legal (degenerate) rate; an
/// unavailable quote must be reported as an error, which the pool surfaces as `InvalidRate`.
pub trait RateProvider<ProviderId, AssetId, Balance> {
  fn rate(provider: &ProviderId, asset: AssetId) -> Result<Balance, DispatchError>;
}

/// External venue operations available to removal commands.
///
/// Every call acts on behalf of `who` (the pool account during a removal) and returns the
/// amount actually produced or consumed. Implementations must move real fungible balances so
/// the pool can measure the effect of a command from its own holdings.
pub trait VenueOps<AccountId, AssetId, Balance> {
  /// Sell exactly `amount_in`, returning the amount received.
  fn swap_exact_in(
    who: &AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: Balance,
    min_out: Balance,
  ) -> Result<Balance, DispatchError>;

  /// Buy exactly `amount_out`, returning the amount spent.
  fn swap_exact_out(
    who: &AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_out: Balance,
    max_in: Balance,
  ) -> Result<Balance, DispatchError>;

  /// Single-sided deposit into a venue, returning the LP or vault tokens received.
  fn deposit(
    who: &AccountId,
    asset_in: AssetId,
    lp_asset: AssetId,
    amount_in: Balance,
    min_lp_out: Balance,
  ) -> Result<Balance, DispatchError>;

  /// Redeem venue LP or vault tokens into `asset_out`, returning the amount received.
  fn withdraw(
    who: &AccountId,
    lp_asset: AssetId,
    asset_out: AssetId,
    lp_amount: Balance,
    min_out: Balance,
  ) -> Result<Balance, DispatchError>;
}

/// No rates configured: every quote fails.
impl<ProviderId, AssetId, Balance> RateProvider<ProviderId, AssetId, Balance> for () {
  fn rate(_: &ProviderId, _: AssetId) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("RateProvider not configured"))
  }
}

/// No venue configured: only plain transfers can run during a removal.
impl<AccountId, AssetId, Balance> VenueOps<AccountId, AssetId, Balance> for () {
  fn swap_exact_in(
    _: &AccountId,
    _: AssetId,
    _: AssetId,
    _: Balance,
    _: Balance,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("VenueOps not configured"))
  }

  fn swap_exact_out(
    _: &AccountId,
    _: AssetId,
    _: AssetId,
    _: Balance,
    _: Balance,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("VenueOps not configured"))
  }

  fn deposit(
    _: &AccountId,
    _: AssetId,
    _: AssetId,
    _: Balance,
    _: Balance,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("VenueOps not configured"))
  }

  fn withdraw(
    _: &AccountId,
    _: AssetId,
    _: AssetId,
    _: Balance,
    _: Balance,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("VenueOps not configured"))
  }
}
