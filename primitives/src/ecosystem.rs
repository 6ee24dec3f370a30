//! Basket Pool Constants
//!
//! System-level constants shared by the pool pallet and the runtimes hosting it: pallet IDs,
//! fixed-point precision and the default limits a runtime is expected to configure.

/// Balance type alias for consistency across the workspace
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
///
/// Used with `PalletId::into_account_truncating()` to derive the account that custodies
/// basket tokens.
pub mod pallet_ids {
  /// Basket pool custody account
  pub const BASKET_POOL_PALLET_ID: &[u8; 8] = b"py/bskpl";
}

/// Fixed-point parameters and default limits.
pub mod params {
  use super::Balance;

  /// Fixed-point scale (18 decimals).
  ///
  /// Asset weights are fractions of `PRECISION` and rate providers quote value-per-unit
  /// scaled by it, so `balance * rate / PRECISION` is a value in the accounting unit.
  pub const PRECISION: Balance = 1_000_000_000_000_000_000;

  /// Default upper bound on basket constituents.
  pub const MAX_BASKET_ASSETS: u32 = 16;

  /// Default upper bound on commands supplied to a single asset removal.
  pub const MAX_REMOVAL_COMMANDS: u32 = 32;

  /// Default tolerated value loss while liquidating a removed asset, in parts per million
  /// of the pre-removal pool value (0.5%).
  pub const REMOVAL_TOLERANCE_PPM: u32 = 5_000;
}
