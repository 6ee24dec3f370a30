use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Lifecycle of a basket constituent.
///
/// - `Active`: priced, depositable and withdrawable.
/// - `PendingRemoval`: selected for retirement; only observable inside the removal dispatch.
/// - `Removed`: terminal, the asset no longer belongs to the basket.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  PartialEq,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetStatus {
  #[default]
  Active,
  PendingRemoval,
  Removed,
}

impl AssetStatus {
  pub fn is_active(&self) -> bool {
    matches!(self, AssetStatus::Active)
  }

  /// Whether `next` is a legal successor state.
  pub fn can_transition_to(&self, next: AssetStatus) -> bool {
    matches!(
      (self, next),
      (AssetStatus::Active, AssetStatus::PendingRemoval)
        | (AssetStatus::PendingRemoval, AssetStatus::Removed)
    )
  }
}
