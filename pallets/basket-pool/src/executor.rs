//! Command executor
//!
//! Interprets the command list supplied with an asset removal. Commands run strictly in order
//! with the pool account as actor; the first failure aborts the sequence with that command's
//! error. The executor never touches the registry: the pool measures the outcome afterwards
//! from the pool account's real holdings.

use crate::{Config, Error, Event, Pallet, VenueOps};
use frame::prelude::*;
use polkadot_sdk::frame_support::traits::{
  fungibles::{Inspect, Mutate},
  tokens::Preservation,
};
use primitives::Balance;

#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum AmountSpec<Balance> {
  Fixed(Balance),
  /// Everything the pool account holds of the asset when the command runs.
  AllBalance,
  Percentage(Permill),
}

#[derive(
  Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
)]
pub enum Command<AccountId, AssetId, Balance> {
  Transfer {
    to: AccountId,
    asset: AssetId,
    amount: AmountSpec<Balance>,
  },
  SwapExactIn {
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: AmountSpec<Balance>,
    min_out: Balance,
  },
  SwapExactOut {
    asset_in: AssetId,
    asset_out: AssetId,
    amount_out: Balance,
    max_in: Balance,
  },
  Deposit {
    asset_in: AssetId,
    lp_asset: AssetId,
    amount_in: AmountSpec<Balance>,
    min_lp_out: Balance,
  },
  Withdraw {
    lp_asset: AssetId,
    asset_out: AssetId,
    lp_amount: AmountSpec<Balance>,
    min_out: Balance,
  },
}

pub type CommandOf<T> =
  Command<<T as frame_system::Config>::AccountId, <T as Config>::AssetId, Balance>;

/// What a single command moved: `(asset_in, amount_in, asset_out, amount_out)`.
type Movement<AssetId> = (AssetId, Balance, Option<AssetId>, Balance);

impl<T: Config> Pallet<T> {
  pub(crate) fn execute_commands(actor: &T::AccountId, commands: &[CommandOf<T>]) -> DispatchResult {
    for (step, command) in commands.iter().enumerate() {
      let (asset_in, amount_in, asset_out, amount_out) = Self::execute_command(actor, command)?;
      log::debug!(
        target: crate::LOG_TARGET,
        "removal command {} moved {} in, {} out",
        step,
        amount_in,
        amount_out,
      );
      Self::deposit_event(Event::CommandExecuted {
        step: step as u32,
        asset_in,
        amount_in,
        asset_out,
        amount_out,
      });
    }
    Ok(())
  }

  fn execute_command(
    actor: &T::AccountId,
    command: &CommandOf<T>,
  ) -> Result<Movement<T::AssetId>, DispatchError> {
    match command {
      Command::Transfer { to, asset, amount } => {
        let resolved = Self::resolve_amount(amount, *asset, actor)?;
        T::Assets::transfer(*asset, actor, to, resolved, Preservation::Expendable)?;
        Ok((*asset, resolved, None, 0))
      }
      Command::SwapExactIn {
        asset_in,
        asset_out,
        amount_in,
        min_out,
      } => {
        let resolved_in = Self::resolve_amount(amount_in, *asset_in, actor)?;
        let received =
          T::Venues::swap_exact_in(actor, *asset_in, *asset_out, resolved_in, *min_out)?;
        Ok((*asset_in, resolved_in, Some(*asset_out), received))
      }
      Command::SwapExactOut {
        asset_in,
        asset_out,
        amount_out,
        max_in,
      } => {
        ensure!(*amount_out > 0, Error::<T>::AmountZero);
        let spent = T::Venues::swap_exact_out(actor, *asset_in, *asset_out, *amount_out, *max_in)?;
        Ok((*asset_in, spent, Some(*asset_out), *amount_out))
      }
      Command::Deposit {
        asset_in,
        lp_asset,
        amount_in,
        min_lp_out,
      } => {
        let resolved_in = Self::resolve_amount(amount_in, *asset_in, actor)?;
        let minted = T::Venues::deposit(actor, *asset_in, *lp_asset, resolved_in, *min_lp_out)?;
        Ok((*asset_in, resolved_in, Some(*lp_asset), minted))
      }
      Command::Withdraw {
        lp_asset,
        asset_out,
        lp_amount,
        min_out,
      } => {
        let resolved_lp = Self::resolve_amount(lp_amount, *lp_asset, actor)?;
        let received = T::Venues::withdraw(actor, *lp_asset, *asset_out, resolved_lp, *min_out)?;
        Ok((*lp_asset, resolved_lp, Some(*asset_out), received))
      }
    }
  }

  fn resolve_amount(
    spec: &AmountSpec<Balance>,
    asset: T::AssetId,
    who: &T::AccountId,
  ) -> Result<Balance, DispatchError> {
    let holding = T::Assets::balance(asset, who);
    let resolved = match spec {
      AmountSpec::Fixed(amount) => *amount,
      AmountSpec::AllBalance => holding,
      AmountSpec::Percentage(pct) => pct.mul_floor(holding),
    };
    ensure!(resolved != 0, Error::<T>::AmountZero);
    Ok(resolved)
  }
}
