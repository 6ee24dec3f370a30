//! Basket Pool Pallet
//!
//! Multi-asset liquidity pool whose constituents are valued through external rate providers.
//!
//! Liquidity providers deposit any mix of the basket's assets and receive pool shares in
//! proportion to the value they add; burning shares pays out the same fraction of every
//! holding. A designated operator can retire a constituent by supplying an ordered list of
//! commands (venue swaps, deposits, withdrawals, transfers) that liquidates it into the rest of
//! the basket. The removal only commits when the departing balance is fully cleared and the
//! pool did not lose more than the configured tolerance of its value; the surviving weights are
//! then renormalized proportionally.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{RateProvider, VenueOps};

pub mod executor;
pub use executor::{AmountSpec, Command, CommandOf};

pub mod invariant;

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

/// Runtime-side fixtures the benchmarks need to build a basket.
#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AssetId, ProviderId> {
  /// Existing, mintable asset for basket slot `index`.
  fn basket_asset(index: u32) -> AssetId;
  /// Existing, mintable asset used as the pool share token.
  fn share_asset() -> AssetId;
  /// Rate provider quoting a non-zero rate for `basket_asset(index)`.
  fn provider(index: u32) -> ProviderId;
}

pub(crate) const LOG_TARGET: &str = "runtime::basket-pool";

#[frame::pallet]
pub mod pallet {
  use super::{CommandOf, LOG_TARGET, RateProvider, VenueOps, WeightInfo, invariant};
  use alloc::vec::Vec;
  use frame::prelude::*;
  use polkadot_sdk::{
    frame_support::{
      PalletId,
      storage::with_storage_layer,
      traits::{
        EnsureOrigin,
        fungibles::{Inspect, Mutate},
        tokens::{Fortitude, Precision, Preservation},
      },
    },
    sp_runtime::traits::AccountIdConversion,
  };
  use primitives::{AssetStatus, Balance};

  /// One basket constituent.
  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct AssetEntry<AssetId, ProviderId> {
    pub asset: AssetId,
    pub provider: ProviderId,
    /// Fraction of `PRECISION`.
    pub weight: Balance,
    /// Units attributed to the pool by its own accounting.
    pub balance: Balance,
    pub status: AssetStatus,
  }

  #[derive(
    Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen,
  )]
  pub struct PoolInfo<AccountId, AssetId> {
    pub share_asset: AssetId,
    /// Minimum value the first deposit into an empty pool must reach.
    pub initial_invariant_target: Balance,
    pub operator: AccountId,
  }

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
  pub struct RetirementRecord<BlockNumber> {
    pub former_weight: Balance,
    pub retired_at: BlockNumber,
  }

  pub type AssetEntryOf<T> = AssetEntry<<T as Config>::AssetId, <T as Config>::ProviderId>;
  pub type PoolInfoOf<T> = PoolInfo<<T as frame_system::Config>::AccountId, <T as Config>::AssetId>;
  pub type RegistryOf<T> = BoundedVec<AssetEntryOf<T>, <T as Config>::MaxAssets>;

  /// Genesis basket: `(share_asset, initial_invariant_target, [(asset, provider, weight)], operator)`.
  pub type GenesisPoolOf<T> = (
    <T as Config>::AssetId,
    Balance,
    Vec<(<T as Config>::AssetId, <T as Config>::ProviderId, Balance)>,
    <T as frame_system::Config>::AccountId,
  );

  #[pallet::config]
  pub trait Config: frame_system::Config {
    type AssetId: Parameter + Member + Copy + Ord + MaybeSerializeDeserialize + MaxEncodedLen;

    type ProviderId: Parameter + Member + MaybeSerializeDeserialize + MaxEncodedLen;

    /// Fungible ledger holding basket tokens and pool shares
    type Assets: Inspect<Self::AccountId, AssetId = Self::AssetId, Balance = Balance>
      + Mutate<Self::AccountId>;

    type RateProvider: RateProvider<Self::ProviderId, Self::AssetId, Balance>;

    /// Venues reachable from removal commands
    type Venues: VenueOps<Self::AccountId, Self::AssetId, Balance>;

    /// Pallet ID for custody account derivation
    #[pallet::constant]
    type PalletId: Get<PalletId>;

    /// Origin allowed to initialize the pool
    type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

    #[pallet::constant]
    type MaxAssets: Get<u32>;

    #[pallet::constant]
    type MaxCommands: Get<u32>;

    /// Share of the pre-removal pool value a removal may lose to fees and slippage
    #[pallet::constant]
    type RemovalTolerance: Get<Permill>;

    type WeightInfo: WeightInfo;

    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AssetId, Self::ProviderId>;
  }

  #[pallet::pallet]
  pub struct Pallet<T>(PhantomData<T>);

  /// Pool parameters, `None` until initialized
  #[pallet::storage]
  pub type Pool<T: Config> = StorageValue<_, PoolInfoOf<T>, OptionQuery>;

  /// Ordered basket constituents
  ///
  /// Active weights sum to exactly `PRECISION` between dispatches.
  #[pallet::storage]
  pub type Registry<T: Config> = StorageValue<_, RegistryOf<T>, ValueQuery>;

  /// Outstanding pool shares
  #[pallet::storage]
  pub type TotalShares<T: Config> = StorageValue<_, Balance, ValueQuery>;

  /// Set while a liquidity or removal dispatch is running
  #[pallet::storage]
  pub type ExecutionLock<T: Config> = StorageValue<_, bool, ValueQuery>;

  /// Assets that went through a completed removal
  #[pallet::storage]
  pub type RetiredAssets<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AssetId, RetirementRecord<BlockNumberFor<T>>, OptionQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Basket configured with its initial `(asset, weight)` table
    PoolInitialized {
      share_asset: T::AssetId,
      operator: T::AccountId,
      weights: Vec<(T::AssetId, Balance)>,
    },
    LiquidityAdded {
      who: T::AccountId,
      recipient: T::AccountId,
      amounts: Vec<Balance>,
      shares_minted: Balance,
      value_before: Balance,
      value_after: Balance,
    },
    LiquidityRemoved {
      who: T::AccountId,
      shares_burned: Balance,
      amounts: Vec<Balance>,
    },
    /// One removal command ran; `asset_out` is `None` for plain transfers
    CommandExecuted {
      step: u32,
      asset_in: T::AssetId,
      amount_in: Balance,
      asset_out: Option<T::AssetId>,
      amount_out: Balance,
    },
    /// Asset retired; `weights` is the resulting table of the survivors
    AssetRemoved {
      asset: T::AssetId,
      value_before: Balance,
      value_after: Balance,
      weights: Vec<(T::AssetId, Balance)>,
    },
    OperatorTransferred {
      old: T::AccountId,
      new: T::AccountId,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Invalid basket configuration (lengths, duplicates, limits or weights)
    ConfigurationError,
    AlreadyInitialized,
    NotInitialized,
    /// Amount list does not match the number of basket assets
    AmountsLengthMismatch,
    /// Every deposit amount is zero
    NothingToDeposit,
    /// First deposit is worth less than the initial invariant target
    BootstrapBelowTarget,
    /// Deposit is worth zero shares
    ZeroSharesMinted,
    /// Fewer shares minted than the caller accepted
    SlippageExceeded,
    /// Attempted to burn zero shares
    ZeroShares,
    /// Caller holds fewer shares than requested
    InsufficientShares,
    /// A payout is below the caller's minimum
    InsufficientOutput,
    /// The pool cannot honour the withdrawal
    InsolventWithdrawal,
    /// A rate provider failed to quote
    InvalidRate,
    /// Pool value is zero while shares are outstanding
    ZeroPoolValue,
    ArithmeticOverflow,
    /// Nested entry into a locked dispatch
    ReentrancyBlocked,
    NotOperator,
    InvalidAssetIndex,
    AssetNotActive,
    CannotRemoveLastAsset,
    /// Departing asset still has an accounted balance after the commands
    ResidualBalance,
    /// Removal lost more value than the configured tolerance
    ValueLeakage,
    /// An accounted balance would become negative
    InvariantViolation,
    /// A command amount resolved to zero
    AmountZero,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Configure the basket
    ///
    /// `assets`, `providers` and `weights` are parallel lists. Weights are fractions of
    /// `PRECISION` and must sum to it exactly.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::initialize(assets.len() as u32))]
    pub fn initialize(
      origin: OriginFor<T>,
      share_asset: T::AssetId,
      initial_invariant_target: Balance,
      assets: Vec<T::AssetId>,
      providers: Vec<T::ProviderId>,
      weights: Vec<Balance>,
      operator: T::AccountId,
    ) -> DispatchResult {
      T::AdminOrigin::ensure_origin(origin)?;
      Self::do_initialize(
        share_asset,
        initial_invariant_target,
        assets,
        providers,
        weights,
        operator,
      )
    }

    /// Deposit basket assets for pool shares
    ///
    /// `amounts` is parallel to the registry; zero entries are skipped.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::add_liquidity(amounts.len() as u32))]
    pub fn add_liquidity(
      origin: OriginFor<T>,
      amounts: Vec<Balance>,
      min_shares_out: Balance,
      recipient: T::AccountId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::with_execution_lock(|| {
        Self::do_add_liquidity(&who, &amounts, min_shares_out, &recipient)
      })
    }

    /// Burn pool shares for a proportional slice of every holding
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::remove_liquidity(min_amounts_out.len() as u32))]
    pub fn remove_liquidity(
      origin: OriginFor<T>,
      shares_in: Balance,
      min_amounts_out: Vec<Balance>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::with_execution_lock(|| Self::do_remove_liquidity(&who, shares_in, &min_amounts_out))
    }

    /// Retire the asset at `asset_index`, liquidating it with `commands`
    ///
    /// Runs the commands as the pool account, then checks that the departing balance is gone
    /// and that the pool kept its value within `RemovalTolerance`. Any failure reverts the
    /// whole call.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::remove_token(T::MaxAssets::get(), commands.len() as u32))]
    pub fn remove_token(
      origin: OriginFor<T>,
      asset_index: u32,
      commands: BoundedVec<CommandOf<T>, T::MaxCommands>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_operator(&who)?;
      Self::with_execution_lock(|| Self::do_remove_token(asset_index, &commands))
    }

    /// Hand the operator role to `new_operator`
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::transfer_operator())]
    pub fn transfer_operator(origin: OriginFor<T>, new_operator: T::AccountId) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::ensure_operator(&who)?;

      Pool::<T>::try_mutate(|maybe_pool| -> DispatchResult {
        let pool = maybe_pool.as_mut().ok_or(Error::<T>::NotInitialized)?;
        pool.operator = new_operator.clone();
        Ok(())
      })?;

      log::debug!(target: LOG_TARGET, "operator handed over to {:?}", new_operator);
      Self::deposit_event(Event::OperatorTransferred {
        old: who,
        new: new_operator,
      });

      Ok(())
    }
  }

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), polkadot_sdk::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  impl<T: Config> Pallet<T> {
    /// Custody account of the basket (derived from PalletId)
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Current pool value at live rates
    pub fn pool_value() -> Result<Balance, DispatchError> {
      let registry = Registry::<T>::get();
      let rates = Self::live_rates(&registry)?;
      Self::value_of(&registry, &rates)
    }

    /// Shares `add_liquidity(amounts, ..)` would mint right now
    pub fn quote_add_liquidity(amounts: &[Balance]) -> Result<Balance, DispatchError> {
      let pool = Pool::<T>::get().ok_or(Error::<T>::NotInitialized)?;
      let mut registry = Registry::<T>::get();
      let (minted, _, _) = Self::price_deposit(&pool, &mut registry, amounts)?;
      Ok(minted)
    }

    /// Per-asset payouts `remove_liquidity(shares_in, ..)` would make right now
    pub fn quote_remove_liquidity(shares_in: Balance) -> Result<Vec<Balance>, DispatchError> {
      ensure!(Pool::<T>::exists(), Error::<T>::NotInitialized);
      ensure!(shares_in > 0, Error::<T>::ZeroShares);
      let total = TotalShares::<T>::get();
      ensure!(shares_in <= total, Error::<T>::InsolventWithdrawal);
      Self::payouts_for(&Registry::<T>::get(), shares_in, total)
    }

    /// Lifecycle state of `asset`, `None` if it never belonged to the basket
    pub fn asset_status(asset: T::AssetId) -> Option<AssetStatus> {
      Registry::<T>::get()
        .iter()
        .find(|entry| entry.asset == asset)
        .map(|entry| entry.status)
        .or_else(|| RetiredAssets::<T>::contains_key(asset).then_some(AssetStatus::Removed))
    }

    pub(crate) fn do_initialize(
      share_asset: T::AssetId,
      initial_invariant_target: Balance,
      assets: Vec<T::AssetId>,
      providers: Vec<T::ProviderId>,
      weights: Vec<Balance>,
      operator: T::AccountId,
    ) -> DispatchResult {
      ensure!(!Pool::<T>::exists(), Error::<T>::AlreadyInitialized);
      ensure!(
        !assets.is_empty() && assets.len() == providers.len() && assets.len() == weights.len(),
        Error::<T>::ConfigurationError
      );
      ensure!(
        !assets.contains(&share_asset),
        Error::<T>::ConfigurationError
      );
      let mut distinct = assets.clone();
      distinct.sort();
      distinct.dedup();
      ensure!(
        distinct.len() == assets.len(),
        Error::<T>::ConfigurationError
      );
      ensure!(
        invariant::weights_are_valid(&weights),
        Error::<T>::ConfigurationError
      );

      let entries: Vec<AssetEntryOf<T>> = assets
        .into_iter()
        .zip(providers)
        .zip(weights)
        .map(|((asset, provider), weight)| AssetEntry {
          asset,
          provider,
          weight,
          balance: 0,
          status: AssetStatus::Active,
        })
        .collect();
      let registry: RegistryOf<T> = entries
        .try_into()
        .map_err(|_| Error::<T>::ConfigurationError)?;

      // Pool account survives holding only non-sufficient assets via provider reference
      frame_system::Pallet::<T>::inc_providers(&Self::account_id());

      Pool::<T>::put(PoolInfo {
        share_asset,
        initial_invariant_target,
        operator: operator.clone(),
      });
      let weights = Self::weight_table(&registry);
      Registry::<T>::put(registry);

      log::debug!(
        target: LOG_TARGET,
        "basket initialized with {} assets, target {}",
        weights.len(),
        initial_invariant_target,
      );
      Self::deposit_event(Event::PoolInitialized {
        share_asset,
        operator,
        weights,
      });

      Ok(())
    }

    fn do_add_liquidity(
      who: &T::AccountId,
      amounts: &[Balance],
      min_shares_out: Balance,
      recipient: &T::AccountId,
    ) -> DispatchResult {
      let pool = Pool::<T>::get().ok_or(Error::<T>::NotInitialized)?;
      let mut registry = Registry::<T>::get();
      let (minted, value_before, value_after) = Self::price_deposit(&pool, &mut registry, amounts)?;
      ensure!(minted >= min_shares_out, Error::<T>::SlippageExceeded);

      let pool_account = Self::account_id();
      for (entry, amount) in registry.iter().zip(amounts.iter()) {
        if *amount > 0 {
          T::Assets::transfer(
            entry.asset,
            who,
            &pool_account,
            *amount,
            Preservation::Expendable,
          )?;
        }
      }
      T::Assets::mint_into(pool.share_asset, recipient, minted)?;

      let total = TotalShares::<T>::get()
        .checked_add(minted)
        .ok_or(Error::<T>::ArithmeticOverflow)?;
      TotalShares::<T>::put(total);
      Registry::<T>::put(registry);

      log::debug!(
        target: LOG_TARGET,
        "minted {} shares, pool value {} -> {}",
        minted,
        value_before,
        value_after,
      );
      Self::deposit_event(Event::LiquidityAdded {
        who: who.clone(),
        recipient: recipient.clone(),
        amounts: amounts.to_vec(),
        shares_minted: minted,
        value_before,
        value_after,
      });

      Ok(())
    }

    /// Applies `amounts` to `registry` in memory and returns
    /// `(shares_minted, value_before, value_after)`.
    fn price_deposit(
      pool: &PoolInfoOf<T>,
      registry: &mut RegistryOf<T>,
      amounts: &[Balance],
    ) -> Result<(Balance, Balance, Balance), DispatchError> {
      ensure!(
        amounts.len() == registry.len(),
        Error::<T>::AmountsLengthMismatch
      );
      ensure!(
        amounts.iter().any(|amount| *amount > 0),
        Error::<T>::NothingToDeposit
      );

      let rates = Self::live_rates(registry)?;
      let value_before = Self::value_of(registry, &rates)?;
      for (entry, amount) in registry.iter_mut().zip(amounts.iter()) {
        entry.balance = entry
          .balance
          .checked_add(*amount)
          .ok_or(Error::<T>::ArithmeticOverflow)?;
      }
      let value_after = Self::value_of(registry, &rates)?;

      let total = TotalShares::<T>::get();
      if total == 0 {
        ensure!(
          value_after >= pool.initial_invariant_target,
          Error::<T>::BootstrapBelowTarget
        );
      } else {
        ensure!(value_before > 0, Error::<T>::ZeroPoolValue);
      }
      let minted = invariant::shares_for_deposit(total, value_before, value_after)
        .map_err(|_| Error::<T>::ArithmeticOverflow)?;
      ensure!(minted > 0, Error::<T>::ZeroSharesMinted);

      Ok((minted, value_before, value_after))
    }

    fn do_remove_liquidity(
      who: &T::AccountId,
      shares_in: Balance,
      min_amounts_out: &[Balance],
    ) -> DispatchResult {
      let pool = Pool::<T>::get().ok_or(Error::<T>::NotInitialized)?;
      ensure!(shares_in > 0, Error::<T>::ZeroShares);
      let mut registry = Registry::<T>::get();
      ensure!(
        min_amounts_out.len() == registry.len(),
        Error::<T>::AmountsLengthMismatch
      );
      ensure!(
        T::Assets::balance(pool.share_asset, who) >= shares_in,
        Error::<T>::InsufficientShares
      );
      let total = TotalShares::<T>::get();
      ensure!(shares_in <= total, Error::<T>::InsolventWithdrawal);

      let payouts = Self::payouts_for(&registry, shares_in, total)?;
      let pool_account = Self::account_id();
      for ((entry, payout), min_out) in registry
        .iter_mut()
        .zip(payouts.iter())
        .zip(min_amounts_out.iter())
      {
        ensure!(*payout >= *min_out, Error::<T>::InsufficientOutput);
        entry.balance = entry
          .balance
          .checked_sub(*payout)
          .ok_or(Error::<T>::InsolventWithdrawal)?;
        ensure!(
          T::Assets::balance(entry.asset, &pool_account) >= *payout,
          Error::<T>::InsolventWithdrawal
        );
      }

      T::Assets::burn_from(
        pool.share_asset,
        who,
        shares_in,
        Preservation::Expendable,
        Precision::Exact,
        Fortitude::Polite,
      )?;
      for (entry, payout) in registry.iter().zip(payouts.iter()) {
        if *payout > 0 {
          T::Assets::transfer(
            entry.asset,
            &pool_account,
            who,
            *payout,
            Preservation::Expendable,
          )?;
        }
      }

      TotalShares::<T>::put(total.saturating_sub(shares_in));
      Registry::<T>::put(registry);

      log::debug!(target: LOG_TARGET, "burned {} of {} shares", shares_in, total);
      Self::deposit_event(Event::LiquidityRemoved {
        who: who.clone(),
        shares_burned: shares_in,
        amounts: payouts,
      });

      Ok(())
    }

    fn payouts_for(
      registry: &[AssetEntryOf<T>],
      shares_in: Balance,
      total: Balance,
    ) -> Result<Vec<Balance>, DispatchError> {
      registry
        .iter()
        .map(|entry| {
          invariant::payout_for_shares(entry.balance, shares_in, total)
            .map_err(|_| Error::<T>::ArithmeticOverflow.into())
        })
        .collect()
    }

    fn do_remove_token(asset_index: u32, commands: &[CommandOf<T>]) -> DispatchResult {
      ensure!(Pool::<T>::exists(), Error::<T>::NotInitialized);
      let mut registry = Registry::<T>::get();
      let index = asset_index as usize;
      let departing = registry
        .get(index)
        .cloned()
        .ok_or(Error::<T>::InvalidAssetIndex)?;
      ensure!(
        departing.status.can_transition_to(AssetStatus::PendingRemoval),
        Error::<T>::AssetNotActive
      );
      ensure!(registry.len() > 1, Error::<T>::CannotRemoveLastAsset);

      if let Some(entry) = registry.get_mut(index) {
        entry.status = AssetStatus::PendingRemoval;
      }
      Registry::<T>::put(&registry);
      log::debug!(
        target: LOG_TARGET,
        "asset {:?} pending removal with {} commands",
        departing.asset,
        commands.len(),
      );

      let rates = Self::live_rates(&registry)?;
      let value_before = Self::value_of(&registry, &rates)?;
      let pool_account = Self::account_id();
      let holdings_before: Vec<Balance> = registry
        .iter()
        .map(|entry| T::Assets::balance(entry.asset, &pool_account))
        .collect();

      Self::execute_commands(&pool_account, commands)?;

      // Carry the measured holding deltas into the accounted balances. Outflow of the departing
      // asset beyond its accounted balance is unaccounted custody and clamps at zero.
      for (position, (entry, before)) in registry.iter_mut().zip(holdings_before).enumerate() {
        let after = T::Assets::balance(entry.asset, &pool_account);
        entry.balance = if after >= before {
          entry
            .balance
            .checked_add(after - before)
            .ok_or(Error::<T>::ArithmeticOverflow)?
        } else if position == index {
          entry.balance.saturating_sub(before - after)
        } else {
          entry.balance.checked_sub(before - after).ok_or_else(|| {
            log::warn!(
              target: LOG_TARGET,
              "removal would drive the balance of {:?} negative",
              entry.asset,
            );
            Error::<T>::InvariantViolation
          })?
        };
      }

      let residual = registry.get(index).map(|entry| entry.balance).unwrap_or_default();
      if residual != 0 {
        log::warn!(
          target: LOG_TARGET,
          "removal left {} units of {:?} in the basket",
          residual,
          departing.asset,
        );
        return Err(Error::<T>::ResidualBalance.into());
      }

      let weights_before: Vec<Balance> = registry.iter().map(|entry| entry.weight).collect();
      let removed = registry.remove(index);
      let value_after = Self::pool_value_of(&registry)?;
      let floor = invariant::min_value_after_removal(value_before, T::RemovalTolerance::get());
      if value_after < floor {
        log::warn!(
          target: LOG_TARGET,
          "removal of {:?} leaked value: {} -> {} (floor {})",
          removed.asset,
          value_before,
          value_after,
          floor,
        );
        return Err(Error::<T>::ValueLeakage.into());
      }

      let renormalized = invariant::renormalize_weights(&weights_before, index)
        .map_err(|_| Error::<T>::ArithmeticOverflow)?;
      for (entry, weight) in registry.iter_mut().zip(renormalized) {
        entry.weight = weight;
      }
      ensure!(
        removed.status.can_transition_to(AssetStatus::Removed),
        Error::<T>::InvariantViolation
      );

      RetiredAssets::<T>::insert(
        removed.asset,
        RetirementRecord {
          former_weight: removed.weight,
          retired_at: frame_system::Pallet::<T>::block_number(),
        },
      );
      let weights = Self::weight_table(&registry);
      Registry::<T>::put(registry);

      log::debug!(
        target: LOG_TARGET,
        "asset {:?} removed, pool value {} -> {}",
        removed.asset,
        value_before,
        value_after,
      );
      Self::deposit_event(Event::AssetRemoved {
        asset: removed.asset,
        value_before,
        value_after,
        weights,
      });

      Ok(())
    }

    fn ensure_operator(who: &T::AccountId) -> DispatchResult {
      let pool = Pool::<T>::get().ok_or(Error::<T>::NotInitialized)?;
      ensure!(pool.operator == *who, Error::<T>::NotOperator);
      Ok(())
    }

    /// Runs `body` in its own storage layer with `ExecutionLock` held.
    ///
    /// A nested call fails before touching the lock, so the outer holder keeps it. Any error
    /// unwinds every write made under the layer, the lock included.
    fn with_execution_lock<R>(
      body: impl FnOnce() -> Result<R, DispatchError>,
    ) -> Result<R, DispatchError> {
      ensure!(
        !ExecutionLock::<T>::get(),
        Error::<T>::ReentrancyBlocked
      );
      with_storage_layer(|| {
        ExecutionLock::<T>::put(true);
        let result = body();
        ExecutionLock::<T>::kill();
        result
      })
    }

    /// Quotes every constituent once, in registry order.
    fn live_rates(registry: &[AssetEntryOf<T>]) -> Result<Vec<Balance>, DispatchError> {
      registry
        .iter()
        .map(|entry| {
          T::RateProvider::rate(&entry.provider, entry.asset).map_err(|e| {
            log::debug!(
              target: LOG_TARGET,
              "no rate for {:?}: {:?}",
              entry.asset,
              e,
            );
            Error::<T>::InvalidRate.into()
          })
        })
        .collect()
    }

    fn value_of(registry: &[AssetEntryOf<T>], rates: &[Balance]) -> Result<Balance, DispatchError> {
      let terms = registry
        .iter()
        .zip(rates.iter())
        .map(|(entry, rate)| (entry.balance, *rate));
      invariant::pool_value(terms).map_err(|_| Error::<T>::ArithmeticOverflow.into())
    }

    fn pool_value_of(registry: &[AssetEntryOf<T>]) -> Result<Balance, DispatchError> {
      let rates = Self::live_rates(registry)?;
      Self::value_of(registry, &rates)
    }

    fn weight_table(registry: &[AssetEntryOf<T>]) -> Vec<(T::AssetId, Balance)> {
      registry
        .iter()
        .map(|entry| (entry.asset, entry.weight))
        .collect()
    }

    /// Storage consistency checks
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> Result<(), polkadot_sdk::sp_runtime::TryRuntimeError> {
      ensure!(
        !ExecutionLock::<T>::get(),
        "execution lock held between dispatches"
      );
      let Some(pool) = Pool::<T>::get() else {
        ensure!(
          Registry::<T>::get().is_empty(),
          "registry populated before initialization"
        );
        return Ok(());
      };

      let registry = Registry::<T>::get();
      let weights: Vec<Balance> = registry.iter().map(|entry| entry.weight).collect();
      ensure!(
        invariant::weights_are_valid(&weights),
        "active weights do not sum to PRECISION"
      );
      ensure!(
        registry.iter().all(|entry| entry.status.is_active()),
        "registry holds a non-active asset"
      );
      ensure!(
        TotalShares::<T>::get() == T::Assets::total_issuance(pool.share_asset),
        "share supply diverged from the ledger"
      );
      let pool_account = Self::account_id();
      ensure!(
        registry
          .iter()
          .all(|entry| T::Assets::balance(entry.asset, &pool_account) >= entry.balance),
        "accounted balance exceeds custody"
      );
      Ok(())
    }
  }

  #[pallet::genesis_config]
  #[derive(frame::prelude::DefaultNoBound)]
  pub struct GenesisConfig<T: Config> {
    pub pool: Option<GenesisPoolOf<T>>,
  }

  #[pallet::genesis_build]
  impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
    fn build(&self) {
      if let Some((share_asset, target, basket, operator)) = &self.pool {
        let assets = basket.iter().map(|(asset, _, _)| *asset).collect();
        let providers = basket.iter().map(|(_, provider, _)| provider.clone()).collect();
        let weights = basket.iter().map(|(_, _, weight)| *weight).collect();
        Pallet::<T>::do_initialize(
          *share_asset,
          *target,
          assets,
          providers,
          weights,
          operator.clone(),
        )
        .expect("genesis basket must be a valid configuration");
      }
    }
  }
}
