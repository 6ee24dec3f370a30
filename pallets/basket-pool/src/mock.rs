extern crate alloc;

use crate as pallet_basket_pool;
use crate::{RateProvider, VenueOps, invariant::mul_div};
use alloc::vec;
use core::cell::RefCell;
use polkadot_sdk::frame_support::traits::fungibles::Mutate;
use polkadot_sdk::frame_support::traits::tokens::Preservation;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  traits::{ConstU32, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, PerThing, Permill,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{
  AssetStatus, Balance,
  ecosystem::{
    pallet_ids::BASKET_POOL_PALLET_ID,
    params::{PRECISION, REMOVAL_TOLERANCE_PPM},
  },
};
use std::collections::{BTreeMap, BTreeSet};

pub type AccountId = u64;
pub type AssetId = u32;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const OPERATOR: AccountId = 3;
pub const VENUE: AccountId = 4;
pub const SINK: AccountId = 9;

pub const BASKET: [AssetId; 4] = [1, 2, 3, 4];
pub const VAULT_TOKEN: AssetId = 5;
pub const SHARE: AssetId = 100;

pub const QUARTER: Balance = PRECISION / 4;
pub const UNITS: Balance = PRECISION;
pub const USER_FUNDS: Balance = 10_000 * UNITS;
pub const VENUE_FUNDS: Balance = 1_000_000 * UNITS;

thread_local! {
    pub static RATES: RefCell<BTreeMap<AssetId, Balance>> = const { RefCell::new(BTreeMap::new()) };
    pub static FAILING_PROVIDERS: RefCell<BTreeSet<u32>> = const { RefCell::new(BTreeSet::new()) };
    pub static VENUE_FEE: RefCell<Permill> = const { RefCell::new(Permill::from_parts(0)) };
    pub static REENTER_ON_SWAP: RefCell<bool> = const { RefCell::new(false) };
    pub static STATUS_SEEN_BY_VENUE: RefCell<Option<AssetStatus>> = const { RefCell::new(None) };
}

/// Quote `asset` at `rate` for both the rate provider and the venue.
pub fn set_rate(asset: AssetId, rate: Balance) {
  RATES.with(|r| r.borrow_mut().insert(asset, rate));
}

pub fn fail_provider(provider: u32) {
  FAILING_PROVIDERS.with(|f| f.borrow_mut().insert(provider));
}

pub fn set_venue_fee(fee: Permill) {
  VENUE_FEE.with(|f| *f.borrow_mut() = fee);
}

pub fn reenter_on_swap(enabled: bool) {
  REENTER_ON_SWAP.with(|r| *r.borrow_mut() = enabled);
}

pub fn status_seen_by_venue() -> Option<AssetStatus> {
  STATUS_SEEN_BY_VENUE.with(|s| *s.borrow())
}

fn rate_of(asset: AssetId) -> Balance {
  RATES.with(|r| r.borrow().get(&asset).copied().unwrap_or(PRECISION))
}

fn reset_mock_adapters() {
  RATES.with(|r| r.borrow_mut().clear());
  FAILING_PROVIDERS.with(|f| f.borrow_mut().clear());
  VENUE_FEE.with(|f| *f.borrow_mut() = Permill::zero());
  REENTER_ON_SWAP.with(|r| *r.borrow_mut() = false);
  STATUS_SEEN_BY_VENUE.with(|s| *s.borrow_mut() = None);
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    BasketPool: pallet_basket_pool,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = AssetId;
  type AssetIdParameter = AssetId;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  type ReserveData = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = ();
}

/// Provider `n` quotes whatever `RATES` holds for the asset, unless it was told to fail.
pub struct MockRates;
impl RateProvider<u32, AssetId, Balance> for MockRates {
  fn rate(provider: &u32, asset: AssetId) -> Result<Balance, DispatchError> {
    if FAILING_PROVIDERS.with(|f| f.borrow().contains(provider)) {
      return Err(DispatchError::Other("rate unavailable"));
    }
    Ok(rate_of(asset))
  }
}

/// Fixed-price venue trading at the ratio of `RATES`, minus `VENUE_FEE`.
///
/// Settles through real `pallet-assets` transfers against the `VENUE` account, so every effect
/// is visible in the caller's holdings and rolls back with the surrounding storage layer.
pub struct MockVenue;

impl MockVenue {
  fn observe(who: &AccountId, asset_in: AssetId) -> Result<(), DispatchError> {
    let status = BasketPool::asset_status(asset_in);
    STATUS_SEEN_BY_VENUE.with(|s| *s.borrow_mut() = status);
    if REENTER_ON_SWAP.with(|r| *r.borrow()) {
      BasketPool::add_liquidity(RuntimeOrigin::signed(*who), vec![UNITS, 0, 0, 0], 0, *who)?;
    }
    Ok(())
  }

  fn price(asset_in: AssetId, asset_out: AssetId, amount_in: Balance) -> Result<Balance, DispatchError> {
    let gross = mul_div(amount_in, rate_of(asset_in), rate_of(asset_out))?;
    let fee = VENUE_FEE.with(|f| *f.borrow()).mul_ceil(gross);
    Ok(gross.saturating_sub(fee))
  }

  fn settle(
    who: &AccountId,
    asset_in: AssetId,
    amount_in: Balance,
    asset_out: AssetId,
    amount_out: Balance,
  ) -> Result<(), DispatchError> {
    if amount_out == 0 {
      return Err(DispatchError::Other("venue: zero output"));
    }
    <Assets as Mutate<AccountId>>::transfer(asset_in, who, &VENUE, amount_in, Preservation::Expendable)?;
    <Assets as Mutate<AccountId>>::transfer(asset_out, &VENUE, who, amount_out, Preservation::Expendable)?;
    Ok(())
  }
}

impl VenueOps<AccountId, AssetId, Balance> for MockVenue {
  fn swap_exact_in(
    who: &AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_in: Balance,
    min_out: Balance,
  ) -> Result<Balance, DispatchError> {
    Self::observe(who, asset_in)?;
    let amount_out = Self::price(asset_in, asset_out, amount_in)?;
    if amount_out < min_out {
      return Err(DispatchError::Other("venue: min out not met"));
    }
    Self::settle(who, asset_in, amount_in, asset_out, amount_out)?;
    Ok(amount_out)
  }

  fn swap_exact_out(
    who: &AccountId,
    asset_in: AssetId,
    asset_out: AssetId,
    amount_out: Balance,
    max_in: Balance,
  ) -> Result<Balance, DispatchError> {
    Self::observe(who, asset_in)?;
    let net_in = mul_div(amount_out, rate_of(asset_out), rate_of(asset_in))?;
    let amount_in = net_in.saturating_add(VENUE_FEE.with(|f| *f.borrow()).mul_ceil(net_in));
    if amount_in > max_in {
      return Err(DispatchError::Other("venue: max in exceeded"));
    }
    Self::settle(who, asset_in, amount_in, asset_out, amount_out)?;
    Ok(amount_in)
  }

  fn deposit(
    who: &AccountId,
    asset_in: AssetId,
    lp_asset: AssetId,
    amount_in: Balance,
    min_lp_out: Balance,
  ) -> Result<Balance, DispatchError> {
    let lp_out = Self::price(asset_in, lp_asset, amount_in)?;
    if lp_out < min_lp_out {
      return Err(DispatchError::Other("venue: min lp out not met"));
    }
    Self::settle(who, asset_in, amount_in, lp_asset, lp_out)?;
    Ok(lp_out)
  }

  fn withdraw(
    who: &AccountId,
    lp_asset: AssetId,
    asset_out: AssetId,
    lp_amount: Balance,
    min_out: Balance,
  ) -> Result<Balance, DispatchError> {
    let amount_out = Self::price(lp_asset, asset_out, lp_amount)?;
    if amount_out < min_out {
      return Err(DispatchError::Other("venue: min out not met"));
    }
    Self::settle(who, lp_asset, lp_amount, asset_out, amount_out)?;
    Ok(amount_out)
  }
}

pub struct PalletIdStub;
impl Get<PalletId> for PalletIdStub {
  fn get() -> PalletId {
    PalletId(*BASKET_POOL_PALLET_ID)
  }
}

pub struct TestRemovalTolerance;
impl Get<Permill> for TestRemovalTolerance {
  fn get() -> Permill {
    Permill::from_parts(REMOVAL_TOLERANCE_PPM)
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AssetId, u32> for MockBenchmarkHelper {
  fn basket_asset(index: u32) -> AssetId {
    let id = 200 + index;
    if !<Assets as polkadot_sdk::frame_support::traits::fungibles::Inspect<AccountId>>::asset_exists(id) {
      let _ = Assets::force_create(frame_system::RawOrigin::Root.into(), id, ALICE, true, 1);
    }
    id
  }

  fn share_asset() -> AssetId {
    SHARE
  }

  fn provider(index: u32) -> u32 {
    index + 1
  }
}

impl pallet_basket_pool::Config for Test {
  type AssetId = AssetId;
  type ProviderId = u32;
  type Assets = Assets;
  type RateProvider = MockRates;
  type Venues = MockVenue;
  type PalletId = PalletIdStub;
  type AdminOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type MaxAssets = ConstU32<{ primitives::ecosystem::params::MAX_BASKET_ASSETS }>;
  type MaxCommands = ConstU32<{ primitives::ecosystem::params::MAX_REMOVAL_COMMANDS }>;
  type RemovalTolerance = TestRemovalTolerance;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

fn build_storage(pool: Option<pallet_basket_pool::GenesisPoolOf<Test>>) -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  let mut assets = vec![(SHARE, ALICE, true, 1), (VAULT_TOKEN, ALICE, true, 1)];
  let mut accounts = vec![(VAULT_TOKEN, VENUE, VENUE_FUNDS)];
  for id in BASKET {
    assets.push((id, ALICE, true, 1));
    accounts.push((id, ALICE, USER_FUNDS));
    accounts.push((id, BOB, USER_FUNDS));
    accounts.push((id, VENUE, VENUE_FUNDS));
  }

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets,
    metadata: vec![],
    accounts,
    reserves: vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  pallet_basket_pool::GenesisConfig::<Test> { pool }
    .assimilate_storage(&mut t)
    .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    System::set_block_number(1);
    reset_mock_adapters();
  });
  ext
}

/// Assets exist and are funded; the pool is not initialized.
pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  build_storage(None)
}

/// Four equal-weight assets configured at genesis with `OPERATOR` in charge.
pub fn new_test_ext_with_pool() -> polkadot_sdk::sp_io::TestExternalities {
  let basket = BASKET.iter().map(|id| (*id, *id, QUARTER)).collect();
  build_storage(Some((SHARE, 0, basket, OPERATOR)))
}
