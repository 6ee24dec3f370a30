extern crate alloc;

use crate::*;
use alloc::{vec, vec::Vec};
use frame::deps::frame_benchmarking::{account, v2::*};
use frame::deps::frame_support::{
  BoundedVec,
  traits::{
    EnsureOrigin,
    fungibles::{Inspect, Mutate},
  },
};
use frame::deps::frame_system::RawOrigin;
use primitives::{Balance, params::PRECISION};

const DEPOSIT: Balance = 1_000 * PRECISION;

fn equal_weights(n: u32) -> Vec<Balance> {
  let n = n.max(1);
  let mut weights = vec![PRECISION / n as Balance; n as usize];
  let assigned: Balance = weights.iter().sum();
  if let Some(first) = weights.first_mut() {
    *first += PRECISION - assigned;
  }
  weights
}

fn basket<T: Config>(n: u32) -> (Vec<T::AssetId>, Vec<T::ProviderId>) {
  (0..n)
    .map(|i| {
      (
        T::BenchmarkHelper::basket_asset(i),
        T::BenchmarkHelper::provider(i),
      )
    })
    .unzip()
}

fn setup_pool<T: Config>(n: u32, operator: &T::AccountId) -> Vec<T::AssetId> {
  let (assets, providers) = basket::<T>(n);
  Pallet::<T>::do_initialize(
    T::BenchmarkHelper::share_asset(),
    0,
    assets.clone(),
    providers,
    equal_weights(n),
    operator.clone(),
  )
  .expect("benchmark basket is a valid configuration");
  assets
}

fn fund<T: Config>(who: &T::AccountId, assets: &[T::AssetId]) {
  for asset in assets {
    T::Assets::mint_into(*asset, who, DEPOSIT * 10).expect("benchmark assets are mintable");
  }
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn initialize(n: Linear<1, { T::MaxAssets::get() }>) {
    let (assets, providers) = basket::<T>(n);
    let operator: T::AccountId = account("operator", 0, 0);
    let origin =
      T::AdminOrigin::try_successful_origin().expect("AdminOrigin must have a successful origin");

    #[extrinsic_call]
    initialize(
      origin,
      T::BenchmarkHelper::share_asset(),
      0,
      assets,
      providers,
      equal_weights(n),
      operator,
    );

    assert_eq!(Registry::<T>::get().len(), n as usize);
  }

  #[benchmark]
  fn add_liquidity(n: Linear<1, { T::MaxAssets::get() }>) {
    let operator: T::AccountId = account("operator", 0, 0);
    let seed: T::AccountId = account("seed", 0, 0);
    let caller: T::AccountId = whitelisted_caller();
    let assets = setup_pool::<T>(n, &operator);
    fund::<T>(&seed, &assets);
    fund::<T>(&caller, &assets);
    Pallet::<T>::add_liquidity(
      RawOrigin::Signed(seed).into(),
      vec![DEPOSIT; n as usize],
      0,
      operator,
    )
    .expect("bootstrap deposit succeeds");
    let supply = TotalShares::<T>::get();

    #[extrinsic_call]
    add_liquidity(
      RawOrigin::Signed(caller.clone()),
      vec![DEPOSIT; n as usize],
      0,
      caller.clone(),
    );

    assert!(TotalShares::<T>::get() > supply);
  }

  #[benchmark]
  fn remove_liquidity(n: Linear<1, { T::MaxAssets::get() }>) {
    let operator: T::AccountId = account("operator", 0, 0);
    let caller: T::AccountId = whitelisted_caller();
    let assets = setup_pool::<T>(n, &operator);
    fund::<T>(&caller, &assets);
    Pallet::<T>::add_liquidity(
      RawOrigin::Signed(caller.clone()).into(),
      vec![DEPOSIT; n as usize],
      0,
      caller.clone(),
    )
    .expect("bootstrap deposit succeeds");
    let supply = TotalShares::<T>::get();
    let half = supply / 2;

    #[extrinsic_call]
    remove_liquidity(RawOrigin::Signed(caller), half, vec![0; n as usize]);

    assert_eq!(TotalShares::<T>::get(), supply - half);
  }

  #[benchmark]
  fn remove_token(
    n: Linear<2, { T::MaxAssets::get() }>,
    c: Linear<0, { T::MaxCommands::get() }>,
  ) {
    let operator: T::AccountId = account("operator", 0, 0);
    let sink: T::AccountId = account("sink", 0, 0);
    let assets = setup_pool::<T>(n, &operator);
    fund::<T>(&operator, &assets);
    // the departing slot stays empty so every command touches a survivor
    let mut amounts = vec![DEPOSIT; n as usize];
    amounts[0] = 0;
    Pallet::<T>::add_liquidity(
      RawOrigin::Signed(operator.clone()).into(),
      amounts,
      0,
      operator.clone(),
    )
    .expect("bootstrap deposit succeeds");

    let survivor = assets[1];
    let unit = T::Assets::minimum_balance(survivor).max(1);
    let commands: Vec<CommandOf<T>> = (0..c)
      .map(|_| Command::Transfer {
        to: sink.clone(),
        asset: survivor,
        amount: AmountSpec::Fixed(unit),
      })
      .collect();
    let commands: BoundedVec<_, T::MaxCommands> =
      commands.try_into().expect("command count within bound");

    #[extrinsic_call]
    remove_token(RawOrigin::Signed(operator), 0, commands);

    assert_eq!(Registry::<T>::get().len(), n as usize - 1);
  }

  #[benchmark]
  fn transfer_operator() {
    let operator: T::AccountId = account("operator", 0, 0);
    let successor: T::AccountId = account("successor", 0, 0);
    setup_pool::<T>(1, &operator);

    #[extrinsic_call]
    transfer_operator(RawOrigin::Signed(operator), successor.clone());

    assert_eq!(Pool::<T>::get().map(|p| p.operator), Some(successor));
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
