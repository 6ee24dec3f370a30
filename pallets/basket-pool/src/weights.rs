#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use polkadot_sdk::frame_support::{traits::Get, weights::{Weight, constants::RocksDbWeight}};
use core::marker::PhantomData;

/// Weight functions for `pallet_basket_pool`.
///
/// `n` is the number of basket constituents, `c` the number of removal commands.
pub trait WeightInfo {
	fn initialize(n: u32) -> Weight;
	fn add_liquidity(n: u32) -> Weight;
	fn remove_liquidity(n: u32) -> Weight;
	fn remove_token(n: u32, c: u32) -> Weight;
	fn transfer_operator() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
	fn initialize(n: u32) -> Weight {
		Weight::from_parts(30_000_000, 3000)
			.saturating_add(Weight::from_parts(2_000_000, 0).saturating_mul(n.into()))
			.saturating_add(T::DbWeight::get().reads(2))
			.saturating_add(T::DbWeight::get().writes(3))
	}
	fn add_liquidity(n: u32) -> Weight {
		Weight::from_parts(60_000_000, 6000)
			.saturating_add(Weight::from_parts(25_000_000, 2600).saturating_mul(n.into()))
			.saturating_add(T::DbWeight::get().reads(5))
			.saturating_add(T::DbWeight::get().reads((2_u64).saturating_mul(n.into())))
			.saturating_add(T::DbWeight::get().writes(5))
			.saturating_add(T::DbWeight::get().writes((2_u64).saturating_mul(n.into())))
	}
	fn remove_liquidity(n: u32) -> Weight {
		Weight::from_parts(60_000_000, 6000)
			.saturating_add(Weight::from_parts(25_000_000, 2600).saturating_mul(n.into()))
			.saturating_add(T::DbWeight::get().reads(5))
			.saturating_add(T::DbWeight::get().reads((2_u64).saturating_mul(n.into())))
			.saturating_add(T::DbWeight::get().writes(5))
			.saturating_add(T::DbWeight::get().writes((2_u64).saturating_mul(n.into())))
	}
	fn remove_token(n: u32, c: u32) -> Weight {
		Weight::from_parts(80_000_000, 6000)
			.saturating_add(Weight::from_parts(15_000_000, 2600).saturating_mul(n.into()))
			.saturating_add(Weight::from_parts(120_000_000, 8000).saturating_mul(c.into()))
			.saturating_add(T::DbWeight::get().reads(4))
			.saturating_add(T::DbWeight::get().reads((2_u64).saturating_mul(n.into())))
			.saturating_add(T::DbWeight::get().reads((4_u64).saturating_mul(c.into())))
			.saturating_add(T::DbWeight::get().writes(4))
			.saturating_add(T::DbWeight::get().writes((4_u64).saturating_mul(c.into())))
	}
	fn transfer_operator() -> Weight {
		Weight::from_parts(15_000_000, 1500)
			.saturating_add(T::DbWeight::get().reads(1))
			.saturating_add(T::DbWeight::get().writes(1))
	}
}

impl WeightInfo for () {
	fn initialize(n: u32) -> Weight {
		Weight::from_parts(30_000_000, 3000)
			.saturating_add(Weight::from_parts(2_000_000, 0).saturating_mul(n.into()))
			.saturating_add(RocksDbWeight::get().reads(2))
			.saturating_add(RocksDbWeight::get().writes(3))
	}
	fn add_liquidity(n: u32) -> Weight {
		Weight::from_parts(60_000_000, 6000)
			.saturating_add(Weight::from_parts(25_000_000, 2600).saturating_mul(n.into()))
	}
	fn remove_liquidity(n: u32) -> Weight {
		Weight::from_parts(60_000_000, 6000)
			.saturating_add(Weight::from_parts(25_000_000, 2600).saturating_mul(n.into()))
	}
	fn remove_token(n: u32, c: u32) -> Weight {
		Weight::from_parts(80_000_000, 6000)
			.saturating_add(Weight::from_parts(15_000_000, 2600).saturating_mul(n.into()))
			.saturating_add(Weight::from_parts(120_000_000, 8000).saturating_mul(c.into()))
	}
	fn transfer_operator() -> Weight {
		Weight::from_parts(15_000_000, 1500)
	}
}
