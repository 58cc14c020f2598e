//! Benchmarking setup for pallet-sale-storage

use super::*;

#[allow(unused)]
use crate::Pallet as SaleStorage;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn record_order() {
        let owner: T::AccountId = whitelisted_caller();
        let beneficiary: T::AccountId = account("beneficiary", 0, 0);
        Owner::<T>::put(&owner);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), beneficiary.clone(), 1_000_000u128, 20u8);

        assert_eq!(Orders::<T>::get(0).map(|order| order.beneficiary), Some(beneficiary));
    }

    #[benchmark]
    fn set_order_bonus_and_rate() {
        let owner: T::AccountId = whitelisted_caller();
        let beneficiary: T::AccountId = account("beneficiary", 0, 0);
        Owner::<T>::put(&owner);
        Orders::<T>::insert(0, Order::new(beneficiary, 1_000_000, 20));
        NextOrderId::<T>::put(1);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), 0, 20u8, 50_000_000u128);

        assert_eq!(Orders::<T>::get(0).map(|order| order.exchange_rate), Some(50_000_000));
    }

    #[benchmark]
    fn add_to_whitelist() {
        let owner: T::AccountId = whitelisted_caller();
        let funder: T::AccountId = account("funder", 0, 0);
        Owner::<T>::put(&owner);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), funder.clone());

        assert_eq!(Whitelist::<T>::get(&funder), true);
    }

    impl_benchmark_test_suite!(SaleStorage, crate::mock::new_test_ext(), crate::mock::Test);
}
