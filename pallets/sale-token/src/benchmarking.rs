//! Benchmarking setup for pallet-sale-token

use super::*;

#[allow(unused)]
use crate::Pallet as SaleToken;
use frame_benchmarking::v2::*;
use frame_system::RawOrigin;

#[benchmarks]
mod benchmarks {
    use super::*;

    #[benchmark]
    fn transfer() {
        let caller: T::AccountId = whitelisted_caller();
        let recipient: T::AccountId = account("recipient", 0, 0);
        let amount: u128 = 1_000_000;

        // Setup: the sale coordinator is exempt from the unlock schedule
        Ico::<T>::put(&caller);
        Balances::<T>::insert(&caller, 10_000_000);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), recipient.clone(), amount);

        assert_eq!(Balances::<T>::get(&recipient), amount);
    }

    #[benchmark]
    fn approve() {
        let caller: T::AccountId = whitelisted_caller();
        let spender: T::AccountId = account("spender", 0, 0);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), spender.clone(), 1_000_000u128);

        assert_eq!(Allowances::<T>::get(&caller, &spender), 1_000_000);
    }

    #[benchmark]
    fn transfer_from() {
        let caller: T::AccountId = whitelisted_caller();
        let owner: T::AccountId = account("owner", 0, 0);
        let recipient: T::AccountId = account("recipient", 1, 0);
        let amount: u128 = 1_000_000;

        Ico::<T>::put(&caller);
        Balances::<T>::insert(&owner, 10_000_000);
        Allowances::<T>::insert(&owner, &caller, amount);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()), owner.clone(), recipient.clone(), amount);

        assert_eq!(Balances::<T>::get(&recipient), amount);
        assert_eq!(Allowances::<T>::get(&owner, &caller), 0);
    }

    #[benchmark]
    fn set_ico() {
        let owner: T::AccountId = whitelisted_caller();
        let ico: T::AccountId = account("ico", 0, 0);
        Owner::<T>::put(&owner);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), ico.clone());

        assert_eq!(Ico::<T>::get(), Some(ico));
    }

    #[benchmark]
    fn allocate_ico_tokens() {
        let owner: T::AccountId = whitelisted_caller();
        let ico: T::AccountId = account("ico", 0, 0);
        Owner::<T>::put(&owner);
        Ico::<T>::put(&ico);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner));

        assert_eq!(Balances::<T>::get(&ico), T::SaleSupply::get());
    }

    impl_benchmark_test_suite!(SaleToken, crate::mock::new_test_ext(), crate::mock::Test);
}
