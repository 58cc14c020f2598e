#![cfg_attr(not(feature = "std"), no_std)]
// Constant call weights until the pallet gets generated weights
#![allow(deprecated)]
#![allow(clippy::let_unit_value)]

//! # Sale token pallet
//!
//! Fixed-supply fungible token issued in two one-shot allocations:
//!
//! - the service allocation credits the bounty, reserve, broker reserve and team
//!   shares to the accounts found in the sale registry;
//! - the sale allocation credits the sale share to the designated sale
//!   coordinator (`Ico`).
//!
//! Transfers are locked until the first unlock time, except for the sale
//! coordinator. Between the first and the second unlock time the runtime may
//! keep selected senders locked through [`Config::SecondStageLocked`].
//!
//! Accounts holding at least [`Config::MinHolding`] are tracked in a counted set.

use frame_support::{
    dispatch::DispatchResult,
    ensure,
    pallet_prelude::*,
    traits::{Contains, UnixTime},
};
use frame_system::{ensure_signed, pallet_prelude::*};
use sale_primitives::{is_zero_account, NamedAccounts, Role, TokenLedger};
use sp_std::prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::sale-token";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        /// Source of the service allocation accounts
        type Registry: NamedAccounts<Self::AccountId>;
        type Time: UnixTime;
        /// Senders that stay locked until the second unlock time
        type SecondStageLocked: Contains<Self::AccountId>;

        #[pallet::constant]
        type TotalSupply: Get<u128>;
        #[pallet::constant]
        type SaleSupply: Get<u128>;
        #[pallet::constant]
        type BountySupply: Get<u128>;
        #[pallet::constant]
        type ReserveSupply: Get<u128>;
        #[pallet::constant]
        type BrokerReserveSupply: Get<u128>;
        #[pallet::constant]
        type TeamSupply: Get<u128>;
        /// Smallest balance that makes an account a holder
        #[pallet::constant]
        type MinHolding: Get<u128>;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    #[pallet::storage]
    #[pallet::getter(fn owner)]
    pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Sale coordinator, exempt from the unlock schedule
    #[pallet::storage]
    #[pallet::getter(fn ico)]
    pub type Ico<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Unix time (seconds) from which everyone may transfer
    #[pallet::storage]
    #[pallet::getter(fn first_unlock_time)]
    pub type FirstUnlockTime<T> = StorageValue<_, u64, ValueQuery>;

    /// Unix time (seconds) from which second-stage locked senders may transfer
    #[pallet::storage]
    #[pallet::getter(fn second_unlock_time)]
    pub type SecondUnlockTime<T> = StorageValue<_, u64, ValueQuery>;

    /// Amount issued through allocations so far
    #[pallet::storage]
    #[pallet::getter(fn total_supply)]
    pub type TotalIssued<T> = StorageValue<_, u128, ValueQuery>;

    /// Account balances
    #[pallet::storage]
    #[pallet::getter(fn balance_of)]
    pub type Balances<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, u128, ValueQuery>;

    /// Amount `spender` may move out of `owner`'s balance
    #[pallet::storage]
    #[pallet::getter(fn allowance)]
    pub type Allowances<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        T::AccountId,
        Blake2_128Concat,
        T::AccountId,
        u128,
        ValueQuery,
    >;

    /// Accounts holding at least `MinHolding`
    #[pallet::storage]
    pub type Holders<T: Config> = CountedStorageMap<_, Blake2_128Concat, T::AccountId, (), OptionQuery>;

    /// Set once the genesis owner handed ownership over
    #[pallet::storage]
    #[pallet::getter(fn ownership_handed_over)]
    pub type OwnershipHandedOver<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::storage]
    #[pallet::getter(fn service_tokens_allocated)]
    pub type ServiceTokensAllocated<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::storage]
    #[pallet::getter(fn ico_tokens_allocated)]
    pub type IcoTokensAllocated<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// Tokens transferred from one account to another
        Transferred { from: T::AccountId, to: T::AccountId, amount: u128 },
        /// `spender` may now move `amount` out of `owner`'s balance
        Approved { owner: T::AccountId, spender: T::AccountId, amount: u128 },
        /// An allocation share was credited
        Allocated { role: Role, account: T::AccountId, amount: u128 },
        /// The sale coordinator was designated
        IcoSet { account: T::AccountId },
        OwnershipTransferred { previous: T::AccountId, new: T::AccountId },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller is not the owner of the token
        Unauthorized,
        /// Zero account
        InvalidArgument,
        InsufficientFunds,
        InsufficientAllowance,
        /// Transfers are still locked for this caller
        TransferRestricted,
        /// The allocation was already performed
        AlreadyAllocated,
        /// The sale coordinator can only be set once
        AlreadySet,
        /// No sale coordinator was designated yet
        IcoNotSet,
        /// A service allocation account is missing from the registry
        RegistryAccountMissing,
        /// Ownership can be handed over only once
        OwnershipAlreadyTransferred,
        Overflow,
    }

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        fn integrity_test() {
            let split = [
                T::SaleSupply::get(),
                T::BountySupply::get(),
                T::ReserveSupply::get(),
                T::BrokerReserveSupply::get(),
                T::TeamSupply::get(),
            ]
            .iter()
            .try_fold(0u128, |acc, share| acc.checked_add(*share));

            assert_eq!(
                split,
                Some(T::TotalSupply::get()),
                "Allocation shares must add up to the total supply"
            );
            assert!(T::MinHolding::get() > 0, "MinHolding must be non-zero");
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        #[pallet::call_index(0)]
        #[pallet::weight(10_000)]
        pub fn transfer(origin: OriginFor<T>, to: T::AccountId, amount: u128) -> DispatchResult {
            let sender = ensure_signed(origin)?;
            ensure!(!is_zero_account(&to), Error::<T>::InvalidArgument);
            Self::ensure_transfer_allowed(&sender, &sender)?;
            Self::do_transfer(&sender, &to, amount)
        }

        #[pallet::call_index(1)]
        #[pallet::weight(10_000)]
        pub fn approve(origin: OriginFor<T>, spender: T::AccountId, amount: u128) -> DispatchResult {
            let owner = ensure_signed(origin)?;
            ensure!(!is_zero_account(&spender), Error::<T>::InvalidArgument);

            Allowances::<T>::insert(&owner, &spender, amount);
            Self::deposit_event(Event::Approved { owner, spender, amount });
            Ok(())
        }

        /// Move `amount` out of `owner`'s balance on the strength of an allowance.
        ///
        /// Before the first unlock time only the sale coordinator may do this,
        /// whoever the owner of the tokens is.
        #[pallet::call_index(2)]
        #[pallet::weight(10_000)]
        pub fn transfer_from(
            origin: OriginFor<T>,
            owner: T::AccountId,
            to: T::AccountId,
            amount: u128,
        ) -> DispatchResult {
            let spender = ensure_signed(origin)?;
            ensure!(!is_zero_account(&to), Error::<T>::InvalidArgument);
            Self::ensure_transfer_allowed(&spender, &owner)?;

            let allowance = Allowances::<T>::get(&owner, &spender);
            ensure!(allowance >= amount, Error::<T>::InsufficientAllowance);

            Self::do_transfer(&owner, &to, amount)?;
            Allowances::<T>::insert(&owner, &spender, allowance - amount);
            Ok(())
        }

        #[pallet::call_index(3)]
        #[pallet::weight(10_000)]
        pub fn allocate_service_tokens(origin: OriginFor<T>) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(!ServiceTokensAllocated::<T>::get(), Error::<T>::AlreadyAllocated);

            let shares = [
                (Role::Bounty, T::BountySupply::get()),
                (Role::Reserve, T::ReserveSupply::get()),
                (Role::BrokerReserve, T::BrokerReserveSupply::get()),
                (Role::Team, T::TeamSupply::get()),
            ];
            for (role, amount) in shares {
                let account = T::Registry::account(role).ok_or(Error::<T>::RegistryAccountMissing)?;
                Self::credit(role, &account, amount)?;
            }

            ServiceTokensAllocated::<T>::put(true);
            log::info!(target: LOG_TARGET, "service tokens allocated");
            Ok(())
        }

        #[pallet::call_index(4)]
        #[pallet::weight(10_000)]
        pub fn allocate_ico_tokens(origin: OriginFor<T>) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(!IcoTokensAllocated::<T>::get(), Error::<T>::AlreadyAllocated);
            let ico = Ico::<T>::get().ok_or(Error::<T>::IcoNotSet)?;

            Self::credit(Role::Ico, &ico, T::SaleSupply::get())?;

            IcoTokensAllocated::<T>::put(true);
            log::info!(target: LOG_TARGET, "sale tokens allocated to {:?}", ico);
            Ok(())
        }

        #[pallet::call_index(5)]
        #[pallet::weight(10_000)]
        pub fn set_ico(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(!is_zero_account(&account), Error::<T>::InvalidArgument);
            ensure!(Ico::<T>::get().is_none(), Error::<T>::AlreadySet);

            Ico::<T>::put(&account);
            log::info!(target: LOG_TARGET, "sale coordinator set to {:?}", account);
            Self::deposit_event(Event::IcoSet { account });
            Ok(())
        }

        #[pallet::call_index(6)]
        #[pallet::weight(10_000)]
        pub fn transfer_ownership(origin: OriginFor<T>, new_owner: T::AccountId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(!is_zero_account(&new_owner), Error::<T>::InvalidArgument);
            ensure!(!OwnershipHandedOver::<T>::get(), Error::<T>::OwnershipAlreadyTransferred);

            Owner::<T>::put(&new_owner);
            OwnershipHandedOver::<T>::put(true);
            log::info!(target: LOG_TARGET, "ownership transferred to {:?}", new_owner);
            Self::deposit_event(Event::OwnershipTransferred { previous: caller, new: new_owner });
            Ok(())
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Initial owner, normally the deployer
        pub owner: Option<T::AccountId>,
        pub first_unlock_time: u64,
        pub second_unlock_time: u64,
        /// Sale coordinator, when already known at genesis
        pub ico: Option<T::AccountId>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            if self.second_unlock_time > 0 {
                assert!(
                    self.first_unlock_time < self.second_unlock_time,
                    "First unlock time must precede the second one"
                );
            }

            if let Some(ref owner) = self.owner {
                Owner::<T>::put(owner);
            }
            if let Some(ref ico) = self.ico {
                assert!(!is_zero_account(ico), "Sale coordinator must not be zero");
                Ico::<T>::put(ico);
            }

            FirstUnlockTime::<T>::put(self.first_unlock_time);
            SecondUnlockTime::<T>::put(self.second_unlock_time);
        }
    }
}

impl<T: Config> Pallet<T> {
    /// Number of accounts holding at least `MinHolding`.
    pub fn holders_count() -> u32 {
        Holders::<T>::count()
    }

    pub fn is_holder(account: &T::AccountId) -> bool {
        Holders::<T>::contains_key(account)
    }

    /// Whether `account` could move its own tokens right now.
    pub fn transfers_unlocked_for(account: &T::AccountId) -> bool {
        Self::ensure_transfer_allowed(account, account).is_ok()
    }

    fn now() -> u64 {
        T::Time::now().as_secs()
    }

    fn ensure_owner(caller: &T::AccountId) -> DispatchResult {
        ensure!(Owner::<T>::get().as_ref() == Some(caller), Error::<T>::Unauthorized);
        Ok(())
    }

    /// `caller` executes the transfer, `from` is the account being debited.
    fn ensure_transfer_allowed(caller: &T::AccountId, from: &T::AccountId) -> DispatchResult {
        if Ico::<T>::get().as_ref() == Some(caller) {
            return Ok(());
        }

        let now = Self::now();
        ensure!(now >= FirstUnlockTime::<T>::get(), Error::<T>::TransferRestricted);
        ensure!(
            now >= SecondUnlockTime::<T>::get() || !T::SecondStageLocked::contains(from),
            Error::<T>::TransferRestricted
        );
        Ok(())
    }

    fn set_balance(account: &T::AccountId, amount: u128) {
        if amount == 0 {
            Balances::<T>::remove(account);
        } else {
            Balances::<T>::insert(account, amount);
        }

        if amount >= T::MinHolding::get() {
            Holders::<T>::insert(account, ());
        } else {
            Holders::<T>::remove(account);
        }
    }

    pub(crate) fn do_transfer(from: &T::AccountId, to: &T::AccountId, amount: u128) -> DispatchResult {
        let from_balance = Balances::<T>::get(from);
        ensure!(from_balance >= amount, Error::<T>::InsufficientFunds);

        if from != to {
            let to_balance =
                Balances::<T>::get(to).checked_add(amount).ok_or(Error::<T>::Overflow)?;
            Self::set_balance(from, from_balance - amount);
            Self::set_balance(to, to_balance);
        }

        Self::deposit_event(Event::Transferred { from: from.clone(), to: to.clone(), amount });
        Ok(())
    }

    fn credit(role: Role, account: &T::AccountId, amount: u128) -> DispatchResult {
        let issued = TotalIssued::<T>::get().checked_add(amount).ok_or(Error::<T>::Overflow)?;
        ensure!(issued <= T::TotalSupply::get(), Error::<T>::Overflow);
        let balance = Balances::<T>::get(account).checked_add(amount).ok_or(Error::<T>::Overflow)?;

        TotalIssued::<T>::put(issued);
        Self::set_balance(account, balance);
        Self::deposit_event(Event::Allocated { role, account: account.clone(), amount });
        Ok(())
    }
}

impl<T: Config> TokenLedger<T::AccountId> for Pallet<T> {
    fn transfer(caller: &T::AccountId, to: &T::AccountId, amount: u128) -> DispatchResult {
        ensure!(!is_zero_account(to), Error::<T>::InvalidArgument);
        Self::ensure_transfer_allowed(caller, caller)?;
        Self::do_transfer(caller, to, amount)
    }

    fn balance_of(account: &T::AccountId) -> u128 {
        Balances::<T>::get(account)
    }
}
