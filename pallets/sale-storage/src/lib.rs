#![cfg_attr(not(feature = "std"), no_std)]
// Constant call weights until the pallet gets generated weights
#![allow(deprecated)]
#![allow(clippy::let_unit_value)]

//! # Sale storage pallet
//!
//! Ledger of purchase orders, the funder whitelist and the registry of named
//! accounts (bounty, reserve, broker reserve, team, sale coordinator).
//!
//! Every mutation is reserved to the current owner. The deployer owns the pallet
//! at genesis and hands it over to the sale pallet's account during deployment,
//! after which the sale pallet drives it through [`OrderLedger`].

use frame_support::{dispatch::DispatchResult, ensure, pallet_prelude::*};
use frame_system::{ensure_signed, pallet_prelude::*};
use sale_primitives::{
    is_zero_account, NamedAccounts, Order, OrderId, OrderLedger, Rate, Role, MAX_BONUS_PERCENT,
};
use sp_std::prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub(crate) const LOG_TARGET: &str = "runtime::sale-storage";

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {}

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Account allowed to mutate the ledger
    #[pallet::storage]
    #[pallet::getter(fn owner)]
    pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Id handed to the next recorded order
    #[pallet::storage]
    #[pallet::getter(fn orders_count)]
    pub type NextOrderId<T> = StorageValue<_, OrderId, ValueQuery>;

    /// Append-only order ledger
    #[pallet::storage]
    #[pallet::getter(fn order)]
    pub type Orders<T: Config> =
        StorageMap<_, Twox64Concat, OrderId, Order<T::AccountId>, OptionQuery>;

    /// Accounts permitted to fund the sale
    #[pallet::storage]
    #[pallet::getter(fn is_whitelisted)]
    pub type Whitelist<T: Config> = StorageMap<_, Blake2_128Concat, T::AccountId, bool, ValueQuery>;

    /// Set once the genesis owner handed ownership over
    #[pallet::storage]
    #[pallet::getter(fn ownership_handed_over)]
    pub type OwnershipHandedOver<T> = StorageValue<_, bool, ValueQuery>;

    /// Named accounts of the sale
    #[pallet::storage]
    #[pallet::getter(fn registered_account)]
    pub type Registry<T: Config> = StorageMap<_, Twox64Concat, Role, T::AccountId, OptionQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A new order entered the ledger
        OrderRecorded { order_id: OrderId, beneficiary: T::AccountId, funds: u128, bonus_percent: u8 },
        /// The exchange rate of an order was set
        OrderResolved { order_id: OrderId, bonus_percent: u8, rate: Rate },
        /// Tokens for an order were credited
        OrderFulfilled { order_id: OrderId },
        /// Account added to the funder whitelist
        Whitelisted { account: T::AccountId },
        /// Ledger ownership moved to a new account
        OwnershipTransferred { previous: T::AccountId, new: T::AccountId },
        /// A named account was registered
        AccountRegistered { role: Role, account: T::AccountId },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller is not the owner of the ledger
        Unauthorized,
        /// Zero account, zero amount or out-of-range percentage
        InvalidArgument,
        OrderNotFound,
        /// The exchange rate of the order was already set
        OrderAlreadyResolved,
        /// The order has no exchange rate yet
        OrderNotResolved,
        OrderAlreadyFulfilled,
        /// The named account can only be set once
        AlreadySet,
        /// Ownership can be handed over only once
        OwnershipAlreadyTransferred,
        Overflow,
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        #[pallet::call_index(0)]
        #[pallet::weight(10_000)]
        pub fn record_order(
            origin: OriginFor<T>,
            beneficiary: T::AccountId,
            funds: u128,
            bonus_percent: u8,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::do_record_order(&caller, &beneficiary, funds, bonus_percent).map(|_| ())
        }

        #[pallet::call_index(1)]
        #[pallet::weight(10_000)]
        pub fn set_order_bonus_and_rate(
            origin: OriginFor<T>,
            order_id: OrderId,
            bonus_percent: u8,
            rate: Rate,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::do_set_order_bonus_and_rate(&caller, order_id, bonus_percent, rate)
        }

        #[pallet::call_index(2)]
        #[pallet::weight(10_000)]
        pub fn set_order_fulfilled(origin: OriginFor<T>, order_id: OrderId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::do_set_order_fulfilled(&caller, order_id)
        }

        #[pallet::call_index(3)]
        #[pallet::weight(10_000)]
        pub fn add_to_whitelist(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::do_add_to_whitelist(&caller, &account)
        }

        /// Hand the ledger over to `new_owner`.
        ///
        /// During deployment the deployer calls this once with the sale pallet's
        /// account; from then on only the sale pallet can write to the ledger.
        #[pallet::call_index(4)]
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

        #[pallet::call_index(5)]
        #[pallet::weight(10_000)]
        pub fn set_ico_account(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(!is_zero_account(&account), Error::<T>::InvalidArgument);
            ensure!(!Registry::<T>::contains_key(Role::Ico), Error::<T>::AlreadySet);

            Registry::<T>::insert(Role::Ico, &account);
            Self::deposit_event(Event::AccountRegistered { role: Role::Ico, account });
            Ok(())
        }
    }

    #[pallet::genesis_config]
    #[derive(frame_support::DefaultNoBound)]
    pub struct GenesisConfig<T: Config> {
        /// Initial owner, normally the deployer
        pub owner: Option<T::AccountId>,
        pub bounty: Option<T::AccountId>,
        pub reserve: Option<T::AccountId>,
        pub broker_reserve: Option<T::AccountId>,
        pub team: Option<T::AccountId>,
        /// Funders whitelisted from the start
        pub whitelisted: Vec<T::AccountId>,
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            if let Some(ref owner) = self.owner {
                Owner::<T>::put(owner);
            }

            let named = [
                (Role::Bounty, &self.bounty),
                (Role::Reserve, &self.reserve),
                (Role::BrokerReserve, &self.broker_reserve),
                (Role::Team, &self.team),
            ];
            for (role, account) in named {
                if let Some(account) = account {
                    assert!(!is_zero_account(account), "Named account {role:?} must not be zero");
                    Registry::<T>::insert(role, account);
                }
            }

            for account in &self.whitelisted {
                Whitelist::<T>::insert(account, true);
            }
        }
    }
}

impl<T: Config> Pallet<T> {
    fn ensure_owner(caller: &T::AccountId) -> DispatchResult {
        ensure!(Owner::<T>::get().as_ref() == Some(caller), Error::<T>::Unauthorized);
        Ok(())
    }

    fn ensure_bonus(bonus_percent: u8) -> DispatchResult {
        ensure!(bonus_percent <= MAX_BONUS_PERCENT, Error::<T>::InvalidArgument);
        Ok(())
    }

    pub(crate) fn do_record_order(
        caller: &T::AccountId,
        beneficiary: &T::AccountId,
        funds: u128,
        bonus_percent: u8,
    ) -> Result<OrderId, DispatchError> {
        Self::ensure_owner(caller)?;
        ensure!(funds > 0, Error::<T>::InvalidArgument);
        Self::ensure_bonus(bonus_percent)?;

        let order_id = NextOrderId::<T>::get();
        let next = order_id.checked_add(1).ok_or(Error::<T>::Overflow)?;

        Orders::<T>::insert(order_id, Order::new(beneficiary.clone(), funds, bonus_percent));
        NextOrderId::<T>::put(next);

        log::debug!(target: LOG_TARGET, "order {} recorded for {:?}", order_id, beneficiary);
        Self::deposit_event(Event::OrderRecorded {
            order_id,
            beneficiary: beneficiary.clone(),
            funds,
            bonus_percent,
        });
        Ok(order_id)
    }

    pub(crate) fn do_set_order_bonus_and_rate(
        caller: &T::AccountId,
        order_id: OrderId,
        bonus_percent: u8,
        rate: Rate,
    ) -> DispatchResult {
        Self::ensure_owner(caller)?;
        ensure!(rate > 0, Error::<T>::InvalidArgument);
        Self::ensure_bonus(bonus_percent)?;

        Orders::<T>::try_mutate(order_id, |maybe_order| -> DispatchResult {
            let order = maybe_order.as_mut().ok_or(Error::<T>::OrderNotFound)?;
            ensure!(!order.is_resolved(), Error::<T>::OrderAlreadyResolved);
            order.bonus_percent = bonus_percent;
            order.exchange_rate = rate;
            Ok(())
        })?;

        Self::deposit_event(Event::OrderResolved { order_id, bonus_percent, rate });
        Ok(())
    }

    pub(crate) fn do_set_order_fulfilled(caller: &T::AccountId, order_id: OrderId) -> DispatchResult {
        Self::ensure_owner(caller)?;

        Orders::<T>::try_mutate(order_id, |maybe_order| -> DispatchResult {
            let order = maybe_order.as_mut().ok_or(Error::<T>::OrderNotFound)?;
            ensure!(order.is_resolved(), Error::<T>::OrderNotResolved);
            ensure!(!order.fulfilled, Error::<T>::OrderAlreadyFulfilled);
            order.fulfilled = true;
            Ok(())
        })?;

        Self::deposit_event(Event::OrderFulfilled { order_id });
        Ok(())
    }

    pub(crate) fn do_add_to_whitelist(caller: &T::AccountId, account: &T::AccountId) -> DispatchResult {
        Self::ensure_owner(caller)?;
        ensure!(!is_zero_account(account), Error::<T>::InvalidArgument);

        Whitelist::<T>::insert(account, true);
        Self::deposit_event(Event::Whitelisted { account: account.clone() });
        Ok(())
    }
}

impl<T: Config> OrderLedger<T::AccountId> for Pallet<T> {
    fn record_order(
        caller: &T::AccountId,
        beneficiary: &T::AccountId,
        funds: u128,
        bonus_percent: u8,
    ) -> Result<OrderId, DispatchError> {
        Self::do_record_order(caller, beneficiary, funds, bonus_percent)
    }

    fn set_order_bonus_and_rate(
        caller: &T::AccountId,
        order_id: OrderId,
        bonus_percent: u8,
        rate: Rate,
    ) -> DispatchResult {
        Self::do_set_order_bonus_and_rate(caller, order_id, bonus_percent, rate)
    }

    fn set_order_fulfilled(caller: &T::AccountId, order_id: OrderId) -> DispatchResult {
        Self::do_set_order_fulfilled(caller, order_id)
    }

    fn add_to_whitelist(caller: &T::AccountId, account: &T::AccountId) -> DispatchResult {
        Self::do_add_to_whitelist(caller, account)
    }

    fn is_whitelisted(account: &T::AccountId) -> bool {
        Whitelist::<T>::get(account)
    }

    fn order(order_id: OrderId) -> Option<Order<T::AccountId>> {
        Orders::<T>::get(order_id)
    }

    fn orders_count() -> OrderId {
        NextOrderId::<T>::get()
    }
}

impl<T: Config> NamedAccounts<T::AccountId> for Pallet<T> {
    fn account(role: Role) -> Option<T::AccountId> {
        Registry::<T>::get(role)
    }
}
