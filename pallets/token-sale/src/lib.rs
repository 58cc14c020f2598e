#![cfg_attr(not(feature = "std"), no_std)]
// Constant call weights until the pallet gets generated weights
#![allow(deprecated)]
#![allow(clippy::let_unit_value)]

//! # Token sale pallet
//!
//! Coordinates the public sale of the sale token.
//!
//! Whitelisted funders send native currency through [`Pallet::fund`] while the
//! sale is active. The funds go straight to the sale wallet and an order is
//! recorded in the order ledger together with the bonus tier earned at that
//! moment. Every new order opens a rate request that the exchange-rate oracle
//! answers later through [`Pallet::resolve_rate`]; only then are tokens credited
//! to the funder, out of the sale account's own token balance.
//!
//! Once the sale has ended, the tokens left under the hard cap are spread over
//! the fulfilled orders by [`Pallet::allocate_unsold_tokens`].
//!
//! An order whose rate request is never answered stays pending for good. The
//! owner can re-emit the request with [`Pallet::request_rate`].

use frame_support::{
    dispatch::DispatchResult,
    ensure,
    pallet_prelude::*,
    traits::{
        fungible::{self, Mutate},
        tokens::Preservation,
        EnsureOrigin, UnixTime,
    },
    PalletId,
};
use frame_system::{ensure_signed, pallet_prelude::*};
use sale_primitives::{is_zero_account, OrderId, OrderLedger, Rate, TokenLedger};
use sp_runtime::traits::{AccountIdConversion, Saturating, UniqueSaturatedInto, Zero};
use sp_std::prelude::*;

pub use pallet::*;

#[cfg(test)]
mod mock;


pub(crate) const LOG_TARGET: &str = "runtime::token-sale";

pub type BalanceOf<T> =
    <<T as Config>::Currency as fungible::Inspect<<T as frame_system::Config>::AccountId>>::Balance;

/// Sale window and destination of the raised funds. Times are Unix seconds.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct SaleSchedule<AccountId> {
    pub start_time: u64,
    /// Before this moment the first, richer bonus round applies
    pub bonus_change_time: u64,
    pub end_time: u64,
    pub wallet: AccountId,
}

impl<AccountId> SaleSchedule<AccountId> {
    pub fn is_active(&self, now: u64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    pub fn has_ended(&self, now: u64) -> bool {
        now >= self.end_time
    }
}

#[derive(Encode, Decode, Clone, Copy, PartialEq, Eq, RuntimeDebug, TypeInfo)]
pub enum SaleState {
    /// `init` was not called yet
    Uninitialized,
    Pending,
    Active,
    Ended,
    /// Unsold tokens were distributed
    Finalized,
}

#[frame_support::pallet]
pub mod pallet {
    use super::*;

    #[pallet::config]
    pub trait Config: frame_system::Config {
        /// Native currency the sale is funded with
        type Currency: fungible::Mutate<Self::AccountId>;
        type Ledger: OrderLedger<Self::AccountId>;
        type Token: TokenLedger<Self::AccountId>;
        type Time: UnixTime;
        /// Exchange-rate oracle
        type OracleOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Derives the account holding the tokens for sale
        #[pallet::constant]
        type PalletId: Get<PalletId>;
        /// Most tokens the sale may hand out, pre-sale included
        #[pallet::constant]
        type TokensHardCap: Get<u128>;
        #[pallet::constant]
        type TokenPrice: Get<u128>;
        /// Rates are scaled by `10^RateExponent`
        #[pallet::constant]
        type RateExponent: Get<u32>;
        /// Contribution that earns the top bonus tier
        #[pallet::constant]
        type HighBonusThreshold: Get<BalanceOf<Self>>;
        /// Contribution that earns the lower bonus tier
        #[pallet::constant]
        type LowBonusThreshold: Get<BalanceOf<Self>>;
        #[pallet::constant]
        type MaxPreSaleAllocations: Get<u32>;
    }

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    #[pallet::storage]
    #[pallet::getter(fn owner)]
    pub type Owner<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

    /// Set once the genesis owner handed ownership over
    #[pallet::storage]
    #[pallet::getter(fn ownership_handed_over)]
    pub type OwnershipHandedOver<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::storage]
    #[pallet::getter(fn schedule)]
    pub type Schedule<T: Config> = StorageValue<_, SaleSchedule<T::AccountId>, OptionQuery>;

    /// Tokens handed out for resolved orders and pre-sale allocations
    #[pallet::storage]
    #[pallet::getter(fn sold)]
    pub type Sold<T> = StorageValue<_, u128, ValueQuery>;

    /// Tokens handed out by the unsold allocation
    #[pallet::storage]
    #[pallet::getter(fn unsold_distributed)]
    pub type UnsoldDistributed<T> = StorageValue<_, u128, ValueQuery>;

    /// Orders waiting for an exchange rate, with the time of the request
    #[pallet::storage]
    #[pallet::getter(fn pending_rate)]
    pub type PendingRates<T> = StorageMap<_, Twox64Concat, OrderId, u64, OptionQuery>;

    #[pallet::storage]
    #[pallet::getter(fn unsold_allocation_scheduled)]
    pub type UnsoldAllocationScheduled<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::storage]
    #[pallet::getter(fn unsold_tokens_allocated)]
    pub type UnsoldTokensAllocated<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::storage]
    #[pallet::getter(fn pre_sale_allocated)]
    pub type PreSaleAllocated<T> = StorageValue<_, bool, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        Initialized { start_time: u64, bonus_change_time: u64, end_time: u64, wallet: T::AccountId },
        /// A funder contributed `funds` and an order was recorded
        OrderCreated { order_id: OrderId, beneficiary: T::AccountId, funds: u128 },
        /// The oracle is asked for the exchange rate of an order
        RateRequested { order_id: OrderId },
        /// Tokens for a resolved order were credited
        TokensCredited { order_id: OrderId, beneficiary: T::AccountId, tokens: u128 },
        /// The oracle should trigger the unsold allocation at `at`
        UnsoldAllocationScheduled { at: u64 },
        PreSaleTokensAllocated { account: T::AccountId, amount: u128 },
        /// Share of the unsold tokens credited for an order
        UnsoldTokensCredited { order_id: OrderId, beneficiary: T::AccountId, amount: u128 },
        UnsoldTokensAllocated { total: u128 },
        OwnershipTransferred { previous: T::AccountId, new: T::AccountId },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// Caller lacks the required role, or the funder is not whitelisted
        Unauthorized,
        /// Zero account or zero amount
        InvalidArgument,
        /// Sale times are not strictly increasing
        InvalidConfig,
        NotInitialized,
        AlreadyInitialized,
        /// Outside of the sale window
        NotActive,
        /// The sale has not ended yet
        NotEnded,
        /// The wallet holds less than the existential deposit
        InactiveWallet,
        OrderNotFound,
        /// Tokens for the order were already credited
        OrderAlreadyFulfilled,
        /// Crediting the tokens would exceed the hard cap
        HardCapExceeded,
        AlreadyScheduled,
        AlreadyAllocated,
        /// The unsold tokens were already distributed
        SaleFinalized,
        /// Ownership can be handed over only once
        OwnershipAlreadyTransferred,
        Overflow,
    }

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        fn integrity_test() {
            assert!(T::TokenPrice::get() > 0, "TokenPrice must be non-zero");
            assert!(
                10u128.checked_pow(T::RateExponent::get()).is_some(),
                "RateExponent is too large"
            );
            assert!(
                T::HighBonusThreshold::get() >= T::LowBonusThreshold::get(),
                "Bonus thresholds must be ordered"
            );
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Open the sale schedule.
        ///
        /// The wallet must already hold the existential deposit, so that any
        /// positive contribution can be forwarded to it.
        #[pallet::call_index(0)]
        #[pallet::weight(10_000)]
        pub fn init(
            origin: OriginFor<T>,
            start_time: u64,
            bonus_change_time: u64,
            end_time: u64,
            wallet: T::AccountId,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(Schedule::<T>::get().is_none(), Error::<T>::AlreadyInitialized);
            ensure!(
                start_time < bonus_change_time && bonus_change_time < end_time,
                Error::<T>::InvalidConfig
            );
            ensure!(!is_zero_account(&wallet), Error::<T>::InvalidArgument);
            ensure!(
                <T::Currency as fungible::Inspect<T::AccountId>>::total_balance(&wallet)
                    >= <T::Currency as fungible::Inspect<T::AccountId>>::minimum_balance(),
                Error::<T>::InactiveWallet
            );

            Schedule::<T>::put(SaleSchedule {
                start_time,
                bonus_change_time,
                end_time,
                wallet: wallet.clone(),
            });
            log::info!(
                target: LOG_TARGET,
                "sale initialised: start {}, bonus change {}, end {}",
                start_time,
                bonus_change_time,
                end_time
            );
            Self::deposit_event(Event::Initialized { start_time, bonus_change_time, end_time, wallet });
            Ok(())
        }

        /// Contribute `value` to the sale.
        ///
        /// The bonus tier is fixed now; the tokens follow once the oracle resolved
        /// the exchange rate of the new order.
        #[pallet::call_index(1)]
        #[pallet::weight(10_000)]
        pub fn fund(origin: OriginFor<T>, #[pallet::compact] value: BalanceOf<T>) -> DispatchResult {
            let funder = ensure_signed(origin)?;
            let schedule = Schedule::<T>::get().ok_or(Error::<T>::NotInitialized)?;
            ensure!(T::Ledger::is_whitelisted(&funder), Error::<T>::Unauthorized);

            let now = Self::now();
            ensure!(schedule.is_active(now), Error::<T>::NotActive);
            ensure!(!value.is_zero(), Error::<T>::InvalidArgument);

            let bonus_percent = Self::bonus_for(&schedule, now, value);
            <T::Currency as Mutate<T::AccountId>>::transfer(
                &funder,
                &schedule.wallet,
                value,
                Preservation::Expendable,
            )?;

            let funds: u128 = value.unique_saturated_into();
            let order_id = T::Ledger::record_order(&Self::account_id(), &funder, funds, bonus_percent)?;
            PendingRates::<T>::insert(order_id, now);

            log::debug!(target: LOG_TARGET, "order {} created with {}% bonus", order_id, bonus_percent);
            Self::deposit_event(Event::OrderCreated { order_id, beneficiary: funder, funds });
            Self::deposit_event(Event::RateRequested { order_id });
            Ok(())
        }

        /// Oracle answer for a pending order.
        ///
        /// Refused without touching any state when the order was already fulfilled
        /// or the unsold tokens were distributed.
        #[pallet::call_index(2)]
        #[pallet::weight(10_000)]
        pub fn resolve_rate(origin: OriginFor<T>, order_id: OrderId, rate: Rate) -> DispatchResult {
            T::OracleOrigin::ensure_origin(origin)?;
            ensure!(!UnsoldTokensAllocated::<T>::get(), Error::<T>::SaleFinalized);
            ensure!(rate > 0, Error::<T>::InvalidArgument);

            let order = T::Ledger::order(order_id).ok_or(Error::<T>::OrderNotFound)?;
            ensure!(!order.fulfilled, Error::<T>::OrderAlreadyFulfilled);

            let tokens = Self::tokens_for(order.funds, order.bonus_percent, rate)?;
            let sold = Sold::<T>::get().checked_add(tokens).ok_or(Error::<T>::Overflow)?;
            ensure!(sold <= T::TokensHardCap::get(), Error::<T>::HardCapExceeded);

            let sale = Self::account_id();
            T::Ledger::set_order_bonus_and_rate(&sale, order_id, order.bonus_percent, rate)?;
            T::Token::transfer(&sale, &order.beneficiary, tokens)?;
            T::Ledger::set_order_fulfilled(&sale, order_id)?;

            PendingRates::<T>::remove(order_id);
            Sold::<T>::put(sold);

            log::debug!(target: LOG_TARGET, "order {} credited with {} tokens", order_id, tokens);
            Self::deposit_event(Event::TokensCredited {
                order_id,
                beneficiary: order.beneficiary,
                tokens,
            });
            Ok(())
        }

        #[pallet::call_index(3)]
        #[pallet::weight(10_000)]
        pub fn add_to_whitelist(origin: OriginFor<T>, account: T::AccountId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            T::Ledger::add_to_whitelist(&Self::account_id(), &account)
        }

        /// Ask the oracle to trigger the unsold allocation once the sale ends.
        #[pallet::call_index(4)]
        #[pallet::weight(10_000)]
        pub fn schedule_unsold_allocation(origin: OriginFor<T>) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            let schedule = Schedule::<T>::get().ok_or(Error::<T>::NotInitialized)?;
            ensure!(!schedule.has_ended(Self::now()), Error::<T>::NotActive);
            ensure!(!UnsoldAllocationScheduled::<T>::get(), Error::<T>::AlreadyScheduled);

            UnsoldAllocationScheduled::<T>::put(true);
            Self::deposit_event(Event::UnsoldAllocationScheduled { at: schedule.end_time });
            Ok(())
        }

        #[pallet::call_index(5)]
        #[pallet::weight(10_000)]
        pub fn allocate_pre_sale_tokens(
            origin: OriginFor<T>,
            allocations: BoundedVec<(T::AccountId, u128), T::MaxPreSaleAllocations>,
        ) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;
            ensure!(!PreSaleAllocated::<T>::get(), Error::<T>::AlreadyAllocated);

            let sale = Self::account_id();
            let mut sold = Sold::<T>::get();
            for (account, amount) in allocations {
                ensure!(!is_zero_account(&account) && amount > 0, Error::<T>::InvalidArgument);
                sold = sold.checked_add(amount).ok_or(Error::<T>::Overflow)?;
                ensure!(sold <= T::TokensHardCap::get(), Error::<T>::HardCapExceeded);

                T::Token::transfer(&sale, &account, amount)?;
                Self::deposit_event(Event::PreSaleTokensAllocated { account, amount });
            }

            Sold::<T>::put(sold);
            PreSaleAllocated::<T>::put(true);
            log::info!(target: LOG_TARGET, "pre-sale tokens allocated, {} sold", sold);
            Ok(())
        }

        /// Spread the tokens left under the hard cap over the fulfilled orders.
        ///
        /// Each order receives `unsold / (hard_cap / order_tokens)`, bounded by
        /// what is left to distribute. Orders still waiting for a rate get nothing,
        /// and their late answers are refused afterwards.
        ///
        /// Walks every recorded order in one call; the constant weight does not
        /// reflect that.
        #[pallet::call_index(6)]
        #[pallet::weight(10_000)]
        pub fn allocate_unsold_tokens(origin: OriginFor<T>) -> DispatchResult {
            if let Err(origin) = T::OracleOrigin::try_origin(origin) {
                let caller = ensure_signed(origin)?;
                Self::ensure_owner(&caller)?;
            }

            let schedule = Schedule::<T>::get().ok_or(Error::<T>::NotInitialized)?;
            ensure!(schedule.has_ended(Self::now()), Error::<T>::NotEnded);
            ensure!(!UnsoldTokensAllocated::<T>::get(), Error::<T>::AlreadyAllocated);

            let hard_cap = T::TokensHardCap::get();
            let unsold = hard_cap.saturating_sub(Sold::<T>::get());
            let sale = Self::account_id();

            let mut distributed: u128 = 0;
            let mut skipped: u64 = 0;
            for order_id in 0..T::Ledger::orders_count() {
                let Some(order) = T::Ledger::order(order_id) else { continue };
                if !order.fulfilled {
                    skipped.saturating_inc();
                    continue;
                }

                let order_tokens =
                    Self::tokens_for(order.funds, order.bonus_percent, order.exchange_rate)?;
                if order_tokens == 0 {
                    continue;
                }
                let coeff = hard_cap / order_tokens;
                if coeff == 0 {
                    continue;
                }
                let amount = (unsold / coeff).min(unsold - distributed);
                if amount == 0 {
                    continue;
                }

                T::Token::transfer(&sale, &order.beneficiary, amount)?;
                distributed += amount;
                Self::deposit_event(Event::UnsoldTokensCredited {
                    order_id,
                    beneficiary: order.beneficiary,
                    amount,
                });
            }

            if skipped > 0 {
                log::warn!(target: LOG_TARGET, "{} orders without a rate left out of the unsold allocation", skipped);
            }

            UnsoldDistributed::<T>::put(distributed);
            UnsoldTokensAllocated::<T>::put(true);
            log::info!(target: LOG_TARGET, "{} of {} unsold tokens distributed", distributed, unsold);
            Self::deposit_event(Event::UnsoldTokensAllocated { total: distributed });
            Ok(())
        }

        /// Re-emit the rate request of an order the oracle never answered.
        #[pallet::call_index(7)]
        #[pallet::weight(10_000)]
        pub fn request_rate(origin: OriginFor<T>, order_id: OrderId) -> DispatchResult {
            let caller = ensure_signed(origin)?;
            Self::ensure_owner(&caller)?;

            let order = T::Ledger::order(order_id).ok_or(Error::<T>::OrderNotFound)?;
            ensure!(!order.fulfilled, Error::<T>::OrderAlreadyFulfilled);

            PendingRates::<T>::insert(order_id, Self::now());
            Self::deposit_event(Event::RateRequested { order_id });
            Ok(())
        }

        #[pallet::call_index(8)]
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
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            if let Some(ref owner) = self.owner {
                Owner::<T>::put(owner);
            }
        }
    }
}

impl<T: Config> Pallet<T> {
    /// Account holding the tokens for sale. Designated as the token's sale
    /// coordinator and as owner of the order ledger during deployment.
    pub fn account_id() -> T::AccountId {
        T::PalletId::get().into_account_truncating()
    }

    pub fn sale_state() -> SaleState {
        let Some(schedule) = Schedule::<T>::get() else {
            return SaleState::Uninitialized;
        };
        if UnsoldTokensAllocated::<T>::get() {
            return SaleState::Finalized;
        }

        let now = Self::now();
        if now < schedule.start_time {
            SaleState::Pending
        } else if schedule.is_active(now) {
            SaleState::Active
        } else {
            SaleState::Ended
        }
    }

    /// Bonus earned by contributing `value` at `now`, zero before `init`.
    pub fn bonus_percent(now: u64, value: BalanceOf<T>) -> u8 {
        Schedule::<T>::get().map_or(0, |schedule| Self::bonus_for(&schedule, now, value))
    }

    /// Tokens bought with `funds` at `rate`:
    /// `rate * funds * (100 + bonus) / (100 * TokenPrice * 10^RateExponent)`.
    pub fn tokens_for(funds: u128, bonus_percent: u8, rate: Rate) -> Result<u128, DispatchError> {
        let numerator = rate
            .checked_mul(funds)
            .and_then(|value| value.checked_mul(100u128.saturating_add(bonus_percent.into())))
            .ok_or(Error::<T>::Overflow)?;
        let denominator = 10u128
            .checked_pow(T::RateExponent::get())
            .and_then(|scale| scale.checked_mul(T::TokenPrice::get()))
            .and_then(|value| value.checked_mul(100))
            .filter(|value| *value > 0)
            .ok_or(Error::<T>::Overflow)?;
        Ok(numerator / denominator)
    }

    fn bonus_for(schedule: &SaleSchedule<T::AccountId>, now: u64, value: BalanceOf<T>) -> u8 {
        let first_round = now < schedule.bonus_change_time;
        let high = value >= T::HighBonusThreshold::get();
        let low = value >= T::LowBonusThreshold::get();

        match (first_round, high, low) {
            (true, true, _) => 20,
            (true, false, true) => 10,
            (false, true, _) => 10,
            (false, false, true) => 5,
            _ => 0,
        }
    }

    fn now() -> u64 {
        T::Time::now().as_secs()
    }

    fn ensure_owner(caller: &T::AccountId) -> DispatchResult {
        ensure!(Owner::<T>::get().as_ref() == Some(caller), Error::<T>::Unauthorized);
        Ok(())
    }
}
