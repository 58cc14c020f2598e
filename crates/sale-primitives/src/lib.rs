//! Types and traits shared by the token sale pallets.
//!
//! The sale is split over three pallets that never reach into each other's
//! storage. The sale pallet talks to the order ledger and to the token through
//! the traits below, always naming the account it acts as. The receiving pallet
//! checks that account against its own owner/exemption rules, the same way it
//! checks a signed origin.

#![cfg_attr(not(feature = "std"), no_std)]

use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use sp_runtime::{traits::TrailingZeroInput, DispatchError, DispatchResult, RuntimeDebug};

/// Sequential order identifier, starting at zero.
pub type OrderId = u64;

/// Exchange rate scaled by `10^RateExponent`.
pub type Rate = u128;

/// Highest bonus an order may carry, in percent.
pub const MAX_BONUS_PERCENT: u8 = 100;

/// A single contribution to the sale.
///
/// `exchange_rate` stays zero until the oracle answers. `fulfilled` flips once
/// the tokens for the order were credited.
#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct Order<AccountId> {
    pub beneficiary: AccountId,
    pub funds: u128,
    pub bonus_percent: u8,
    pub exchange_rate: Rate,
    pub fulfilled: bool,
}

impl<AccountId> Order<AccountId> {
    pub fn new(beneficiary: AccountId, funds: u128, bonus_percent: u8) -> Self {
        Self { beneficiary, funds, bonus_percent, exchange_rate: 0, fulfilled: false }
    }

    pub fn is_resolved(&self) -> bool {
        self.exchange_rate != 0
    }
}

/// Named accounts kept in the sale registry.
#[derive(
    Encode,
    Decode,
    DecodeWithMemTracking,
    Clone,
    Copy,
    PartialEq,
    Eq,
    RuntimeDebug,
    TypeInfo,
    MaxEncodedLen,
)]
pub enum Role {
    Bounty,
    Reserve,
    BrokerReserve,
    Team,
    Ico,
}

/// Append-only order ledger plus the funder whitelist.
///
/// Mutating methods take the acting account and fail unless it owns the ledger.
pub trait OrderLedger<AccountId> {
    fn record_order(
        caller: &AccountId,
        beneficiary: &AccountId,
        funds: u128,
        bonus_percent: u8,
    ) -> Result<OrderId, DispatchError>;

    fn set_order_bonus_and_rate(
        caller: &AccountId,
        order_id: OrderId,
        bonus_percent: u8,
        rate: Rate,
    ) -> DispatchResult;

    fn set_order_fulfilled(caller: &AccountId, order_id: OrderId) -> DispatchResult;

    fn add_to_whitelist(caller: &AccountId, account: &AccountId) -> DispatchResult;

    fn is_whitelisted(account: &AccountId) -> bool;

    fn order(order_id: OrderId) -> Option<Order<AccountId>>;

    /// Number of orders ever recorded, which is also the next id.
    fn orders_count() -> OrderId;
}

/// Read access to the registry of named accounts.
pub trait NamedAccounts<AccountId> {
    fn account(role: Role) -> Option<AccountId>;
}

/// Balance ledger of the sale token.
pub trait TokenLedger<AccountId> {
    /// Moves `amount` from `caller` to `to`, subject to the token's unlock rules.
    fn transfer(caller: &AccountId, to: &AccountId, amount: u128) -> DispatchResult;

    fn balance_of(account: &AccountId) -> u128;
}

/// Whether `account` is the all-zero account, the equivalent of `address(0)`.
pub fn is_zero_account<AccountId: Decode + PartialEq>(account: &AccountId) -> bool {
    AccountId::decode(&mut TrailingZeroInput::zeroes()).map_or(false, |zero| &zero == account)
}
