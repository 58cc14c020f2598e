#![cfg_attr(not(feature = "std"), no_std)]

//! Runtime composing the token sale pallets with timestamp, balances and sudo.
//!
//! The exchange-rate oracle acts through root: rate answers and the unsold
//! allocation trigger are submitted via sudo.

use frame_support::{
    construct_runtime, derive_impl, parameter_types,
    traits::{ConstU128, ConstU32, ConstU64, Nothing},
    PalletId,
};
use frame_system::EnsureRoot;
use sp_runtime::{
    generic,
    traits::{AccountIdLookup, BlakeTwo256, IdentifyAccount, Verify},
    MultiAddress, MultiSignature,
};


pub type Signature = MultiSignature;
pub type AccountId = <<Signature as Verify>::Signer as IdentifyAccount>::AccountId;
pub type Balance = u128;
pub type BlockNumber = u32;
pub type Nonce = u32;

pub type Address = MultiAddress<AccountId, ()>;
pub type Header = generic::Header<BlockNumber, BlakeTwo256>;
pub type TxExtension = (
    frame_system::CheckNonZeroSender<Runtime>,
    frame_system::CheckNonce<Runtime>,
    frame_system::CheckWeight<Runtime>,
);
pub type UncheckedExtrinsic =
    generic::UncheckedExtrinsic<Address, RuntimeCall, Signature, TxExtension>;
pub type Block = generic::Block<Header, UncheckedExtrinsic>;

/// One unit of the native currency, 18 decimals.
pub const UNIT: Balance = 1_000_000_000_000_000_000;

/// One sale token, 18 decimals.
pub const TOKEN: u128 = 1_000_000_000_000_000_000;

construct_runtime!(
    pub enum Runtime {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Balances: pallet_balances,
        Sudo: pallet_sudo,
        SaleStorage: pallet_sale_storage,
        SaleToken: pallet_sale_token,
        TokenSale: pallet_token_sale,
    }
);

#[derive_impl(frame_system::config_preludes::SolochainDefaultConfig)]
impl frame_system::Config for Runtime {
    type Block = Block;
    type AccountId = AccountId;
    type Nonce = Nonce;
    type Lookup = AccountIdLookup<AccountId, ()>;
    type AccountData = pallet_balances::AccountData<Balance>;
    type BlockHashCount = ConstU32<2400>;
}

impl pallet_timestamp::Config for Runtime {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<3000>;
    type WeightInfo = ();
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Runtime {
    type Balance = Balance;
    type ExistentialDeposit = ConstU128<{ UNIT / 1_000 }>;
    type AccountStore = System;
}

#[derive_impl(pallet_sudo::config_preludes::TestDefaultConfig)]
impl pallet_sudo::Config for Runtime {}

impl pallet_sale_storage::Config for Runtime {}

parameter_types! {
    pub const TotalSupply: u128 = 10_000_000 * TOKEN;
    pub const SaleSupply: u128 = 6_000_000 * TOKEN;
    pub const BountySupply: u128 = 300_000 * TOKEN;
    pub const ReserveSupply: u128 = 1_500_000 * TOKEN;
    pub const BrokerReserveSupply: u128 = 700_000 * TOKEN;
    pub const TeamSupply: u128 = 1_500_000 * TOKEN;
    pub const MinHolding: u128 = TOKEN / 10;
}

impl pallet_sale_token::Config for Runtime {
    type Registry = SaleStorage;
    type Time = Timestamp;
    type SecondStageLocked = Nothing;
    type TotalSupply = TotalSupply;
    type SaleSupply = SaleSupply;
    type BountySupply = BountySupply;
    type ReserveSupply = ReserveSupply;
    type BrokerReserveSupply = BrokerReserveSupply;
    type TeamSupply = TeamSupply;
    type MinHolding = MinHolding;
}

parameter_types! {
    pub const SalePalletId: PalletId = PalletId(*b"py/tksal");
    pub const HighBonusThreshold: Balance = 100 * UNIT;
    pub const LowBonusThreshold: Balance = 50 * UNIT;
}

impl pallet_token_sale::Config for Runtime {
    type Currency = Balances;
    type Ledger = SaleStorage;
    type Token = SaleToken;
    type Time = Timestamp;
    type OracleOrigin = EnsureRoot<AccountId>;
    type PalletId = SalePalletId;
    type TokensHardCap = SaleSupply;
    type TokenPrice = ConstU128<3>;
    type RateExponent = ConstU32<4>;
    type HighBonusThreshold = HighBonusThreshold;
    type LowBonusThreshold = LowBonusThreshold;
    type MaxPreSaleAllocations = ConstU32<64>;
}
