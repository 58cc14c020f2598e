use crate as pallet_token_sale;
use frame_support::{
    derive_impl, parameter_types,
    traits::{ConstU128, ConstU32, ConstU64, Nothing},
    PalletId,
};
use sp_core::H256;
use sp_runtime::{
    traits::{BlakeTwo256, IdentityLookup},
    BuildStorage,
};

type Block = frame_system::mocking::MockBlock<Test>;

// Configure a mock runtime to test the pallet.
frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Balances: pallet_balances,
        SaleStorage: pallet_sale_storage,
        SaleToken: pallet_sale_token,
        TokenSale: pallet_token_sale,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type BaseCallFilter = frame_support::traits::Everything;
    type BlockWeights = ();
    type BlockLength = ();
    type DbWeight = ();
    type RuntimeOrigin = RuntimeOrigin;
    type RuntimeCall = RuntimeCall;
    type Nonce = u64;
    type Hash = H256;
    type Hashing = BlakeTwo256;
    type AccountId = u64;
    type Lookup = IdentityLookup<Self::AccountId>;
    type Block = Block;
    type RuntimeEvent = RuntimeEvent;
    type BlockHashCount = ConstU64<250>;
    type Version = ();
    type PalletInfo = PalletInfo;
    type AccountData = pallet_balances::AccountData<u128>;
    type OnNewAccount = ();
    type OnKilledAccount = ();
    type SystemWeightInfo = ();
    type SS58Prefix = ();
    type OnSetCode = ();
    type MaxConsumers = ConstU32<16>;
}

impl pallet_timestamp::Config for Test {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<1>;
    type WeightInfo = ();
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Test {
    type Balance = u128;
    type ExistentialDeposit = ConstU128<1>;
    type AccountStore = System;
}

impl pallet_sale_storage::Config for Test {}

/// One token, and one unit of the native currency, in base units.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

parameter_types! {
    pub const TotalSupply: u128 = 10_000_000 * UNIT;
    pub const SaleSupply: u128 = 6_000_000 * UNIT;
    pub const BountySupply: u128 = 300_000 * UNIT;
    pub const ReserveSupply: u128 = 1_500_000 * UNIT;
    pub const BrokerReserveSupply: u128 = 700_000 * UNIT;
    pub const TeamSupply: u128 = 1_500_000 * UNIT;
    pub const MinHolding: u128 = UNIT / 10;
}

impl pallet_sale_token::Config for Test {
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
    pub const OracleAccount: u64 = 9;
    pub const SalePalletId: PalletId = PalletId(*b"py/tksal");
    pub const HighBonusThreshold: u128 = 100 * UNIT;
    pub const LowBonusThreshold: u128 = 50 * UNIT;
}

/// Signed origin of the exchange-rate oracle.
pub struct EnsureOracle;
impl frame_support::traits::EnsureOrigin<RuntimeOrigin> for EnsureOracle {
    type Success = u64;

    fn try_origin(o: RuntimeOrigin) -> Result<Self::Success, RuntimeOrigin> {
        match o.clone().into() {
            Ok(frame_system::RawOrigin::Signed(account)) if account == OracleAccount::get() => {
                Ok(account)
            }
            _ => Err(o),
        }
    }

    #[cfg(feature = "runtime-benchmarks")]
    fn try_successful_origin() -> Result<RuntimeOrigin, ()> {
        Ok(RuntimeOrigin::signed(OracleAccount::get()))
    }
}

impl pallet_token_sale::Config for Test {
    type Currency = Balances;
    type Ledger = SaleStorage;
    type Token = SaleToken;
    type Time = Timestamp;
    type OracleOrigin = EnsureOracle;
    type PalletId = SalePalletId;
    type TokensHardCap = SaleSupply;
    type TokenPrice = ConstU128<3>;
    type RateExponent = ConstU32<4>;
    type HighBonusThreshold = HighBonusThreshold;
    type LowBonusThreshold = LowBonusThreshold;
    type MaxPreSaleAllocations = ConstU32<16>;
}

pub const OWNER: u64 = 1;
pub const WALLET: u64 = 2;
pub const FUNDER1: u64 = 3;
pub const FUNDER2: u64 = 4;
pub const FUNDER3: u64 = 5;
pub const FUNDER4: u64 = 6;
pub const FUNDER5: u64 = 7;
pub const STRANGER: u64 = 8;
pub const ORACLE: u64 = 9;
pub const BOUNTY: u64 = 10;
pub const RESERVE: u64 = 11;
pub const BROKER_RESERVE: u64 = 12;
pub const TEAM: u64 = 13;

pub const FUNDERS: [u64; 5] = [FUNDER1, FUNDER2, FUNDER3, FUNDER4, FUNDER5];
pub const INITIAL_BALANCE: u128 = 1_000 * UNIT;
/// The wallet must be a live account before `init`
pub const WALLET_BALANCE: u128 = UNIT;

pub const START: u64 = 1_522_155_720;
pub const BONUS_CHANGE: u64 = 1_530_999_000;
pub const END: u64 = 1_539_999_000;
pub const FIRST_UNLOCK: u64 = 1_523_836_800;
pub const SECOND_UNLOCK: u64 = 1_539_648_000;

/// With a price of 3 and four rate decimals this rate buys one token per unit
/// of funds, before the bonus.
pub const PAR_RATE: u128 = 30_000;

/// Move the chain clock to `secs` seconds since the Unix epoch.
pub fn set_now(secs: u64) {
    Timestamp::set_timestamp(secs * 1_000);
}

fn build(init: bool) -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_balances::GenesisConfig::<Test> {
        balances: FUNDERS
            .iter()
            .map(|funder| (*funder, INITIAL_BALANCE))
            .chain([(WALLET, WALLET_BALANCE)])
            .collect(),
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_sale_storage::GenesisConfig::<Test> {
        owner: Some(OWNER),
        bounty: Some(BOUNTY),
        reserve: Some(RESERVE),
        broker_reserve: Some(BROKER_RESERVE),
        team: Some(TEAM),
        whitelisted: vec![],
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_sale_token::GenesisConfig::<Test> {
        owner: Some(OWNER),
        first_unlock_time: FIRST_UNLOCK,
        second_unlock_time: SECOND_UNLOCK,
        ico: None,
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_token_sale::GenesisConfig::<Test> { owner: Some(OWNER) }
        .assimilate_storage(&mut t)
        .unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        set_now(START - 1_000);

        // Deployment: the sale account coordinates the token and owns it and the ledger
        let sale = TokenSale::account_id();
        let owner = RuntimeOrigin::signed(OWNER);
        SaleToken::set_ico(owner.clone(), sale).unwrap();
        SaleStorage::set_ico_account(owner.clone(), sale).unwrap();
        SaleStorage::transfer_ownership(owner.clone(), sale).unwrap();
        SaleToken::allocate_service_tokens(owner.clone()).unwrap();
        SaleToken::allocate_ico_tokens(owner.clone()).unwrap();
        SaleToken::transfer_ownership(owner.clone(), sale).unwrap();
        if init {
            TokenSale::init(owner, START, BONUS_CHANGE, END, WALLET).unwrap();
        }
    });
    ext
}

// Build genesis storage and run the deployment steps.
pub fn new_test_ext() -> sp_io::TestExternalities {
    build(true)
}

/// Deployed, but `init` was not called.
pub fn uninitialized_test_ext() -> sp_io::TestExternalities {
    build(false)
}

/// Whitelist `FUNDERS` and open the sale.
pub fn open_sale() {
    for funder in FUNDERS {
        TokenSale::add_to_whitelist(RuntimeOrigin::signed(OWNER), funder).unwrap();
    }
    set_now(START);
}
