use crate as pallet_sale_token;
use frame_support::{
    derive_impl, parameter_types,
    traits::{ConstU32, ConstU64, Contains},
};
use sale_primitives::{NamedAccounts, Role};
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
        SaleToken: pallet_sale_token,
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
    type AccountData = ();
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

pub const OWNER: u64 = 1;
pub const ICO: u64 = 2;
pub const GUY1: u64 = 3;
pub const GUY2: u64 = 4;
pub const GUY3: u64 = 5;
pub const BOUNTY: u64 = 10;
pub const RESERVE: u64 = 11;
pub const BROKER_RESERVE: u64 = 12;
pub const TEAM: u64 = 13;

/// One token in base units.
pub const TOKEN: u128 = 1_000_000_000_000_000_000;

pub const FIRST_UNLOCK: u64 = 1_523_836_800;
pub const SECOND_UNLOCK: u64 = 1_539_648_000;
pub const BEFORE_UNLOCK: u64 = 1_522_155_720;

parameter_types! {
    pub const TotalSupply: u128 = 10_000_000 * TOKEN;
    pub const SaleSupply: u128 = 6_000_000 * TOKEN;
    pub const BountySupply: u128 = 300_000 * TOKEN;
    pub const ReserveSupply: u128 = 1_500_000 * TOKEN;
    pub const BrokerReserveSupply: u128 = 700_000 * TOKEN;
    pub const TeamSupply: u128 = 1_500_000 * TOKEN;
    pub const MinHolding: u128 = TOKEN / 10;
    // Lets tests drop the team account from the registry
    pub storage TeamRegistered: bool = true;
}

pub struct TestRegistry;
impl NamedAccounts<u64> for TestRegistry {
    fn account(role: Role) -> Option<u64> {
        match role {
            Role::Bounty => Some(BOUNTY),
            Role::Reserve => Some(RESERVE),
            Role::BrokerReserve => Some(BROKER_RESERVE),
            Role::Team => TeamRegistered::get().then_some(TEAM),
            Role::Ico => None,
        }
    }
}

/// Keeps the team share locked until the second unlock time.
pub struct TeamLocked;
impl Contains<u64> for TeamLocked {
    fn contains(account: &u64) -> bool {
        *account == TEAM
    }
}

impl pallet_sale_token::Config for Test {
    type Registry = TestRegistry;
    type Time = Timestamp;
    type SecondStageLocked = TeamLocked;
    type TotalSupply = TotalSupply;
    type SaleSupply = SaleSupply;
    type BountySupply = BountySupply;
    type ReserveSupply = ReserveSupply;
    type BrokerReserveSupply = BrokerReserveSupply;
    type TeamSupply = TeamSupply;
    type MinHolding = MinHolding;
}

/// Move the chain clock to `secs` seconds since the Unix epoch.
pub fn set_now(secs: u64) {
    Timestamp::set_timestamp(secs * 1_000);
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_sale_token::GenesisConfig::<Test> {
        owner: Some(OWNER),
        first_unlock_time: FIRST_UNLOCK,
        second_unlock_time: SECOND_UNLOCK,
        ico: None,
    }
    .assimilate_storage(&mut t)
    .unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        set_now(BEFORE_UNLOCK);
    });
    ext
}

/// Test externalities with the sale coordinator set and both allocations done.
pub fn allocated_test_ext() -> sp_io::TestExternalities {
    let mut ext = new_test_ext();
    ext.execute_with(|| {
        SaleToken::set_ico(RuntimeOrigin::signed(OWNER), ICO).unwrap();
        SaleToken::allocate_service_tokens(RuntimeOrigin::signed(OWNER)).unwrap();
        SaleToken::allocate_ico_tokens(RuntimeOrigin::signed(OWNER)).unwrap();
    });
    ext
}
