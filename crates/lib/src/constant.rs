pub const MIST_PER_SUI: u64 = 1_000_000_000;

// User keeps 99% of the storage rebate; the remaining 1% is burned by the protocol.
// Kept as an integer ratio so rebate math floors exactly.
pub const REBATE_NUMERATOR: u64 = 99;
pub const REBATE_DENOMINATOR: u64 = 100;

// Protocol fee: 13.69% (in basis points) of the total storage rebate, paid to the fee recipient
pub const FEE_RATE_BPS: u64 = 1369;
pub const BPS_DENOMINATOR: u64 = 10_000;
pub const DEFAULT_FEE_RECIPIENT: &str =
    "0x0154543c5e9d2db3b12d5b761b204b06620f35561b6065f5a793889fcd148eb1";

// Batch limits
pub const MAX_ACTIONS_PER_BATCH: usize = 50;
// Max coins merged together per coin type, to stay under protocol limits
pub const MAX_MERGES_PER_BATCH: usize = 100;

// Gas
pub const DRY_RUN_GAS_BUDGET_MIST: u64 = 50_000_000;
// When taking the fee from the gas coin, leave at least this much for gas so the split doesn't fail
pub const GAS_RESERVE_FOR_FEE_MIST: u64 = 1_000_000;
// When the dry run reports gas cost <= 0, recoup up to this much instead
pub const RECOUP_FALLBACK_GAS_MIST: u64 = 1_500_000;
pub const DEFAULT_REFERENCE_GAS_PRICE_MIST: u64 = 1_000;

// Estimated gas (mist) per action kind, used for net-gain math before the dry run
pub const ESTIMATED_GAS_MERGE_COINS: u64 = 500;
pub const ESTIMATED_GAS_DESTROY_ZERO: u64 = 300;
pub const ESTIMATED_GAS_CLOSE_KIOSK: u64 = 2_000;
pub const ESTIMATED_GAS_BURN_PER_OBJECT: u64 = 1_200_000;

// Framework types and entry points
pub const SUI_COIN_TYPE: &str = "0x2::coin::Coin<0x2::sui::SUI>";
pub const COIN_TYPE: &str = "0x2::coin::Coin";
pub const KIOSK_TYPE: &str = "0x2::kiosk::Kiosk";
pub const KIOSK_OWNER_CAP_TYPE: &str = "0x2::kiosk::KioskOwnerCap";
pub const KIOSK_CLOSE_TARGET: &str = "0x2::kiosk::close_and_withdraw";
pub const COIN_DESTROY_ZERO_TARGET: &str = "0x2::coin::destroy_zero";

// Candidate entry-point names probed during burn discovery
pub const BURN_FUNCTION_NAMES: [&str; 3] = ["burn", "delete", "destroy"];

// Core protected types: never suggest burn/destroy for these, even if a burn entry exists
pub const CORE_PROTECTED_TYPES: [&str; 9] = [
    "0x2::staking_pool::StakedSui",
    "0x2::staking_pool::StakedSuiV2",
    "0x2::kiosk::KioskOwnerCap",
    "0x2::kiosk::Kiosk",
    "0x2::suins::SuinsRegistration",
    "0x2::domain::Domain",
    "0x2::display::Display",
    "0x2::package::UpgradeCap",
    "0x2::package::Publisher",
];

// Scanning
pub const OWNED_OBJECTS_PAGE_SIZE: usize = 50;
// Concurrent module-introspection lookups within this window collapse into one batch
pub const BURN_MODULE_DEBOUNCE_MS: u64 = 100;

// Execution
pub const EXECUTION_SAFETY_TIMEOUT_SECS: u64 = 120;
pub const CONFIRMATION_TIMEOUT_MS: u64 = 30_000;
pub const CONFIRMATION_POLL_INTERVAL_MS: u64 = 500;
pub const RPC_REQUEST_TIMEOUT_SECS: u64 = 90;

// Blocklists (fetched at most once per process lifetime)
pub const DEFAULT_COIN_BLOCKLIST_URL: &str =
    "https://raw.githubusercontent.com/MystenLabs/wallet_blocklist/main/blocklists/coin-list.json";
pub const DEFAULT_OBJECT_BLOCKLIST_URL: &str =
    "https://raw.githubusercontent.com/MystenLabs/wallet_blocklist/main/blocklists/object-list.json";

// Explanation service
pub const EXPLAIN_REQUESTS_PER_MINUTE: u64 = 10;
pub const EXPLAIN_REQUESTS_PER_DAY: u64 = 250;
pub const EXPLAIN_MAX_JSON_LENGTH: usize = 900_000;
pub const DEFAULT_EXPLAIN_MODEL_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
pub const DEFAULT_EXPLAIN_TIMESTAMP_FILE: &str = ".skitty_explain_ts.json";

// RPC server
pub const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // 2 MB
pub const DEFAULT_RPC_PORT: u16 = 8080;
pub const DEFAULT_RATE_LIMIT: u64 = 100;

// Environment variables for key material
pub const SPONSOR_PRIVATE_KEY_ENV: &str = "SPONSOR_PRIVATE_KEY";
pub const USER_PRIVATE_KEY_ENV: &str = "USER_PRIVATE_KEY";
pub const EXPLAIN_API_KEY_ENV: &str = "EXPLAIN_API_KEY";
