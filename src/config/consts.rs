//! Centralized constants for the coin client.
//!
//! Endpoint URLs, Move call targets and transaction defaults shared by the
//! library and the `coin_cli` binary.

// =============================================================================
// State File Names
// =============================================================================

pub const STATE_FILE_CLI: &str = "suilipse_cli.env";

// =============================================================================
// Network Endpoints
// =============================================================================

pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8080";
pub const DEVNET_RPC_URL: &str = "https://fullnode.devnet.sui.io:443";

/// Network used when neither CLI, env nor state file names one
pub const DEFAULT_NETWORK: &str = "Devnet";

/// Per-request timeout for the JSON-RPC HTTP client
pub const RPC_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Move Call Targets
// =============================================================================

pub const SUI_FRAMEWORK: &str = "0x2";
pub const COIN_MODULE: &str = "coin";
pub const MINT_AND_TRANSFER_FUNCTION: &str = "mint_and_transfer";
pub const PAY_MODULE: &str = "pay";
pub const SPLIT_AND_TRANSFER_FUNCTION: &str = "split_and_transfer";

/// Coin type used to pay for gas
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

// =============================================================================
// Transaction Settings
// =============================================================================

/// Default gas budget in MIST
pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;

/// Number of MIST in one SUI
pub const MIST_PER_SUI: u64 = 1_000_000_000;

// =============================================================================
// Keys
// =============================================================================

/// Sui coin type number in the BIP-44 path `m/44'/784'/{account}'/0'/0'`
pub const SUI_COIN_TYPE_INDEX: u32 = 784;

/// Placeholder account for local testing. Anyone can derive this key.
pub const TEST_MNEMONIC: &str =
    "sorry neither pioneer despair talk taxi eager library lawsuit surround cycle off";
