use anyhow::{Result, bail};
use clap::Args;
use state_file::StateFile;
use std::path::PathBuf;

pub const NETWORK_KEY: &str = "SUI_NETWORK";
pub const MNEMONIC_KEY: &str = "SUI_MNEMONIC";
pub const ACCOUNT_INDEX_KEY: &str = "SUI_ACCOUNT_INDEX";
pub const KEYSTORE_KEY: &str = "SUI_KEYSTORE";
pub const GAS_BUDGET_KEY: &str = "SUI_GAS_BUDGET";

/// Network and signer arguments shared by every command that talks to a node.
#[derive(Args, Debug, Clone, Default)]
pub struct ChainArgs {
    /// Network name (`Local`, `Devnet`) or a full RPC URL
    #[arg(long, env = NETWORK_KEY)]
    pub network: Option<String>,

    /// BIP-39 mnemonic used to derive the signing key
    #[arg(long, env = MNEMONIC_KEY, hide_env_values = true, conflicts_with = "test_account")]
    pub mnemonic: Option<String>,

    /// Account index in the derivation path, or entry index in the keystore
    #[arg(long, env = ACCOUNT_INDEX_KEY)]
    pub account_index: Option<u32>,

    /// Path to a Sui CLI keystore file
    #[arg(long, env = KEYSTORE_KEY)]
    pub keystore: Option<PathBuf>,

    /// Sign with the well-known placeholder test account (never for real funds)
    #[arg(long)]
    pub test_account: bool,

    /// Gas budget in MIST for every submitted transaction
    #[arg(long, env = GAS_BUDGET_KEY)]
    pub gas_budget: Option<u64>,
}

/// Where the signing key comes from once arguments and state are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerSource {
    Mnemonic { phrase: String, account_index: u32 },
    Keystore { path: Option<PathBuf>, index: u32 },
    TestAccount { account_index: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub network: String,
    pub signer: SignerSource,
    pub gas_budget: u64,
}

impl ChainArgs {
    /// Merge with priority: CLI/env -> state file -> defaults.
    pub fn resolve(
        self,
        state_file: &StateFile,
        default_network: &str,
        default_gas_budget: u64,
    ) -> Result<ChainConfig> {
        let network = self
            .network
            .or_else(|| state_file.load_value(NETWORK_KEY))
            .unwrap_or_else(|| default_network.to_string());
        if network.trim().is_empty() {
            bail!("network must not be empty");
        }

        let account_index = match self.account_index {
            Some(index) => index,
            None => match state_file.load_value(ACCOUNT_INDEX_KEY) {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid {ACCOUNT_INDEX_KEY} '{raw}': {e}"))?,
                None => 0,
            },
        };

        let gas_budget = match self.gas_budget {
            Some(budget) => budget,
            None => match state_file.load_value(GAS_BUDGET_KEY) {
                Some(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("invalid {GAS_BUDGET_KEY} '{raw}': {e}"))?,
                None => default_gas_budget,
            },
        };
        if gas_budget == 0 {
            bail!("gas budget must be greater than zero");
        }

        let signer = if self.test_account {
            SignerSource::TestAccount { account_index }
        } else if let Some(phrase) = self
            .mnemonic
            .or_else(|| state_file.load_value(MNEMONIC_KEY))
        {
            SignerSource::Mnemonic {
                phrase,
                account_index,
            }
        } else {
            SignerSource::Keystore {
                path: self
                    .keystore
                    .or_else(|| state_file.load_value(KEYSTORE_KEY).map(PathBuf::from)),
                index: account_index,
            }
        };

        Ok(ChainConfig {
            network,
            signer,
            gas_budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state(name: &str) -> StateFile {
        let path = std::env::temp_dir().join(format!(
            "chain_args_{}_{}.env",
            name,
            std::process::id()
        ));
        let state = StateFile::new(path);
        state.delete().unwrap();
        state
    }

    #[test]
    fn test_defaults_fall_back_to_keystore() {
        let state = empty_state("defaults");
        let config = ChainArgs::default()
            .resolve(&state, "Devnet", 10_000_000)
            .unwrap();

        assert_eq!(config.network, "Devnet");
        assert_eq!(config.gas_budget, 10_000_000);
        assert_eq!(
            config.signer,
            SignerSource::Keystore {
                path: None,
                index: 0
            }
        );
    }

    #[test]
    fn test_cli_overrides_state_file() {
        let state = empty_state("override");
        state.save_value(NETWORK_KEY, "Local").unwrap();
        state.save_value(GAS_BUDGET_KEY, "5000").unwrap();

        let args = ChainArgs {
            network: Some("http://10.0.0.1:9000".into()),
            ..Default::default()
        };
        let config = args.resolve(&state, "Devnet", 10_000_000).unwrap();

        assert_eq!(config.network, "http://10.0.0.1:9000");
        assert_eq!(config.gas_budget, 5000);
        state.delete().unwrap();
    }

    #[test]
    fn test_mnemonic_from_state_file() {
        let state = empty_state("mnemonic");
        state.save_value(MNEMONIC_KEY, "word ".repeat(12).trim()).unwrap();
        state.save_value(ACCOUNT_INDEX_KEY, "2").unwrap();

        let config = ChainArgs::default()
            .resolve(&state, "Devnet", 1)
            .unwrap();
        match config.signer {
            SignerSource::Mnemonic { account_index, .. } => assert_eq!(account_index, 2),
            other => panic!("unexpected signer source {other:?}"),
        }
        state.delete().unwrap();
    }

    #[test]
    fn test_test_account_wins() {
        let state = empty_state("test_account");
        let args = ChainArgs {
            test_account: true,
            ..Default::default()
        };
        let config = args.resolve(&state, "Local", 1).unwrap();
        assert_eq!(
            config.signer,
            SignerSource::TestAccount { account_index: 0 }
        );
    }

    #[test]
    fn test_rejects_zero_gas_budget() {
        let state = empty_state("zero_gas");
        let args = ChainArgs {
            gas_budget: Some(0),
            ..Default::default()
        };
        assert!(args.resolve(&state, "Local", 1).is_err());
    }
}
