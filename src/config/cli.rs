use anyhow::{Context, Result};
use chain_args::{ChainArgs, ChainConfig, SignerSource, NETWORK_KEY};
use clap::{Parser, Subcommand};
use state_file::StateFile;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::consts::{DEFAULT_GAS_BUDGET, DEFAULT_NETWORK, STATE_FILE_CLI};
use crate::gateway::resolve_url;
use crate::rpc::normalize_object_id;
use crate::wallet::{CredentialProvider, KeystoreCredential, MnemonicCredential};

/// Accept `0x`-prefixed or bare hex IDs and store them in canonical form.
fn parse_object_id(raw: &str) -> Result<String, String> {
    normalize_object_id(raw).ok_or_else(|| format!("'{raw}' is not a hex object ID or address"))
}

/// CLI arguments for the coin client
#[derive(Parser, Debug)]
#[command(name = "coin_cli")]
#[command(about = "SuiLipse coin client - mint, transfer and merge coins on Sui", long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Path to the state file holding persisted settings
    #[arg(long, env = "SUI_STATE_FILE", default_value = STATE_FILE_CLI)]
    pub state_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the signer address, active network and SUI balance
    Account,

    /// List networks or select the active one
    Network {
        #[command(subcommand)]
        command: NetworkCommand,
    },

    /// Look up a coin or treasury cap object
    Object {
        #[arg(value_parser = parse_object_id)]
        object_id: String,
    },

    /// Mint new coins with a treasury cap and send them to a recipient
    MintAndTransfer {
        /// TreasuryCap<T> object ID
        #[arg(value_parser = parse_object_id)]
        cap_id: String,
        /// Amount in the coin's smallest unit
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        amount: u64,
        #[arg(value_parser = parse_object_id)]
        recipient: String,
    },

    /// Send a coin, or part of it, to a recipient
    Transfer {
        #[arg(value_parser = parse_object_id)]
        coin_id: String,
        #[arg(value_parser = parse_object_id)]
        recipient: String,
        /// Amount to split off and send; the whole coin when omitted
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        amount: Option<u64>,
    },

    /// Merge one coin into another of the same type
    Merge {
        /// Coin that survives the merge
        #[arg(value_parser = parse_object_id)]
        primary: String,
        /// Coin absorbed into the primary
        #[arg(value_parser = parse_object_id)]
        to_merge: String,
    },

    /// Constant-product pool calculations
    Amm {
        #[command(subcommand)]
        command: AmmCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommand {
    /// Show the named networks and the current selection
    List,
    /// Select a network by name or RPC URL and remember it
    Use { endpoint: String },
}

#[derive(Subcommand, Debug)]
pub enum AmmCommand {
    /// Amount of B matching an amount of A at the reserve ratio
    Quote {
        reserve_a: u64,
        reserve_b: u64,
        input_a: u64,
    },
    /// Swap output for an input amount
    Input {
        dx: u64,
        reserve_x: u64,
        reserve_y: u64,
        /// Fee in basis points
        #[arg(long, default_value_t = 30)]
        fee_bps: u64,
    },
    /// LP tokens minted for a deposit
    Lp {
        reserve_x: u64,
        reserve_y: u64,
        dx: u64,
        dy: u64,
        lp_supply: u64,
    },
    /// Reserves returned for burning LP tokens
    Withdraw {
        reserve_x: u64,
        reserve_y: u64,
        lp_value: u64,
        lp_supply: u64,
    },
}

/// Coin client configuration with all values resolved
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub network: String,
    pub signer: SignerSource,
    pub gas_budget: u64,
    pub state_file: PathBuf,
}

impl CliConfig {
    /// Load configuration with priority: CLI/env -> state file -> defaults
    pub fn load(chain: ChainArgs, state_file: PathBuf) -> Result<Self> {
        let state = StateFile::new(&state_file);
        let ChainConfig {
            network,
            signer,
            gas_budget,
        } = chain.resolve(&state, DEFAULT_NETWORK, DEFAULT_GAS_BUDGET)?;

        info!(
            "Loaded CliConfig: network={network}, rpc_url={}, gas_budget={gas_budget}, state_file={}",
            resolve_url(&network),
            state_file.display()
        );
        Ok(CliConfig {
            network,
            signer,
            gas_budget,
            state_file,
        })
    }

    /// Build the credential provider for the configured signer.
    pub fn credential(&self) -> Result<Arc<dyn CredentialProvider>> {
        let provider: Arc<dyn CredentialProvider> = match &self.signer {
            SignerSource::TestAccount { account_index } => {
                Arc::new(MnemonicCredential::test_account(*account_index))
            }
            SignerSource::Mnemonic {
                phrase,
                account_index,
            } => Arc::new(MnemonicCredential::new(phrase.clone(), *account_index)),
            SignerSource::Keystore { path, index } => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => KeystoreCredential::default_path()
                        .context("No --mnemonic, --keystore or --test-account given")?,
                };
                Arc::new(KeystoreCredential::new(path, *index as usize))
            }
        };
        Ok(provider)
    }

    /// Persist the selected network so later runs use it by default.
    pub fn save_network(&self, endpoint: &str) -> Result<()> {
        StateFile::new(&self.state_file).save_value(NETWORK_KEY, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::consts::TEST_MNEMONIC;
    use crate::wallet::SuiKeypair;

    fn temp_state(name: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("coin_cli_{}_{}.env", name, std::process::id()));
        StateFile::new(&path).delete().unwrap();
        path
    }

    #[test]
    fn test_parse_subcommands() {
        let args = CliArgs::try_parse_from([
            "coin_cli",
            "--network",
            "Local",
            "--test-account",
            "transfer",
            "0xc01",
            "0xabc",
            "--amount",
            "400",
        ])
        .unwrap();

        assert_eq!(args.chain.network.as_deref(), Some("Local"));
        assert!(args.chain.test_account);
        match args.command {
            Command::Transfer {
                coin_id,
                recipient,
                amount,
            } => {
                assert_eq!(
                    coin_id,
                    "0x0000000000000000000000000000000000000000000000000000000000000c01"
                );
                assert!(recipient.ends_with("abc"));
                assert_eq!(amount, Some(400));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_ids_and_zero_amounts() {
        assert!(CliArgs::try_parse_from(["coin_cli", "object", "0xnothex"]).is_err());
        assert!(
            CliArgs::try_parse_from(["coin_cli", "mint-and-transfer", "0x1", "0", "0x2"]).is_err()
        );
        assert!(CliArgs::try_parse_from([
            "coin_cli",
            "--mnemonic",
            "a b c",
            "--test-account",
            "account"
        ])
        .is_err());
    }

    #[test]
    fn test_load_and_save_network() {
        let path = temp_state("network");
        let config = CliConfig::load(ChainArgs::default(), path.clone()).unwrap();
        assert_eq!(config.network, DEFAULT_NETWORK);
        assert_eq!(config.gas_budget, DEFAULT_GAS_BUDGET);

        config.save_network("Local").unwrap();
        let reloaded = CliConfig::load(ChainArgs::default(), path.clone()).unwrap();
        assert_eq!(reloaded.network, "Local");

        StateFile::new(&path).delete().unwrap();
    }

    #[test]
    fn test_credential_for_test_account() {
        let path = temp_state("credential");
        let args = ChainArgs {
            test_account: true,
            ..Default::default()
        };
        let config = CliConfig::load(args, path).unwrap();
        let keypair = config.credential().unwrap().keypair().unwrap();
        let expected = SuiKeypair::from_mnemonic(TEST_MNEMONIC, 0).unwrap();
        assert_eq!(keypair.address(), expected.address());
    }
}
