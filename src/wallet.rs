use crate::config::consts::{MIST_PER_SUI, SUI_COIN_TYPE_INDEX, TEST_MNEMONIC};
use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use term_table::row::Row;
use term_table::table_cell::{Alignment as CellAlignment, TableCell};
use term_table::{Table, TableStyle};
use tracing::{info, warn};

type Blake2b256 = Blake2b<U32>;
type HmacSha512 = Hmac<Sha512>;

/// Signature scheme flag for Ed25519 keys and signatures.
const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data: scope, version, app id.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

const HARDENED: u32 = 0x8000_0000;

/// Supplies the key that signs every transaction of a coin client.
pub trait CredentialProvider: Send + Sync {
    fn keypair(&self) -> Result<SuiKeypair>;
}

/// An Ed25519 keypair with Sui address derivation and transaction signing.
#[derive(Clone)]
pub struct SuiKeypair {
    signing_key: SigningKey,
}

impl fmt::Debug for SuiKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiKeypair")
            .field("address", &self.address())
            .finish()
    }
}

impl SuiKeypair {
    pub fn from_secret(secret: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(secret),
        }
    }

    /// Derive the key at `m/44'/784'/{account_index}'/0'/0'` (SLIP-0010).
    pub fn from_mnemonic(phrase: &str, account_index: u32) -> Result<Self> {
        let mnemonic = bip39::Mnemonic::parse(phrase).context("Invalid mnemonic phrase")?;
        let seed = mnemonic.to_seed("");
        let path = [44, SUI_COIN_TYPE_INDEX, account_index, 0, 0];
        let secret = slip10_derive(&seed, &path)?;
        Ok(Self::from_secret(&secret))
    }

    /// Parse one keystore entry: base64 of `flag || secret`.
    pub fn from_keystore_entry(entry: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(entry.trim())
            .context("Keystore entry is not valid base64")?;
        match bytes.split_first() {
            Some((&ED25519_FLAG, secret)) if secret.len() == 32 => {
                let mut key = [0u8; 32];
                key.copy_from_slice(secret);
                Ok(Self::from_secret(&key))
            }
            Some((&ED25519_FLAG, secret)) => {
                bail!("Ed25519 keystore entry has {} key bytes, expected 32", secret.len())
            }
            Some((flag, _)) => bail!("Unsupported key scheme flag {flag:#04x}"),
            None => bail!("Empty keystore entry"),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// `0x` + hex(BLAKE2b-256(flag || public key)).
    pub fn address(&self) -> String {
        let mut hasher = Blake2b256::new();
        hasher.update([ED25519_FLAG]);
        hasher.update(self.public_key());
        format!("0x{}", hex::encode(hasher.finalize()))
    }

    /// Sign base64 transaction bytes and return the serialized signature
    /// `base64(flag || signature || public key)` expected by the node.
    pub fn sign_transaction(&self, tx_bytes_b64: &str) -> Result<String> {
        let tx_bytes = BASE64
            .decode(tx_bytes_b64)
            .context("Transaction bytes are not valid base64")?;

        let mut hasher = Blake2b256::new();
        hasher.update(TRANSACTION_INTENT);
        hasher.update(&tx_bytes);
        let digest = hasher.finalize();

        let signature = self.signing_key.sign(&digest);
        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());
        Ok(BASE64.encode(serialized))
    }
}

/// SLIP-0010 Ed25519 derivation. Every level is hardened.
fn slip10_derive(seed: &[u8], path: &[u32]) -> Result<[u8; 32]> {
    let (mut key, mut chain_code) = hmac_split(b"ed25519 seed", &[seed])?;
    for index in path {
        let hardened = (index | HARDENED).to_be_bytes();
        (key, chain_code) = hmac_split(&chain_code, &[&[0u8], &key, &hardened])?;
    }
    Ok(key)
}

fn hmac_split(key: &[u8], data: &[&[u8]]) -> Result<([u8; 32], [u8; 32])> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|_| anyhow!("Invalid HMAC key length"))?;
    for chunk in data {
        mac.update(chunk);
    }
    let output = mac.finalize().into_bytes();
    let mut left = [0u8; 32];
    let mut right = [0u8; 32];
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..]);
    Ok((left, right))
}

// ============================================================================
// Credential Providers
// ============================================================================

/// Key derived from a BIP-39 phrase.
pub struct MnemonicCredential {
    phrase: String,
    account_index: u32,
}

impl MnemonicCredential {
    pub fn new(phrase: impl Into<String>, account_index: u32) -> Self {
        Self {
            phrase: phrase.into(),
            account_index,
        }
    }

    /// The placeholder account shared by every developer. Never fund it.
    pub fn test_account(account_index: u32) -> Self {
        warn!("Signing with the public test mnemonic; do not use it for real funds");
        Self::new(TEST_MNEMONIC, account_index)
    }
}

impl CredentialProvider for MnemonicCredential {
    fn keypair(&self) -> Result<SuiKeypair> {
        SuiKeypair::from_mnemonic(&self.phrase, self.account_index)
    }
}

/// Key read from a Sui CLI keystore (a JSON array of base64 entries).
pub struct KeystoreCredential {
    path: PathBuf,
    index: usize,
}

impl KeystoreCredential {
    pub fn new(path: impl Into<PathBuf>, index: usize) -> Self {
        Self {
            path: path.into(),
            index,
        }
    }

    /// `~/.sui/sui_config/sui.keystore`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        Ok(home.join(".sui").join("sui_config").join("sui.keystore"))
    }
}

impl CredentialProvider for KeystoreCredential {
    fn keypair(&self) -> Result<SuiKeypair> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read keystore {}", self.path.display()))?;
        let entries: Vec<String> = serde_json::from_str(&raw)
            .with_context(|| format!("Keystore {} is not a JSON array", self.path.display()))?;
        let entry = entries.get(self.index).with_context(|| {
            format!(
                "Keystore {} has {} keys, index {} requested",
                self.path.display(),
                entries.len(),
                self.index
            )
        })?;
        SuiKeypair::from_keystore_entry(entry)
    }
}

impl CredentialProvider for SuiKeypair {
    fn keypair(&self) -> Result<SuiKeypair> {
        Ok(self.clone())
    }
}

// ============================================================================
// Status Banner
// ============================================================================

/// Format MIST as SUI with nine decimals.
pub fn format_sui(mist: u64) -> String {
    format!("{}.{:09}", mist / MIST_PER_SUI, mist % MIST_PER_SUI)
}

/// Log an account banner with the address, network and SUI balance.
pub fn display_wallet_status(address: &str, network: &str, rpc_url: &str, balance_mist: u64) {
    let funded = balance_mist > 0;

    let mut table = Table::new();
    table.style = TableStyle::extended();

    let header = if funded {
        "ACCOUNT READY"
    } else {
        "NO GAS COINS FOUND"
    };
    table.add_row(Row::new(vec![TableCell::builder(header)
        .col_span(2)
        .alignment(CellAlignment::Center)
        .build()]));

    let rows = [
        ("Address", address.to_string()),
        ("Network", network.to_string()),
        ("RPC URL", rpc_url.to_string()),
        ("Balance", format!("{} SUI", format_sui(balance_mist))),
    ];
    for (label, value) in rows {
        table.add_row(Row::new(vec![
            TableCell::builder(label)
                .alignment(CellAlignment::Right)
                .build(),
            TableCell::builder(value)
                .alignment(CellAlignment::Left)
                .build(),
        ]));
    }

    if funded {
        info!("\n{}", table.render());
    } else {
        table.add_row(Row::new(vec![TableCell::builder(
            "Request SUI from the faucet before submitting transactions",
        )
        .col_span(2)
        .alignment(CellAlignment::Center)
        .build()]));
        warn!("\n{}", table.render());
    }
}
