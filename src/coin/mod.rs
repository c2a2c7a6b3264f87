//! Coin operations against the active network: mint, transfer, merge.
//!
//! Each operation signs with the client's credential and talks to whatever
//! connection the [`ConnectionRegistry`] marks active at call time.

mod tx_submitter;
pub mod type_tag;

use crate::config::consts::{
    COIN_MODULE, MINT_AND_TRANSFER_FUNCTION, PAY_MODULE, SPLIT_AND_TRANSFER_FUNCTION,
    SUI_COIN_TYPE, SUI_FRAMEWORK,
};
use crate::gateway::{Connect, ConnectionRegistry};
use crate::rpc::{
    same_object_id, CoinInfo, MergeCoinsRequest, MoveCallRequest, RpcError, SuiObjectData, SuiRpc,
    TransferObjectRequest,
};
use crate::wallet::{CredentialProvider, SuiKeypair};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};
use tx_submitter::TransactionSubmitter;
use type_tag::{any_coin_type_arg, coin_type_arg, treasury_cap_type_arg};

#[derive(Debug, Error)]
pub enum CoinError {
    #[error("no active network connection; select a network first")]
    NoActiveConnection,
    #[error("object {0} not found")]
    ObjectNotFound(String),
    #[error("object {id} is malformed: {reason}")]
    MalformedObject { id: String, reason: String },
    #[error("object {id} has type {type_string}, expected {expected}")]
    NotACoin {
        id: String,
        type_string: String,
        expected: &'static str,
    },
    #[error("no SUI gas coin available for {0}")]
    NoGasObject(String),
    #[error("coin {id} holds {balance}, cannot send {requested}")]
    InsufficientBalance {
        id: String,
        balance: u64,
        requested: u64,
    },
    #[error("transaction {digest} failed: {error}")]
    ExecutionFailed { digest: String, error: String },
    #[error("credential error: {0:#}")]
    Credential(anyhow::Error),
    #[error(transparent)]
    Rpc(#[from] RpcError),
}

/// Result of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinOutcome {
    pub digest: String,
    /// Net MIST charged for gas; negative when the rebate exceeds the cost.
    pub gas_cost: i128,
    pub created: Vec<String>,
    pub mutated: Vec<String>,
}

/// A coin or treasury cap with its type argument and flattened owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinObjectRef {
    pub id: String,
    pub type_tag: String,
    pub owner: String,
}

/// How a transfer moves value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferPlan {
    WholeObject,
    Split(u64),
}

fn plan_transfer(id: &str, balance: u64, amount: Option<u64>) -> Result<TransferPlan, CoinError> {
    match amount {
        None => Ok(TransferPlan::WholeObject),
        Some(requested) if requested == balance => Ok(TransferPlan::WholeObject),
        Some(requested) if requested < balance => Ok(TransferPlan::Split(requested)),
        Some(requested) => Err(CoinError::InsufficientBalance {
            id: id.to_string(),
            balance,
            requested,
        }),
    }
}

pub struct CoinClient {
    credential: Arc<dyn CredentialProvider>,
    submitter: TransactionSubmitter,
    gas_budget: u64,
}

impl CoinClient {
    pub fn new(
        credential: Arc<dyn CredentialProvider>,
        gas_budget: u64,
        tx_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            credential,
            submitter: TransactionSubmitter::new(tx_lock),
            gas_budget,
        }
    }

    pub fn gas_budget(&self) -> u64 {
        self.gas_budget
    }

    pub fn signer(&self) -> Result<SuiKeypair, CoinError> {
        self.credential.keypair().map_err(CoinError::Credential)
    }

    pub fn signer_address(&self) -> Result<String, CoinError> {
        Ok(self.signer()?.address())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Look up a `Coin<T>` or `TreasuryCap<T>` object.
    pub async fn lookup_coin_object<C>(
        &self,
        registry: &ConnectionRegistry<C>,
        object_id: &str,
    ) -> Result<CoinObjectRef, CoinError>
    where
        C: SuiRpc + Connect,
    {
        let connection = active_connection(registry)?;
        let object = fetch_object(connection.as_ref(), object_id).await?;
        let type_string = object_type(&object)?;
        let type_tag = any_coin_type_arg(type_string).ok_or_else(|| CoinError::NotACoin {
            id: object_id.to_string(),
            type_string: type_string.to_string(),
            expected: "0x2::coin::Coin<T> or 0x2::coin::TreasuryCap<T>",
        })?;
        let owner = object
            .owner
            .as_ref()
            .ok_or_else(|| malformed(object_id, "object has no owner"))?;

        Ok(CoinObjectRef {
            id: object.object_id.clone(),
            type_tag: type_tag.to_string(),
            owner: owner.owner_string(),
        })
    }

    /// SUI coins owned by the signer.
    pub async fn gas_objects<C>(
        &self,
        registry: &ConnectionRegistry<C>,
    ) -> Result<Vec<CoinInfo>, CoinError>
    where
        C: SuiRpc + Connect,
    {
        let address = self.signer_address()?;
        let connection = active_connection(registry)?;
        let rpc = connection.as_ref();

        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = rpc
                .get_coins(&address, SUI_COIN_TYPE, cursor.as_deref())
                .await?;
            coins.extend(page.data);
            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => return Ok(coins),
            }
        }
    }

    /// Total SUI balance of the signer in MIST.
    pub async fn balance<C>(&self, registry: &ConnectionRegistry<C>) -> Result<u64, CoinError>
    where
        C: SuiRpc + Connect,
    {
        let coins = self.gas_objects(registry).await?;
        Ok(coins.iter().map(|c| c.balance).sum())
    }

    // ------------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------------

    /// Mint `amount` of the cap's coin type and send it to `recipient`.
    pub async fn mint_and_transfer<C>(
        &self,
        registry: &ConnectionRegistry<C>,
        cap_id: &str,
        amount: u64,
        recipient: &str,
    ) -> Result<CoinOutcome, CoinError>
    where
        C: SuiRpc + Connect,
    {
        let signer = self.signer()?;
        let connection = active_connection(registry)?;
        let rpc = connection.as_ref();

        let cap = fetch_object(rpc, cap_id).await?;
        let cap_type = object_type(&cap)?;
        let coin_type =
            treasury_cap_type_arg(cap_type).ok_or_else(|| CoinError::NotACoin {
                id: cap_id.to_string(),
                type_string: cap_type.to_string(),
                expected: "0x2::coin::TreasuryCap<T>",
            })?;

        let address = signer.address();
        let sender = address.as_str();
        let gas_budget = self.gas_budget;
        let outcome = self
            .submitter
            .invoke("mint_and_transfer", rpc, &signer, move || async move {
                let gas = select_gas(rpc, sender, &[cap_id]).await?;
                let tx = rpc
                    .move_call(MoveCallRequest {
                        signer: sender.to_string(),
                        package_object_id: SUI_FRAMEWORK.to_string(),
                        module: COIN_MODULE.to_string(),
                        function: MINT_AND_TRANSFER_FUNCTION.to_string(),
                        type_arguments: vec![coin_type.to_string()],
                        arguments: vec![
                            json!(cap_id),
                            json!(amount.to_string()),
                            json!(recipient),
                        ],
                        gas: Some(gas),
                        gas_budget,
                    })
                    .await?;
                Ok::<_, CoinError>(tx)
            })
            .await?;

        info!(
            digest = %outcome.digest,
            coin_type = %coin_type,
            amount,
            recipient = %recipient,
            "Minted and transferred coins"
        );
        Ok(outcome)
    }

    /// Send a coin to `recipient`.
    ///
    /// With no amount, or an amount equal to the balance, the whole object
    /// moves. A smaller amount is split off and sent; a larger one fails
    /// before anything is submitted.
    pub async fn transfer<C>(
        &self,
        registry: &ConnectionRegistry<C>,
        coin_id: &str,
        recipient: &str,
        amount: Option<u64>,
    ) -> Result<CoinOutcome, CoinError>
    where
        C: SuiRpc + Connect,
    {
        let signer = self.signer()?;
        let connection = active_connection(registry)?;
        let rpc = connection.as_ref();

        let coin = fetch_object(rpc, coin_id).await?;
        let coin_type = coin_type_of(&coin, coin_id)?;
        // the balance only matters when part of the coin is requested
        let plan = match amount {
            None => TransferPlan::WholeObject,
            Some(_) => {
                let balance = coin
                    .move_field_u64("balance")
                    .ok_or_else(|| malformed(coin_id, "coin has no balance field"))?;
                plan_transfer(coin_id, balance, amount)?
            }
        };
        debug!(coin_id, ?plan, "Planned transfer");

        let address = signer.address();
        let sender = address.as_str();
        let gas_budget = self.gas_budget;
        let outcome = self
            .submitter
            .invoke("transfer", rpc, &signer, move || async move {
                let gas = select_gas(rpc, sender, &[coin_id]).await?;
                let tx = match plan {
                    TransferPlan::WholeObject => {
                        rpc.transfer_object(TransferObjectRequest {
                            signer: sender.to_string(),
                            object_id: coin_id.to_string(),
                            gas: Some(gas),
                            gas_budget,
                            recipient: recipient.to_string(),
                        })
                        .await?
                    }
                    TransferPlan::Split(value) => {
                        rpc.move_call(MoveCallRequest {
                            signer: sender.to_string(),
                            package_object_id: SUI_FRAMEWORK.to_string(),
                            module: PAY_MODULE.to_string(),
                            function: SPLIT_AND_TRANSFER_FUNCTION.to_string(),
                            type_arguments: vec![coin_type.to_string()],
                            arguments: vec![
                                json!(coin_id),
                                json!(value.to_string()),
                                json!(recipient),
                            ],
                            gas: Some(gas),
                            gas_budget,
                        })
                        .await?
                    }
                };
                Ok::<_, CoinError>(tx)
            })
            .await?;

        let sent = match plan {
            TransferPlan::WholeObject => coin.move_field_u64("balance"),
            TransferPlan::Split(value) => Some(value),
        };
        info!(
            digest = %outcome.digest,
            coin_type = %coin_type,
            coin_id = %coin_id,
            amount = ?sent,
            recipient = %recipient,
            "Transferred coins"
        );
        Ok(outcome)
    }

    /// Merge `to_merge` into `primary`. `primary` survives.
    pub async fn merge<C>(
        &self,
        registry: &ConnectionRegistry<C>,
        primary: &str,
        to_merge: &str,
    ) -> Result<CoinOutcome, CoinError>
    where
        C: SuiRpc + Connect,
    {
        let signer = self.signer()?;
        let connection = active_connection(registry)?;
        let rpc = connection.as_ref();

        let primary_coin = fetch_object(rpc, primary).await?;
        let coin_type = coin_type_of(&primary_coin, primary)?;

        let address = signer.address();
        let sender = address.as_str();
        let gas_budget = self.gas_budget;
        let outcome = self
            .submitter
            .invoke("merge", rpc, &signer, move || async move {
                let gas = select_gas(rpc, sender, &[primary, to_merge]).await?;
                let tx = rpc
                    .merge_coins(MergeCoinsRequest {
                        signer: sender.to_string(),
                        primary_coin: primary.to_string(),
                        coin_to_merge: to_merge.to_string(),
                        gas: Some(gas),
                        gas_budget,
                    })
                    .await?;
                Ok::<_, CoinError>(tx)
            })
            .await?;

        info!(
            digest = %outcome.digest,
            coin_type = %coin_type,
            primary = %primary,
            merged = %to_merge,
            "Merged coins"
        );
        Ok(outcome)
    }
}

fn active_connection<C: Connect>(registry: &ConnectionRegistry<C>) -> Result<Arc<C>, CoinError> {
    registry.active().ok_or(CoinError::NoActiveConnection)
}

fn malformed(id: &str, reason: &str) -> CoinError {
    CoinError::MalformedObject {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

async fn fetch_object<R>(rpc: &R, object_id: &str) -> Result<SuiObjectData, CoinError>
where
    R: SuiRpc + ?Sized,
{
    let response = rpc.get_object(object_id).await?;
    match response.data {
        Some(data) => Ok(data),
        None => {
            debug!(object_id, error = ?response.error, "Object lookup returned no data");
            Err(CoinError::ObjectNotFound(object_id.to_string()))
        }
    }
}

fn object_type(object: &SuiObjectData) -> Result<&str, CoinError> {
    object
        .object_type
        .as_deref()
        .ok_or_else(|| malformed(&object.object_id, "object has no type"))
}

fn coin_type_of<'a>(object: &'a SuiObjectData, id: &str) -> Result<&'a str, CoinError> {
    let type_string = object_type(object)?;
    coin_type_arg(type_string).ok_or_else(|| CoinError::NotACoin {
        id: id.to_string(),
        type_string: type_string.to_string(),
        expected: "0x2::coin::Coin<T>",
    })
}

/// First SUI coin of `owner` that is not one of the transaction's inputs.
/// Pages through `suix_getCoins` until one is found.
async fn select_gas<R>(rpc: &R, owner: &str, inputs: &[&str]) -> Result<String, CoinError>
where
    R: SuiRpc + ?Sized,
{
    let mut cursor: Option<String> = None;
    loop {
        let page = rpc.get_coins(owner, SUI_COIN_TYPE, cursor.as_deref()).await?;
        if let Some(coin) = page
            .data
            .into_iter()
            .find(|coin| !inputs.iter().any(|id| same_object_id(id, &coin.coin_object_id)))
        {
            return Ok(coin.coin_object_id);
        }
        match page.next_cursor {
            Some(next) if page.has_next_page => cursor = Some(next),
            _ => return Err(CoinError::NoGasObject(owner.to_string())),
        }
    }
}
