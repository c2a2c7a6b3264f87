//! Typed access to a Sui full node's JSON-RPC interface.

use async_trait::async_trait;
use thiserror::Error;

pub mod client;
pub mod types;

pub use client::SuiRpcClient;
pub use types::{
    normalize_object_id, same_object_id, CoinInfo, ExecutionStatus, GasCostSummary,
    MergeCoinsRequest, MoveCallRequest, ObjectRef, OwnedObjectRef, Owner, Page, SuiObjectData,
    SuiObjectResponse, TransactionBytes, TransactionEffects, TransactionResponse,
    TransferObjectRequest,
};

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned error {code}: {message}")]
    Server {
        method: String,
        code: i64,
        message: String,
    },
    #[error("failed to decode {method} response: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} returned neither result nor error")]
    MissingResult(String),
}

pub type RpcResult<T> = std::result::Result<T, RpcError>;

/// The node calls the coin client depends on.
///
/// Transaction builders return unsigned bytes; signing happens locally and the
/// signed bytes go back through [`SuiRpc::execute_transaction`].
#[async_trait]
pub trait SuiRpc: Send + Sync {
    /// URL this handle talks to.
    fn url(&self) -> &str;

    async fn get_object(&self, object_id: &str) -> RpcResult<SuiObjectResponse>;

    /// One page of coins of `coin_type` owned by `owner`, starting after `cursor`.
    async fn get_coins(
        &self,
        owner: &str,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> RpcResult<Page<CoinInfo>>;

    async fn move_call(&self, request: MoveCallRequest) -> RpcResult<TransactionBytes>;

    async fn transfer_object(&self, request: TransferObjectRequest)
        -> RpcResult<TransactionBytes>;

    async fn merge_coins(&self, request: MergeCoinsRequest) -> RpcResult<TransactionBytes>;

    async fn execute_transaction(
        &self,
        tx_bytes: &str,
        signature: &str,
    ) -> RpcResult<TransactionResponse>;
}
