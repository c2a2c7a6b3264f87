use super::types::{
    CoinInfo, MergeCoinsRequest, MoveCallRequest, ObjectDataOptions, Page, RpcRequest,
    RpcResponse, SuiObjectResponse, TransactionBytes, TransactionResponse, TransferObjectRequest,
};
use super::{RpcError, RpcResult, SuiRpc};
use crate::config::consts::RPC_TIMEOUT_SECS;
use crate::gateway::Connect;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP JSON-RPC handle bound to one full node URL.
///
/// Building a handle never fails; a bad URL or unreachable node shows up as
/// [`RpcError::Transport`] on the first call.
#[derive(Debug)]
pub struct SuiRpcClient {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let http = match reqwest::Client::builder()
            .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
            .build()
        {
            Ok(http) => http,
            Err(e) => {
                warn!(
                    url = %url,
                    error = %e,
                    "HTTP client build failed, using defaults without request timeout"
                );
                reqwest::Client::new()
            }
        };
        Self {
            url,
            http,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> RpcResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        debug!(url = %self.url, method, id, "JSON-RPC request");

        let transport = |source| RpcError::Transport {
            url: self.url.clone(),
            source,
        };
        let body = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?
            .error_for_status()
            .map_err(transport)?
            .bytes()
            .await
            .map_err(transport)?;

        let response: RpcResponse<T> =
            serde_json::from_slice(&body).map_err(|source| RpcError::Decode {
                method: method.to_string(),
                source,
            })?;

        match (response.result, response.error) {
            (_, Some(error)) => Err(RpcError::Server {
                method: method.to_string(),
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::MissingResult(method.to_string())),
        }
    }
}

impl Connect for SuiRpcClient {
    fn connect(url: &str) -> Self {
        Self::new(url)
    }
}

#[async_trait]
impl SuiRpc for SuiRpcClient {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_object(&self, object_id: &str) -> RpcResult<SuiObjectResponse> {
        self.call(
            "sui_getObject",
            json!([object_id, ObjectDataOptions::default()]),
        )
        .await
    }

    async fn get_coins(
        &self,
        owner: &str,
        coin_type: &str,
        cursor: Option<&str>,
    ) -> RpcResult<Page<CoinInfo>> {
        self.call("suix_getCoins", json!([owner, coin_type, cursor, null]))
            .await
    }

    async fn move_call(&self, request: MoveCallRequest) -> RpcResult<TransactionBytes> {
        self.call(
            "unsafe_moveCall",
            json!([
                request.signer,
                request.package_object_id,
                request.module,
                request.function,
                request.type_arguments,
                request.arguments,
                request.gas,
                request.gas_budget.to_string(),
            ]),
        )
        .await
    }

    async fn transfer_object(
        &self,
        request: TransferObjectRequest,
    ) -> RpcResult<TransactionBytes> {
        self.call(
            "unsafe_transferObject",
            json!([
                request.signer,
                request.object_id,
                request.gas,
                request.gas_budget.to_string(),
                request.recipient,
            ]),
        )
        .await
    }

    async fn merge_coins(&self, request: MergeCoinsRequest) -> RpcResult<TransactionBytes> {
        self.call(
            "unsafe_mergeCoins",
            json!([
                request.signer,
                request.primary_coin,
                request.coin_to_merge,
                request.gas,
                request.gas_budget.to_string(),
            ]),
        )
        .await
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &str,
        signature: &str,
    ) -> RpcResult<TransactionResponse> {
        self.call(
            "sui_executeTransactionBlock",
            json!([
                tx_bytes,
                [signature],
                { "showEffects": true },
                "WaitForLocalExecution",
            ]),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::types::{ExecutionStatus, Owner};
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_get_object_sends_options_and_parses_owner() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/").json_body_includes(
                    r#"{"method": "sui_getObject", "params": ["0xcap", {"showType": true, "showOwner": true, "showContent": true}]}"#,
                );
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "data": {
                            "objectId": "0xcap",
                            "version": "12",
                            "digest": "abc",
                            "type": "0x2::coin::TreasuryCap<0xbeef::jrk::JRK>",
                            "owner": { "AddressOwner": "0xowner" }
                        }
                    }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let response = client.get_object("0xcap").await.unwrap();
        let data = response.data.unwrap();

        mock.assert_async().await;
        assert_eq!(data.version, 12);
        assert_eq!(data.owner, Some(Owner::AddressOwner("0xowner".into())));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/");
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": -32602, "message": "Invalid params" }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let err = client
            .get_coins("0xowner", "0x2::sui::SUI", None)
            .await
            .unwrap_err();
        match err {
            RpcError::Server { method, code, .. } => {
                assert_eq!(method, "suix_getCoins");
                assert_eq!(code, -32602);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_http_failure_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503);
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let err = client.get_object("0x1").await.unwrap_err();
        assert!(matches!(err, RpcError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_move_call_encodes_budget_as_string() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).json_body_includes(
                    r#"{"method": "unsafe_moveCall", "params": ["0xsigner", "0x2", "coin", "mint_and_transfer", ["0xbeef::jrk::JRK"], ["0xcap", "1000", "0xrecipient"], "0xgas", "10000000"]}"#,
                );
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "txBytes": "aGVsbG8=", "gas": [], "inputObjects": [] }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let bytes = client
            .move_call(MoveCallRequest {
                signer: "0xsigner".into(),
                package_object_id: "0x2".into(),
                module: "coin".into(),
                function: "mint_and_transfer".into(),
                type_arguments: vec!["0xbeef::jrk::JRK".into()],
                arguments: vec![json!("0xcap"), json!("1000"), json!("0xrecipient")],
                gas: Some("0xgas".into()),
                gas_budget: 10_000_000,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes.tx_bytes, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_get_coins_sends_owner_and_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).json_body_includes(
                    r#"{"method": "suix_getCoins", "params": ["0xowner", "0x2::sui::SUI", null, null]}"#,
                );
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "data": [{
                            "coinType": "0x2::sui::SUI",
                            "coinObjectId": "0xgas",
                            "version": "3",
                            "digest": "d",
                            "balance": "1500000000"
                        }],
                        "nextCursor": null,
                        "hasNextPage": false
                    }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let page = client
            .get_coins("0xowner", "0x2::sui::SUI", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].coin_object_id, "0xgas");
        assert_eq!(page.data[0].balance, 1_500_000_000);
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_transfer_object_puts_recipient_last() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).json_body_includes(
                    r#"{"method": "unsafe_transferObject", "params": ["0xsigner", "0xcoin", "0xgas", "10000000", "0xrecipient"]}"#,
                );
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "txBytes": "aGVsbG8=", "gas": [] }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let bytes = client
            .transfer_object(TransferObjectRequest {
                signer: "0xsigner".into(),
                object_id: "0xcoin".into(),
                gas: Some("0xgas".into()),
                gas_budget: 10_000_000,
                recipient: "0xrecipient".into(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes.tx_bytes, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_merge_coins_orders_primary_first() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).json_body_includes(
                    r#"{"method": "unsafe_mergeCoins", "params": ["0xsigner", "0xprimary", "0xmerged", null, "5000"]}"#,
                );
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": { "txBytes": "aGVsbG8=", "gas": [] }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        client
            .merge_coins(MergeCoinsRequest {
                signer: "0xsigner".into(),
                primary_coin: "0xprimary".into(),
                coin_to_merge: "0xmerged".into(),
                gas: None,
                gas_budget: 5000,
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_transaction_parses_effects() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).json_body_includes(
                    r#"{"method": "sui_executeTransactionBlock", "params": ["aGVsbG8=", ["c2ln"], {"showEffects": true}, "WaitForLocalExecution"]}"#,
                );
                then.status(200).json_body(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {
                        "digest": "9aZ1",
                        "effects": {
                            "status": { "status": "success" },
                            "gasUsed": {
                                "computationCost": "1000",
                                "storageCost": "2000",
                                "storageRebate": "500"
                            },
                            "created": [{
                                "owner": { "AddressOwner": "0xrecipient" },
                                "reference": { "objectId": "0xnew", "version": 4, "digest": "d" }
                            }]
                        }
                    }
                }));
            })
            .await;

        let client = SuiRpcClient::new(server.url("/"));
        let response = client
            .execute_transaction("aGVsbG8=", "c2ln")
            .await
            .unwrap();
        let effects = response.effects.unwrap();

        assert_eq!(response.digest, "9aZ1");
        assert_eq!(effects.status, ExecutionStatus::Success);
        assert_eq!(effects.created[0].reference.object_id, "0xnew");
        assert_eq!(effects.gas_used.net_cost(), 2500);
        assert!(effects.mutated.is_empty());
    }
}
