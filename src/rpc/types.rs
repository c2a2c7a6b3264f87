use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr, PickFirst};

// ============================================================================
// JSON-RPC Envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

// ============================================================================
// Objects
// ============================================================================

/// Canonical form of an address or object ID: `0x` followed by 64 lowercase
/// hex digits. Short IDs such as `0x2` are left-padded with zeros.
pub fn normalize_object_id(id: &str) -> Option<String> {
    let digits = id.strip_prefix("0x").unwrap_or(id);
    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("0x{:0>64}", digits.to_ascii_lowercase()))
}

/// Whether two IDs name the same object once normalized.
pub fn same_object_id(a: &str, b: &str) -> bool {
    match (normalize_object_id(a), normalize_object_id(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

/// Ownership of an on-chain object as reported by the node.
///
/// `{"AddressOwner": "0x.."}`, `{"ObjectOwner": "0x.."}`, `{"SingleOwner": "0x.."}`,
/// `{"Shared": {"initial_shared_version": n}}`, or a bare string such as `"Immutable"`.
/// Any other shape, e.g. `{"ConsensusAddressOwner": {..}}`, lands in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(String),
    ObjectOwner(String),
    SingleOwner(String),
    Shared {
        #[serde(default)]
        initial_shared_version: Value,
    },
    #[serde(untagged)]
    Plain(String),
    #[serde(untagged)]
    Other(Value),
}

impl Owner {
    /// Flatten the ownership structure into a display string.
    pub fn owner_string(&self) -> String {
        match self {
            Owner::AddressOwner(owner) | Owner::ObjectOwner(owner) | Owner::SingleOwner(owner) => {
                owner.clone()
            }
            Owner::Shared { .. } => "Shared".to_string(),
            Owner::Plain(owner) => owner.clone(),
            Owner::Other(value) => other_owner_string(value),
        }
    }
}

/// Prefer a nested `owner` address, fall back to the variant name.
fn other_owner_string(value: &Value) -> String {
    let Some((kind, inner)) = value.as_object().and_then(|map| map.iter().next()) else {
        return value.to_string();
    };
    match inner.get("owner").and_then(Value::as_str) {
        Some(owner) => owner.to_string(),
        None => kind.clone(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuiObjectResponse {
    pub data: Option<SuiObjectData>,
    pub error: Option<Value>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub version: u64,
    pub digest: String,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub owner: Option<Owner>,
    pub previous_transaction: Option<String>,
    pub content: Option<Value>,
}

impl SuiObjectData {
    /// Read a `u64` field of the Move struct, e.g. a coin's `balance`.
    pub fn move_field_u64(&self, field: &str) -> Option<u64> {
        let value = self.content.as_ref()?.get("fields")?.get(field)?;
        match value {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectDataOptions {
    pub show_type: bool,
    pub show_owner: bool,
    pub show_content: bool,
}

impl Default for ObjectDataOptions {
    fn default() -> Self {
        Self {
            show_type: true,
            show_owner: true,
            show_content: true,
        }
    }
}

// ============================================================================
// Coins
// ============================================================================

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinInfo {
    pub coin_type: String,
    pub coin_object_id: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub version: u64,
    pub digest: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub balance: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

// ============================================================================
// Transactions
// ============================================================================

#[derive(Debug, Clone)]
pub struct MoveCallRequest {
    pub signer: String,
    pub package_object_id: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
    pub gas: Option<String>,
    pub gas_budget: u64,
}

#[derive(Debug, Clone)]
pub struct TransferObjectRequest {
    pub signer: String,
    pub object_id: String,
    pub gas: Option<String>,
    pub gas_budget: u64,
    pub recipient: String,
}

#[derive(Debug, Clone)]
pub struct MergeCoinsRequest {
    pub signer: String,
    pub primary_coin: String,
    pub coin_to_merge: String,
    pub gas: Option<String>,
    pub gas_budget: u64,
}

/// Unsigned transaction bytes built by the node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBytes {
    /// Base64 BCS-encoded `TransactionData`
    pub tx_bytes: String,
    #[serde(default)]
    pub gas: Vec<ObjectRef>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub version: u64,
    pub digest: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnedObjectRef {
    pub owner: Owner,
    pub reference: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub computation_cost: u64,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub storage_cost: u64,
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub storage_rebate: u64,
}

impl GasCostSummary {
    /// Net MIST charged to the gas object.
    pub fn net_cost(&self) -> i128 {
        self.computation_cost as i128 + self.storage_cost as i128 - self.storage_rebate as i128
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub gas_used: GasCostSummary,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub mutated: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub deleted: Vec<ObjectRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    pub digest: String,
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_owner_string_variants() {
        let address: Owner = serde_json::from_value(json!({ "AddressOwner": "0xabc" })).unwrap();
        let object: Owner = serde_json::from_value(json!({ "ObjectOwner": "0xdef" })).unwrap();
        let single: Owner = serde_json::from_value(json!({ "SingleOwner": "0x123" })).unwrap();
        let plain: Owner = serde_json::from_value(json!("Immutable")).unwrap();
        let shared: Owner =
            serde_json::from_value(json!({ "Shared": { "initial_shared_version": 5 } })).unwrap();

        assert_eq!(address, Owner::AddressOwner("0xabc".into()));
        assert_eq!(address.owner_string(), "0xabc");
        assert_eq!(object.owner_string(), "0xdef");
        assert_eq!(single.owner_string(), "0x123");
        assert_eq!(plain, Owner::Plain("Immutable".into()));
        assert_eq!(plain.owner_string(), "Immutable");
        assert_eq!(shared.owner_string(), "Shared");
    }

    #[test]
    fn test_unknown_owner_shapes_still_decode() {
        let consensus: Owner = serde_json::from_value(json!({
            "ConsensusAddressOwner": { "start_version": 7, "owner": "0xabc" }
        }))
        .unwrap();
        assert!(matches!(consensus, Owner::Other(_)));
        assert_eq!(consensus.owner_string(), "0xabc");

        let future: Owner =
            serde_json::from_value(json!({ "SomethingNew": { "epoch": 3 } })).unwrap();
        assert_eq!(future.owner_string(), "SomethingNew");

        let effects: TransactionEffects = serde_json::from_value(json!({
            "status": { "status": "success" },
            "mutated": [{
                "owner": { "ConsensusAddressOwner": { "start_version": 7, "owner": "0xabc" } },
                "reference": { "objectId": "0x1", "version": 8, "digest": "d" }
            }]
        }))
        .unwrap();
        assert_eq!(effects.mutated[0].owner.owner_string(), "0xabc");
    }

    #[test]
    fn test_normalize_object_id() {
        assert_eq!(
            normalize_object_id("0x2").as_deref(),
            Some("0x0000000000000000000000000000000000000000000000000000000000000002")
        );
        assert_eq!(
            normalize_object_id("ABCDEF").as_deref(),
            Some("0x0000000000000000000000000000000000000000000000000000000000abcdef")
        );
        assert_eq!(normalize_object_id("0x"), None);
        assert_eq!(normalize_object_id("0xzz"), None);
        assert_eq!(normalize_object_id(&format!("0x{}", "1".repeat(65))), None);

        assert!(same_object_id("0x2", "0x02"));
        assert!(!same_object_id("0x2", "0x3"));
        assert!(same_object_id("not-hex", "not-hex"));
    }

    #[test]
    fn test_object_data_accepts_string_and_number_versions() {
        let as_string: SuiObjectData = serde_json::from_value(json!({
            "objectId": "0x0461a2ee33fe2a26a1e6fc3817b06661bb7ad20b",
            "version": "3",
            "digest": "GoEFoIBS9MUIEnJS3V3BLt2zK1RKYfQBnazNvuloqp4=",
            "type": "0x2::coin::Coin<0x2::sui::SUI>",
            "owner": { "AddressOwner": "0x94c21e07df735da5a390cb0aad0b4b1490b0d4f0" },
            "content": { "dataType": "moveObject", "fields": { "balance": "1500" } }
        }))
        .unwrap();
        assert_eq!(as_string.version, 3);
        assert_eq!(as_string.move_field_u64("balance"), Some(1500));
        assert_eq!(as_string.move_field_u64("missing"), None);

        let as_number: SuiObjectData = serde_json::from_value(json!({
            "objectId": "0x1",
            "version": 7,
            "digest": "d"
        }))
        .unwrap();
        assert_eq!(as_number.version, 7);
        assert!(as_number.owner.is_none());
    }

    #[test]
    fn test_execution_status() {
        let ok: ExecutionStatus = serde_json::from_value(json!({ "status": "success" })).unwrap();
        assert_eq!(ok, ExecutionStatus::Success);

        let failed: ExecutionStatus =
            serde_json::from_value(json!({ "status": "failure", "error": "InsufficientGas" }))
                .unwrap();
        assert_eq!(
            failed,
            ExecutionStatus::Failure {
                error: "InsufficientGas".into()
            }
        );
    }

    #[test]
    fn test_gas_cost_summary_net_cost() {
        let gas: GasCostSummary = serde_json::from_value(json!({
            "computationCost": "1000000",
            "storageCost": "2000000",
            "storageRebate": "978120",
            "nonRefundableStorageFee": "9880"
        }))
        .unwrap();
        assert_eq!(gas.net_cost(), 2_021_880);
    }
}
