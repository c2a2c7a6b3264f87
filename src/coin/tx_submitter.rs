use super::{CoinError, CoinOutcome};
use crate::rpc::{ExecutionStatus, SuiRpc, TransactionBytes, TransactionResponse};
use crate::wallet::SuiKeypair;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct TransactionSubmitter {
    tx_lock: Arc<Mutex<()>>,
}

impl TransactionSubmitter {
    pub(crate) fn new(tx_lock: Arc<Mutex<()>>) -> Self {
        Self { tx_lock }
    }

    /// Build, sign and execute one transaction.
    ///
    /// The lock is held from gas selection inside `build` until the node has
    /// executed the transaction, so two submissions never pick the same gas
    /// coin version.
    pub(crate) async fn invoke<R, F, Fut>(
        &self,
        method: &str,
        rpc: &R,
        keypair: &SuiKeypair,
        build: F,
    ) -> Result<CoinOutcome, CoinError>
    where
        R: SuiRpc + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TransactionBytes, CoinError>>,
    {
        let _guard = self.tx_lock.lock().await;

        let tx = build().await?;
        let signature = keypair
            .sign_transaction(&tx.tx_bytes)
            .map_err(CoinError::Credential)?;
        let response = rpc.execute_transaction(&tx.tx_bytes, &signature).await?;

        Self::log_gas_details(method, rpc.url(), &response);
        Self::check_status(method, response)
    }

    fn check_status(method: &str, response: TransactionResponse) -> Result<CoinOutcome, CoinError> {
        let digest = response.digest.clone();
        if !response.errors.is_empty() {
            return Err(CoinError::ExecutionFailed {
                digest,
                error: response.errors.join("; "),
            });
        }

        let Some(effects) = response.effects else {
            return Err(CoinError::ExecutionFailed {
                digest,
                error: format!("{method} returned no effects"),
            });
        };

        match effects.status {
            ExecutionStatus::Success => Ok(CoinOutcome {
                digest,
                gas_cost: effects.gas_used.net_cost(),
                created: effects
                    .created
                    .into_iter()
                    .map(|o| o.reference.object_id)
                    .collect(),
                mutated: effects
                    .mutated
                    .into_iter()
                    .map(|o| o.reference.object_id)
                    .collect(),
            }),
            ExecutionStatus::Failure { error } => {
                Err(CoinError::ExecutionFailed { digest, error })
            }
        }
    }

    fn log_gas_details(method: &str, node: &str, response: &TransactionResponse) {
        let Some(effects) = response.effects.as_ref() else {
            warn!(method = %method, node = %node, digest = %response.digest, "transaction has no effects");
            return;
        };
        let gas = &effects.gas_used;

        if effects.status == ExecutionStatus::Success {
            info!(
                method = %method,
                node = %node,
                digest = %response.digest,
                computation_cost = gas.computation_cost,
                storage_cost = gas.storage_cost,
                storage_rebate = gas.storage_rebate,
                net_cost = %gas.net_cost(),
                "💰 transaction gas details"
            );
        } else {
            warn!(
                method = %method,
                node = %node,
                digest = %response.digest,
                computation_cost = gas.computation_cost,
                storage_cost = gas.storage_cost,
                storage_rebate = gas.storage_rebate,
                net_cost = %gas.net_cost(),
                status = ?effects.status,
                "💰 transaction gas details (execution failed)"
            );
        }
    }
}
