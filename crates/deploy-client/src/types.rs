use alloy_primitives::{
    Address,
    B256,
    Bytes,
    U64,
    U256,
};
use serde::{
    Deserialize,
    Serialize,
};

///The parameters of a contract-creation transaction submitted via `eth_sendTransaction`.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub from: Address,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U64>,
}

///The subset of an Ethereum transaction receipt the deployment flow consumes.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<U64>,
    pub contract_address: Option<Address>,
    pub gas_used: U256,
    pub status: Option<U64>,
}

///The outcome of a completed deployment.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeployOutcome {
    pub contract_address: Address,
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
}
