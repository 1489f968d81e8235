use alloy_primitives::{
    Address,
    B256,
    U64,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::{
    Duration,
    sleep,
};
use url::Url;

mod types;
pub use types::{DeployOutcome, TransactionReceipt, TransactionRequest};

/// How often an in-flight deployment polls for its receipt by default.
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How many receipt polls a deployment issues before giving up by default.
pub const DEFAULT_RECEIPT_POLL_ATTEMPTS: u32 = 40;

/// A client for publishing contract-creation transactions through an Ethereum
/// JSON-RPC node. Signing is owned by the node (`eth_sendTransaction`), so the
/// client never touches key material.
///
/// ``` no_run
/// use deploy_client::{DeployClient, TransactionRequest};
/// use alloy_primitives::{address, bytes};
///
/// #[tokio::main]
/// async fn main() {
///     let client = DeployClient::new("http://localhost:8545").unwrap();
///     let request = TransactionRequest {
///         from: address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
///         data: bytes!("6080604052"),
///         gas: None,
///     };
///     let outcome = client.deploy(request).await.unwrap();
/// }
#[derive(Debug)]
pub struct DeployClient {
    client: Client,
    base_url: Url,
    request_id: std::sync::atomic::AtomicU64,
    receipt_poll_interval: Duration,
    receipt_poll_attempts: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum DeployClientError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("JSON-RPC error code {code}: {message}")]
    JsonRpcError { code: i32, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("deployment transaction {0} reverted")]
    Reverted(B256),
    #[error("no receipt for transaction {hash} after {attempts} polls")]
    ReceiptTimeout { hash: B256, attempts: u32 },
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: String,
    method: String,
    params: T,
    id: u64,
}

/// JSON-RPC response structure for successful responses
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    jsonrpc: String,
    result: Option<T>,
    error: Option<JsonRpcError>,
    id: u64,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl DeployClient {
    /// Create a new deployment client
    pub fn new(rpc_url: &str) -> Result<Self, DeployClientError> {
        let base_url = Url::parse(rpc_url)?;
        let client = Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url,
            request_id: std::sync::atomic::AtomicU64::new(1),
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            receipt_poll_attempts: DEFAULT_RECEIPT_POLL_ATTEMPTS,
        })
    }

    /// Override the receipt polling cadence
    pub fn with_receipt_poll(mut self, attempts: u32, interval: Duration) -> Self {
        self.receipt_poll_attempts = attempts;
        self.receipt_poll_interval = interval;
        self
    }

    /// Get next request ID
    fn next_request_id(&self) -> u64 {
        self.request_id
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
    }

    /// Make a JSON-RPC request whose result may legitimately be `null`
    /// (e.g. a receipt query for a pending transaction).
    async fn make_request_opt<P, R>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, DeployClientError>
    where
        P: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let request_id = self.next_request_id();
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: request_id,
        };

        let response = self
            .client
            .post(self.base_url.clone())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeployClientError::InvalidResponse(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let response_body: JsonRpcResponse<R> = response.json().await?;

        // Validate JSON-RPC 2.0 compliance
        if response_body.jsonrpc != "2.0" {
            return Err(DeployClientError::InvalidResponse(format!(
                "Invalid JSON-RPC version: expected '2.0', got '{}'",
                response_body.jsonrpc
            )));
        }

        if response_body.id != request_id {
            return Err(DeployClientError::InvalidResponse(format!(
                "Request/response ID mismatch: expected {}, got {}",
                request_id, response_body.id
            )));
        }

        if let Some(error) = response_body.error {
            return Err(DeployClientError::JsonRpcError {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response_body.result)
    }

    /// Make a JSON-RPC request whose result must be present
    async fn make_request<P, R>(&self, method: &str, params: P) -> Result<R, DeployClientError>
    where
        P: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        self.make_request_opt(method, params).await?.ok_or_else(|| {
            DeployClientError::InvalidResponse("Missing result in successful response".to_string())
        })
    }

    /// Fetch the chain id of the connected node
    pub async fn chain_id(&self) -> Result<u64, DeployClientError> {
        let id: U64 = self.make_request("eth_chainId", Vec::<String>::new()).await?;
        Ok(id.to::<u64>())
    }

    /// Fetch the accounts the node is willing to sign for
    pub async fn accounts(&self) -> Result<Vec<Address>, DeployClientError> {
        self.make_request("eth_accounts", Vec::<String>::new()).await
    }

    /// Submit a contract-creation transaction, returning its hash
    pub async fn send_deployment(
        &self,
        request: TransactionRequest,
    ) -> Result<B256, DeployClientError> {
        self.make_request("eth_sendTransaction", vec![request]).await
    }

    /// Fetch the receipt for the given transaction hash, `None` while pending
    pub async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, DeployClientError> {
        self.make_request_opt("eth_getTransactionReceipt", vec![hash.to_string()])
            .await
    }

    /// Poll for the receipt of the given transaction until it is mined or the
    /// poll budget is exhausted.
    pub async fn wait_for_receipt(
        &self,
        hash: B256,
    ) -> Result<TransactionReceipt, DeployClientError> {
        for attempt in 0..self.receipt_poll_attempts {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            if attempt + 1 < self.receipt_poll_attempts {
                sleep(self.receipt_poll_interval).await;
            }
        }

        Err(DeployClientError::ReceiptTimeout {
            hash,
            attempts: self.receipt_poll_attempts,
        })
    }

    /// Submit a contract-creation transaction and wait for it to be mined.
    ///
    /// A receipt with `status == 0` is reported as a revert; a mined receipt
    /// without a contract address means the node did not treat the
    /// transaction as a creation and is rejected.
    pub async fn deploy(
        &self,
        request: TransactionRequest,
    ) -> Result<DeployOutcome, DeployClientError> {
        let hash = self.send_deployment(request).await?;
        let receipt = self.wait_for_receipt(hash).await?;

        if receipt.status == Some(U64::ZERO) {
            return Err(DeployClientError::Reverted(receipt.transaction_hash));
        }

        let contract_address = receipt.contract_address.ok_or_else(|| {
            DeployClientError::InvalidResponse(
                "Receipt is missing a contract address".to_string(),
            )
        })?;

        Ok(DeployOutcome {
            contract_address,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt
                .block_number
                .map(|number| number.to::<u64>())
                .unwrap_or_default(),
            gas_used: receipt.gas_used,
        })
    }
}
