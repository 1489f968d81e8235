//! The deployment capability seam and its implementations.

use crate::{
    encode,
    error::DeployError,
};
use alloy_primitives::{
    Address,
    B256,
    U64,
    U256,
};
use async_trait::async_trait;
use deploy_client::{
    DeployClient,
    DeployOutcome,
    TransactionRequest,
};
use migrate_artifacts::ContractArtifact;

/// The capability a directive runner deploys through. Implementations own
/// every side effect: payload submission, confirmation, network interaction.
#[async_trait]
pub trait Deployer: Send {
    async fn deploy(
        &mut self,
        artifact: &ContractArtifact,
        constructor_args: &[String],
    ) -> Result<DeployOutcome, DeployError>;
}

/// Deploys through an Ethereum JSON-RPC node. The node signs with one of its
/// unlocked accounts, so the deployer carries no key material.
pub struct RpcDeployer {
    client: DeployClient,
    from: Address,
    gas: Option<u64>,
}

impl RpcDeployer {
    pub fn new(client: DeployClient, from: Address, gas: Option<u64>) -> Self {
        Self { client, from, gas }
    }
}

#[async_trait]
impl Deployer for RpcDeployer {
    async fn deploy(
        &mut self,
        artifact: &ContractArtifact,
        constructor_args: &[String],
    ) -> Result<DeployOutcome, DeployError> {
        let data = encode::creation_data(artifact, constructor_args)?;
        let request = TransactionRequest {
            from: self.from,
            data,
            gas: self.gas.map(U64::from),
        };
        Ok(self.client.deploy(request).await?)
    }
}

/// Validates directives without touching the network: artifacts are resolved
/// and constructor arguments encoded, nothing is submitted.
pub struct DryRunDeployer;

#[async_trait]
impl Deployer for DryRunDeployer {
    async fn deploy(
        &mut self,
        artifact: &ContractArtifact,
        constructor_args: &[String],
    ) -> Result<DeployOutcome, DeployError> {
        encode::creation_data(artifact, constructor_args)?;
        Ok(DeployOutcome {
            contract_address: Address::ZERO,
            transaction_hash: B256::ZERO,
            block_number: 0,
            gas_used: U256::ZERO,
        })
    }
}
