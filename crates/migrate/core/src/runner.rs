//! Sequential execution of deployment directives.

use crate::{
    deploy::Deployer,
    error::DeployError,
    plan::ContractKey,
};
use deploy_client::DeployOutcome;
use migrate_artifacts::ArtifactStore;
use serde::Serialize;

/// One executed directive.
#[derive(Debug, Clone, Serialize)]
pub struct DeployRecord {
    pub contract_name: String,
    pub constructor_args: Vec<String>,
    #[serde(flatten)]
    pub outcome: DeployOutcome,
}

/// Run deployment directives in declaration order.
///
/// Directive N+1 is only issued once directive N has completed; the first
/// failure aborts the run and propagates unchanged, so nothing after a failed
/// directive is attempted. `on_deploy` fires before each directive is issued.
pub async fn execute<D, S>(
    deployer: &mut D,
    store: &S,
    directives: &[ContractKey],
    mut on_deploy: impl FnMut(usize, usize, &ContractKey),
) -> Result<Vec<DeployRecord>, DeployError>
where
    D: Deployer + ?Sized,
    S: ArtifactStore + ?Sized,
{
    let total = directives.len();
    let mut records = Vec::with_capacity(total);

    for (index, directive) in directives.iter().enumerate() {
        on_deploy(index, total, directive);
        let artifact = store.require(&directive.contract_ref())?;
        let outcome = deployer
            .deploy(&artifact, &directive.constructor_args)
            .await?;
        records.push(DeployRecord {
            contract_name: directive.contract_name.clone(),
            constructor_args: directive.constructor_args.clone(),
            outcome,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::JsonAbi;
    use alloy_primitives::{
        Address,
        B256,
        Bytes,
        U256,
    };
    use async_trait::async_trait;
    use deploy_client::DeployClientError;
    use migrate_artifacts::{
        ArtifactError,
        ContractArtifact,
    };
    use migrate_common::ContractRef;
    use std::{
        collections::HashMap,
        path::PathBuf,
    };

    /// Records every deploy call; optionally fails on a named contract.
    #[derive(Default)]
    struct RecordingDeployer {
        log: Vec<String>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl Deployer for RecordingDeployer {
        async fn deploy(
            &mut self,
            artifact: &ContractArtifact,
            _constructor_args: &[String],
        ) -> Result<DeployOutcome, DeployError> {
            self.log.push(artifact.contract_name.clone());
            if self.fail_on.as_deref() == Some(artifact.contract_name.as_str()) {
                return Err(DeployError::Client(DeployClientError::Reverted(
                    B256::ZERO,
                )));
            }
            Ok(DeployOutcome {
                contract_address: Address::repeat_byte(self.log.len() as u8),
                transaction_hash: B256::ZERO,
                block_number: self.log.len() as u64,
                gas_used: U256::from(21_000u64),
            })
        }
    }

    struct FixtureStore {
        artifacts: HashMap<String, ContractArtifact>,
    }

    impl FixtureStore {
        fn with(names: &[&str]) -> Self {
            let artifacts = names
                .iter()
                .map(|name| {
                    (
                        (*name).to_string(),
                        ContractArtifact {
                            contract_name: (*name).to_string(),
                            abi: JsonAbi::default(),
                            bytecode: Bytes::from(vec![0x60, 0x80]),
                            path: PathBuf::new(),
                        },
                    )
                })
                .collect();
            Self { artifacts }
        }
    }

    impl ArtifactStore for FixtureStore {
        fn require(&self, reference: &ContractRef) -> Result<ContractArtifact, ArtifactError> {
            self.artifacts
                .get(reference.contract_name())
                .cloned()
                .ok_or_else(|| ArtifactError::NotFound {
                    contract: reference.contract_name().clone(),
                    artifacts_dir: PathBuf::new(),
                })
        }

        fn contract_names(&self) -> Result<Vec<String>, ArtifactError> {
            let mut names: Vec<String> = self.artifacts.keys().cloned().collect();
            names.sort();
            Ok(names)
        }
    }

    fn directives(specs: &[&str]) -> Vec<ContractKey> {
        specs.iter().map(|spec| spec.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn deploys_in_declaration_order() {
        let mut deployer = RecordingDeployer::default();
        let store = FixtureStore::with(&["Migrations", "LocalCrypto"]);

        let records = execute(
            &mut deployer,
            &store,
            &directives(&["Migrations", "LocalCrypto"]),
            |_, _, _| {},
        )
        .await
        .unwrap();

        assert_eq!(deployer.log, vec!["Migrations", "LocalCrypto"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].contract_name, "Migrations");
        assert_eq!(records[1].contract_name, "LocalCrypto");
    }

    #[tokio::test]
    async fn first_failure_stops_the_run() {
        let mut deployer = RecordingDeployer {
            fail_on: Some("Migrations".to_string()),
            ..Default::default()
        };
        let store = FixtureStore::with(&["Migrations", "LocalCrypto"]);

        let result = execute(
            &mut deployer,
            &store,
            &directives(&["Migrations", "LocalCrypto"]),
            |_, _, _| {},
        )
        .await;

        assert!(matches!(
            result,
            Err(DeployError::Client(DeployClientError::Reverted(_)))
        ));
        // The second directive was never attempted
        assert_eq!(deployer.log, vec!["Migrations"]);
    }

    #[tokio::test]
    async fn unresolvable_artifact_aborts_before_any_deploy() {
        let mut deployer = RecordingDeployer::default();
        let store = FixtureStore::with(&["Migrations"]);

        let result = execute(
            &mut deployer,
            &store,
            &directives(&["Unknown", "Migrations"]),
            |_, _, _| {},
        )
        .await;

        assert!(matches!(
            result,
            Err(DeployError::Artifact(ArtifactError::NotFound { .. }))
        ));
        assert!(deployer.log.is_empty());
    }

    #[tokio::test]
    async fn empty_directive_list_is_a_no_op() {
        let mut deployer = RecordingDeployer::default();
        let store = FixtureStore::with(&[]);

        let records = execute(&mut deployer, &store, &[], |_, _, _| {})
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(deployer.log.is_empty());
    }

    #[tokio::test]
    async fn on_deploy_reports_progress() {
        let mut deployer = RecordingDeployer::default();
        let store = FixtureStore::with(&["Migrations", "LocalCrypto"]);
        let mut seen = Vec::new();

        execute(
            &mut deployer,
            &store,
            &directives(&["Migrations", "LocalCrypto"]),
            |index, total, directive| {
                seen.push((index, total, directive.contract_name.clone()));
            },
        )
        .await
        .unwrap();

        assert_eq!(
            seen,
            vec![
                (0, 2, "Migrations".to_string()),
                (1, 2, "LocalCrypto".to_string())
            ]
        );
    }
}
