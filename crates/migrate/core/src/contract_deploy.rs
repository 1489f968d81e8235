//! The `migrate deploy` command: publish individual contract artifacts
//! outside a migration plan.

use crate::{
    DEFAULT_RPC_URL,
    config::{
        CliConfig,
        DeployedContract,
    },
    deploy::RpcDeployer,
    error::DeployError,
    plan::ContractKey,
    runner::{
        self,
        DeployRecord,
    },
};
use alloy_primitives::Address;
use chrono::Utc;
use clap::{
    Parser,
    ValueHint,
};
use colored::Colorize;
use deploy_client::DeployClient;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use inquire::MultiSelect;
use migrate_artifacts::{
    ArtifactStore,
    DiskArtifacts,
};
use migrate_common::args::CliArgs;
use serde_json::json;
use std::path::PathBuf;
use tokio::time::Duration;

const DEPLOY_AFTER_HELP: &str = "EXAMPLES:\n    \
                  Deploy a single contract (positional args):\n        \
                  migrate deploy Token 0xOwner 1000000\n\n    \
                  Deploy multiple contracts in order (with -c flag):\n        \
                  migrate deploy -c \"Migrations\" -c \"Token(0xOwner,1000000)\"\n\n    \
                  With no contract given, pick interactively from the compiled artifacts.\n    \
                  Positional arguments are for single contracts only.";

/// Command-line arguments for deploying contracts outside a migration plan.
///
/// Deployments issued here are recorded in the CLI config like plan runs,
/// but never advance the per-chain migration number.
#[derive(Parser)]
#[clap(
    name = "deploy",
    about = "Deploy individual contract artifacts without a migration plan.",
    after_help = DEPLOY_AFTER_HELP
)]
pub struct DeployArgs {
    /// URL of the JSON-RPC node deployments go through
    #[clap(
        long = "rpc-url",
        short = 'u',
        env = "MIGRATE_RPC_URL",
        value_hint = ValueHint::Url,
        default_value = DEFAULT_RPC_URL
    )]
    pub rpc_url: String,

    /// Root directory of the contract project
    #[clap(
        long,
        value_hint = ValueHint::DirPath,
        help = "Project root holding the compiled artifacts (defaults to the current directory)."
    )]
    pub root: Option<PathBuf>,

    /// Account the node signs deployments with
    #[clap(
        long,
        value_name = "ADDRESS",
        help = "Sender account; defaults to the node's first unlocked account."
    )]
    pub from: Option<Address>,

    /// Gas limit per deployment transaction
    #[clap(long, value_name = "GAS")]
    pub gas: Option<u64>,

    /// Contracts to deploy using the formatted flag
    #[clap(
        long = "contract",
        short = 'c',
        value_name = "CONTRACT",
        value_hint = ValueHint::Other,
        value_parser,
        help = "Contract spec in the format 'Name(arg1,arg2)'. Repeat to deploy multiple contracts in order (wrap the value in quotes to avoid shell parsing)."
    )]
    pub contract_specs: Vec<ContractKey>,

    /// Contract name when using positional args
    #[clap(
        value_name = "CONTRACT_NAME",
        conflicts_with = "contract_specs",
        help = "Name of the contract when deploying a single artifact."
    )]
    pub contract_name: Option<String>,

    /// Constructor arguments for the positional contract
    #[clap(
        value_name = "CONSTRUCTOR_ARGS",
        requires = "contract_name",
        help = "Constructor arguments for the positional contract."
    )]
    pub constructor_args: Vec<String>,
}

impl DeployArgs {
    /// Creates and configures a progress spinner for displaying operation status.
    fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner} {msg}")
                .expect("Failed to set spinner style"),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    fn root_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    async fn resolve_sender(&self, client: &DeployClient) -> Result<Address, DeployError> {
        if let Some(from) = self.from {
            return Ok(from);
        }
        client
            .accounts()
            .await?
            .first()
            .copied()
            .ok_or(DeployError::NoAccounts)
    }

    /// Returns the contracts that should be deployed for this invocation.
    ///
    /// Explicit `-c` specs win; a positional contract comes next; with
    /// neither, the user picks interactively from the store's contracts.
    fn contracts_to_deploy(
        &self,
        store: &dyn ArtifactStore,
    ) -> Result<Vec<ContractKey>, DeployError> {
        if !self.contract_specs.is_empty() {
            return Ok(self.contract_specs.clone());
        }

        if let Some(contract_name) = &self.contract_name {
            return Ok(vec![ContractKey::new(
                contract_name.clone(),
                self.constructor_args.clone(),
            )]);
        }

        let names = store.contract_names()?;
        if names.is_empty() {
            return Err(DeployError::NothingSelected);
        }
        let selected = MultiSelect::new("Select contracts to deploy:", names).prompt()?;
        if selected.is_empty() {
            return Err(DeployError::NothingSelected);
        }
        Ok(selected
            .into_iter()
            .map(|name| ContractKey::new(name, Vec::new()))
            .collect())
    }

    /// Displays the deployment information after a successful run.
    fn display_success_info(
        &self,
        records: &[DeployRecord],
        chain_id: u64,
        json_output: bool,
    ) {
        if json_output {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "status": "success",
                    "chain_id": chain_id,
                    "deployments": records,
                }))
                .unwrap()
            );
            return;
        }

        println!("\n\n{}", "Deployment Information".bold().green());
        println!("{}", "======================".green());
        for record in records {
            println!(
                "\n{} -> {}",
                record.contract_name, record.outcome.contract_address
            );
            println!("  Transaction: {}", record.outcome.transaction_hash);
            println!("  Block: {}", record.outcome.block_number);
        }
        println!("\nDeployed through node: {}", self.rpc_url);

        println!("\n{}", "Next Steps:".bold());
        println!("Inspect recorded deployments with:");
        println!("  {} status", "migrate".cyan().bold());
    }

    /// Executes the deployment process.
    ///
    /// # Errors
    /// * Returns `DeployError` if artifact resolution fails
    /// * Returns `DeployError` if the submission to the node fails
    pub async fn run(
        &self,
        cli_args: &CliArgs,
        config: &mut CliConfig,
    ) -> Result<(), DeployError> {
        let json_output = cli_args.json_output();
        let store = DiskArtifacts::discover(self.root_dir())?;
        let directives = self.contracts_to_deploy(&store)?;

        let client = DeployClient::new(&self.rpc_url)?;
        let chain_id = client.chain_id().await?;
        let sender = self.resolve_sender(&client).await?;
        let mut deployer = RpcDeployer::new(client, sender, self.gas);

        let spinner = if json_output {
            ProgressBar::hidden()
        } else {
            Self::create_spinner()
        };

        let result = runner::execute(
            &mut deployer,
            &store,
            &directives,
            |index, total, directive| {
                let prefix = if total > 1 {
                    format!(
                        "Deploying {} ({}/{})...",
                        directive.contract_name,
                        index + 1,
                        total
                    )
                } else {
                    format!("Deploying {}...", directive.contract_name)
                };
                spinner.set_message(prefix);
            },
        )
        .await;

        let records = match result {
            Ok(records) => {
                if !json_output {
                    spinner.finish_with_message("✅ Contracts successfully deployed!");
                }
                records
            }
            Err(err) => {
                if !json_output {
                    spinner.finish_with_message("❌ Deployment failed!");
                }
                return Err(err);
            }
        };

        for record in &records {
            config.record_deployment(DeployedContract {
                contract_name: record.contract_name.clone(),
                address: record.outcome.contract_address,
                transaction_hash: record.outcome.transaction_hash,
                block_number: record.outcome.block_number,
                gas_used: record.outcome.gas_used,
                chain_id,
                constructor_args: record.constructor_args.clone(),
                deployed_at: Utc::now(),
            });
        }

        self.display_success_info(&records, chain_id, json_output);
        Ok(())
    }
}
