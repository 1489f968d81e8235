//! The `migrate run` command: execute the pending migrations of a project.
//!
//! Migrations run in ascending number order and, within a migration,
//! directives in declaration order. Completed numbers are recorded per chain
//! in the CLI config so a rerun only picks up new migrations.

use crate::{
    DEFAULT_RPC_URL,
    PLAN_FILE_NAME,
    config::{
        CliConfig,
        DeployedContract,
    },
    deploy::{
        Deployer,
        DryRunDeployer,
        RpcDeployer,
    },
    error::{
        DeployError,
        RunError,
    },
    plan::{
        Migration,
        MigrationPlan,
    },
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
use migrate_artifacts::DiskArtifacts;
use migrate_common::args::CliArgs;
use serde_json::json;
use std::path::PathBuf;
use tokio::time::Duration;

const RUN_AFTER_HELP: &str = "Migrations run in ascending number order; completed numbers are recorded per chain and skipped on the next run.\n\
Use `--reset` to run every migration again from the start.";

/// Command-line arguments for running a project's migration plan.
#[derive(Parser)]
#[clap(
    name = "run",
    about = "Run the pending migrations of a project against an EVM node.",
    long_about = "Run the pending migrations declared in the project's migration plan, deploying each contract in order through one of the node's unlocked accounts. Completed migration numbers are recorded per chain so reruns only pick up new migrations.",
    after_help = RUN_AFTER_HELP
)]
pub struct RunArgs {
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
        help = "Project root holding the migration plan and compiled artifacts (defaults to the current directory)."
    )]
    pub root: Option<PathBuf>,

    /// Path to the migration plan
    #[clap(
        long,
        value_hint = ValueHint::FilePath,
        help = "Migration plan to execute (defaults to `migrations.toml` under the project root)."
    )]
    pub plan: Option<PathBuf>,

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

    /// Re-run every migration, ignoring recorded completion
    #[clap(long)]
    pub reset: bool,

    /// Stop after this migration number
    #[clap(long, value_name = "NUMBER")]
    pub to: Option<u64>,

    /// Preview the full plan without submitting transactions
    #[clap(
        long = "dry-run",
        help = "Resolve artifacts and encode constructor arguments without contacting the node."
    )]
    pub dry_run: bool,
}

impl RunArgs {
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

    fn plan_path(&self) -> PathBuf {
        self.plan
            .clone()
            .unwrap_or_else(|| self.root_dir().join(PLAN_FILE_NAME))
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

    /// Executes one migration's directives, with spinner bookkeeping.
    async fn run_migration(
        &self,
        deployer: &mut dyn Deployer,
        store: &DiskArtifacts,
        migration: &Migration,
        json_output: bool,
    ) -> Result<Vec<DeployRecord>, RunError> {
        let spinner = if json_output {
            ProgressBar::hidden()
        } else {
            Self::create_spinner()
        };
        let verb = if self.dry_run { "Checking" } else { "Deploying" };

        let result = runner::execute(
            deployer,
            store,
            &migration.contracts,
            |index, total, directive| {
                spinner.set_message(format!(
                    "{verb} {} ({}/{})...",
                    directive.contract_name,
                    index + 1,
                    total
                ));
            },
        )
        .await;

        match result {
            Ok(records) => {
                if !json_output {
                    spinner.finish_with_message(format!(
                        "✅ Migration {} complete",
                        migration.number
                    ));
                }
                Ok(records)
            }
            Err(err) => {
                if !json_output {
                    spinner.finish_with_message(format!(
                        "❌ Migration {} failed",
                        migration.number
                    ));
                }
                Err(err.into())
            }
        }
    }

    fn display_run_summary(
        &self,
        completed: &[(&Migration, Vec<DeployRecord>)],
        chain_id: Option<u64>,
        json_output: bool,
    ) {
        if json_output {
            let migrations = completed
                .iter()
                .map(|(migration, records)| {
                    json!({
                        "number": migration.number,
                        "name": migration.name,
                        "deployments": records,
                    })
                })
                .collect::<Vec<_>>();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "status": "success",
                    "dry_run": self.dry_run,
                    "chain_id": chain_id,
                    "migrations": migrations,
                }))
                .unwrap()
            );
            return;
        }

        println!("\n{}", "Migration Summary".bold().green());
        println!("{}", "=================".green());
        for (migration, records) in completed {
            println!("\nMigration {} ({}):", migration.number, migration.name);
            for record in records {
                if self.dry_run {
                    println!("  {} would deploy", record.contract_name);
                } else {
                    println!(
                        "  {} -> {}",
                        record.contract_name, record.outcome.contract_address
                    );
                }
            }
        }

        if !self.dry_run {
            println!("\n{}", "Next Steps:".bold());
            println!("Inspect recorded deployments with:");
            println!("  {} status", "migrate".cyan().bold());
        }
    }

    /// Executes the migration run.
    ///
    /// This method:
    /// 1. Loads and validates the migration plan
    /// 2. Resolves the artifact store and the deployment capability
    /// 3. Runs every pending migration in order, recording outcomes
    ///
    /// # Errors
    /// * Returns `RunError` if the plan is missing or invalid
    /// * Returns `RunError` if artifact resolution or any deployment fails
    pub async fn run(&self, cli_args: &CliArgs, config: &mut CliConfig) -> Result<(), RunError> {
        let json_output = cli_args.json_output();
        let plan = MigrationPlan::load(&self.plan_path())?;
        let store = DiskArtifacts::discover(self.root_dir()).map_err(DeployError::from)?;

        let (mut deployer, chain_id): (Box<dyn Deployer>, Option<u64>) = if self.dry_run {
            (Box::new(DryRunDeployer), None)
        } else {
            let client = DeployClient::new(&self.rpc_url).map_err(DeployError::from)?;
            let chain_id = client.chain_id().await.map_err(DeployError::from)?;
            let sender = self.resolve_sender(&client).await?;
            (
                Box::new(RpcDeployer::new(client, sender, self.gas)),
                Some(chain_id),
            )
        };

        let last_completed = if self.reset {
            None
        } else {
            chain_id.and_then(|id| config.last_completed(id))
        };

        let pending = plan.pending(last_completed, self.to);
        if pending.is_empty() {
            if json_output {
                println!("{}", json!({"status": "success", "migrations": []}));
            } else {
                println!("No pending migrations.");
            }
            return Ok(());
        }

        let mut completed = Vec::with_capacity(pending.len());
        for migration in pending {
            if !json_output {
                println!(
                    "{}",
                    format!("Migration {}: {}", migration.number, migration.name).bold()
                );
            }

            let records = self
                .run_migration(deployer.as_mut(), &store, migration, json_output)
                .await?;

            if let Some(chain_id) = chain_id {
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
                config.set_last_completed(chain_id, migration.number);
            }
            completed.push((migration, records));
        }

        self.display_run_summary(&completed, chain_id, json_output);
        Ok(())
    }
}
