//! Persisted CLI state: recorded deployments and migration progress.
//!
//! The config file plays the bookkeeping role Truffle delegates to an
//! on-chain `Migrations` contract: it remembers, per chain, which migration
//! numbers have completed and where contracts landed.

use crate::error::ConfigError;
use alloy_primitives::{
    Address,
    B256,
    U256,
};
use chrono::{
    DateTime,
    Utc,
};
use migrate_common::args::CliArgs;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;
use std::{
    collections::BTreeMap,
    fmt,
    fs,
    path::PathBuf,
};

const CONFIG_DIR_NAME: &str = "migrate";
const CONFIG_FILE_NAME: &str = "config.toml";

/// A deployment this CLI performed and recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub contract_name: String,
    pub address: Address,
    pub transaction_hash: B256,
    pub block_number: u64,
    pub gas_used: U256,
    pub chain_id: u64,
    pub constructor_args: Vec<String>,
    pub deployed_at: DateTime<Utc>,
}

impl fmt::Display for DeployedContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contract: {}", self.contract_name)?;
        writeln!(f, "Address: {}", self.address)?;
        writeln!(f, "Transaction: {}", self.transaction_hash)?;
        writeln!(f, "Block: {}", self.block_number)?;
        write!(f, "Chain ID: {}", self.chain_id)?;
        if !self.constructor_args.is_empty() {
            write!(f, "\nConstructor Args: {}", self.constructor_args.join(", "))?;
        }
        Ok(())
    }
}

/// On-disk CLI configuration, TOML under the platform config directory (or
/// the hidden `--config-dir` override).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Deployments recorded per chain, keyed `<chain_id>:<ContractName>`.
    #[serde(default)]
    pub deployments: BTreeMap<String, DeployedContract>,
    /// Highest completed migration number per chain id.
    #[serde(default)]
    pub completed_migrations: BTreeMap<String, u64>,
}

impl CliConfig {
    pub fn config_path(cli_args: &CliArgs) -> Result<PathBuf, ConfigError> {
        let dir = match &cli_args.config_dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()
                .ok_or(ConfigError::NoConfigDir)?
                .join(CONFIG_DIR_NAME),
        };
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    pub fn read_from_file(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let path = Self::config_path(cli_args)?;
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn write_to_file(&self, cli_args: &CliArgs) -> Result<(), ConfigError> {
        let path = Self::config_path(cli_args)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents).map_err(|source| ConfigError::Io { path, source })
    }

    pub fn deployment_key(chain_id: u64, contract_name: &str) -> String {
        format!("{chain_id}:{contract_name}")
    }

    pub fn record_deployment(&mut self, deployment: DeployedContract) {
        let key = Self::deployment_key(deployment.chain_id, &deployment.contract_name);
        self.deployments.insert(key, deployment);
    }

    pub fn last_completed(&self, chain_id: u64) -> Option<u64> {
        self.completed_migrations.get(&chain_id.to_string()).copied()
    }

    pub fn set_last_completed(&mut self, chain_id: u64, number: u64) {
        self.completed_migrations
            .insert(chain_id.to_string(), number);
    }
}

#[derive(clap::Parser)]
#[clap(name = "config", about = "Manage configuration")]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the persisted configuration")]
    Show,
    #[command(about = "Print the configuration file path")]
    Path,
    #[command(about = "Clear recorded deployments and migration progress")]
    Reset,
}

impl ConfigArgs {
    pub fn run(&self, cli_args: &CliArgs, config: &mut CliConfig) -> Result<(), ConfigError> {
        let json_output = cli_args.json_output();
        match self.command {
            ConfigCommand::Show => {
                if json_output {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "status": "success",
                            "config": config,
                        }))
                        .unwrap()
                    );
                } else {
                    let rendered = toml::to_string_pretty(config)?;
                    if rendered.is_empty() {
                        println!("(empty)");
                    } else {
                        print!("{rendered}");
                    }
                }
            }
            ConfigCommand::Path => {
                println!("{}", Self::config_path_display(cli_args)?);
            }
            ConfigCommand::Reset => {
                *config = CliConfig::default();
                if json_output {
                    println!("{}", json!({"status": "success"}));
                } else {
                    println!("Configuration cleared.");
                }
            }
        }
        Ok(())
    }

    fn config_path_display(cli_args: &CliArgs) -> Result<String, ConfigError> {
        Ok(CliConfig::config_path(cli_args)?.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_deployment(chain_id: u64, name: &str) -> DeployedContract {
        DeployedContract {
            contract_name: name.to_string(),
            address: Address::repeat_byte(0xaa),
            transaction_hash: B256::repeat_byte(0xbb),
            block_number: 12,
            gas_used: U256::from(21_000u64),
            chain_id,
            constructor_args: vec!["0x01".to_string()],
            deployed_at: Utc::now(),
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let cli_args = CliArgs {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let mut config = CliConfig::default();
        config.record_deployment(sample_deployment(1337, "Migrations"));
        config.set_last_completed(1337, 1);
        config.write_to_file(&cli_args).unwrap();

        let read_back = CliConfig::read_from_file(&cli_args).unwrap();
        assert_eq!(read_back.last_completed(1337), Some(1));
        let deployment = read_back
            .deployments
            .get(&CliConfig::deployment_key(1337, "Migrations"))
            .unwrap();
        assert_eq!(deployment, &config.deployments["1337:Migrations"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let cli_args = CliArgs {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        assert!(matches!(
            CliConfig::read_from_file(&cli_args),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn redeployment_overwrites_the_record() {
        let mut config = CliConfig::default();
        config.record_deployment(sample_deployment(1337, "Migrations"));

        let mut newer = sample_deployment(1337, "Migrations");
        newer.block_number = 99;
        config.record_deployment(newer);

        assert_eq!(config.deployments.len(), 1);
        assert_eq!(config.deployments["1337:Migrations"].block_number, 99);
    }

    #[test]
    fn deployments_on_different_chains_do_not_collide() {
        let mut config = CliConfig::default();
        config.record_deployment(sample_deployment(1, "Migrations"));
        config.record_deployment(sample_deployment(1337, "Migrations"));

        assert_eq!(config.deployments.len(), 2);
    }

    #[test]
    fn completion_tracking_is_per_chain() {
        let mut config = CliConfig::default();
        config.set_last_completed(1, 3);
        config.set_last_completed(1337, 1);

        assert_eq!(config.last_completed(1), Some(3));
        assert_eq!(config.last_completed(1337), Some(1));
        assert_eq!(config.last_completed(5), None);
    }
}
