#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod contract_deploy;
pub mod deploy;
pub mod encode;
pub mod error;
pub mod migration_run;
pub mod plan;
pub mod runner;
pub mod status;

/// Default JSON-RPC endpoint, the conventional dev-node address.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// File name of the migration plan at a project root.
pub const PLAN_FILE_NAME: &str = "migrations.toml";
