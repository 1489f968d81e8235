use deploy_client::DeployClientError;
use migrate_artifacts::ArtifactError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while deploying contract artifacts.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Client(#[from] DeployClientError),
    #[error("constructor of `{contract}` expects {expected} arguments, got {got}")]
    InvalidConstructorArgs {
        contract: String,
        expected: usize,
        got: usize,
    },
    #[error("failed to coerce constructor argument `{value}` as `{ty}`: {reason}")]
    BadConstructorArg {
        value: String,
        ty: String,
        reason: String,
    },
    #[error("failed to encode constructor arguments: {0}")]
    Encode(#[from] alloy_dyn_abi::Error),
    #[error("the node exposes no unlocked accounts; pass --from")]
    NoAccounts,
    #[error("no contracts selected for deployment")]
    NothingSelected,
    #[error("interactive selection failed: {0}")]
    Selection(#[from] inquire::InquireError),
}

/// Errors raised while loading or executing a migration plan.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("migration plan not found at {0}")]
    PlanNotFound(PathBuf),
    #[error("failed to read migration plan {path}: {source}")]
    PlanIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse migration plan {path}: {source}")]
    PlanParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("migration {0} declares no contracts")]
    EmptyMigration(u64),
    #[error("migration numbers must be strictly ascending: {current} follows {previous}")]
    OutOfOrder { previous: u64, current: u64 },
    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Errors raised while reading or writing the persisted CLI configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory for this platform")]
    NoConfigDir,
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
