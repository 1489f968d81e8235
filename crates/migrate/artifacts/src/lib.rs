//! Resolution of externally-compiled contract artifacts.
//!
//! Compilation is owned by the contract toolchain (Foundry, Truffle,
//! Hardhat); this crate only locates the JSON artifacts those tools write and
//! parses out what a deployment needs: the ABI and the creation bytecode.

use alloy_json_abi::{
    ContractObject,
    JsonAbi,
};
use alloy_primitives::Bytes;
use migrate_common::ContractRef;
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

/// A compiled contract, ready to be handed to a deployer.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
    /// The artifact file this contract was loaded from.
    pub path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error(
        "no artifact output directory found under {0} (looked for `out`, `build/contracts`, `artifacts`); compile the project first"
    )]
    MissingArtifactsDir(PathBuf),
    #[error("no artifact found for contract `{contract}` under {artifacts_dir}")]
    NotFound {
        contract: String,
        artifacts_dir: PathBuf,
    },
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact for `{0}` has no ABI")]
    MissingAbi(String),
    #[error("artifact for `{0}` has no creation bytecode (interface or abstract contract?)")]
    MissingBytecode(String),
}

/// The store of compiled artifacts a deployment resolves contract names
/// against. The store may be a directory of compiler output, or an in-memory
/// fixture in tests.
pub trait ArtifactStore {
    /// Resolve a contract reference to its compiled artifact, failing if the
    /// artifact does not exist or is not deployable.
    fn require(&self, reference: &ContractRef) -> Result<ContractArtifact, ArtifactError>;

    /// Names of every contract the store can resolve.
    fn contract_names(&self) -> Result<Vec<String>, ArtifactError>;
}

/// Artifact store backed by a compiler output directory on disk.
#[derive(Debug, Clone)]
pub struct DiskArtifacts {
    artifacts_dir: PathBuf,
}

impl DiskArtifacts {
    /// Output layouts probed under a project root, in order.
    const LAYOUTS: &'static [&'static str] = &["out", "build/contracts", "artifacts"];

    /// Locate the artifact output directory under a project root.
    pub fn discover(root: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let root = root.as_ref();
        for layout in Self::LAYOUTS {
            let candidate = root.join(layout);
            if candidate.is_dir() {
                return Ok(Self {
                    artifacts_dir: candidate,
                });
            }
        }
        Err(ArtifactError::MissingArtifactsDir(root.to_path_buf()))
    }

    /// Use an explicit artifact directory, skipping discovery.
    pub fn at(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    fn load(&self, contract_name: &str, path: &Path) -> Result<ContractArtifact, ArtifactError> {
        let contents = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let object: ContractObject =
            serde_json::from_str(&contents).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let abi = object
            .abi
            .ok_or_else(|| ArtifactError::MissingAbi(contract_name.to_string()))?;
        let bytecode = object
            .bytecode
            .ok_or_else(|| ArtifactError::MissingBytecode(contract_name.to_string()))?;

        Ok(ContractArtifact {
            contract_name: contract_name.to_string(),
            abi,
            bytecode,
            path: path.to_path_buf(),
        })
    }
}

impl ArtifactStore for DiskArtifacts {
    fn require(&self, reference: &ContractRef) -> Result<ContractArtifact, ArtifactError> {
        for candidate in reference.candidate_paths() {
            let path = self.artifacts_dir.join(&candidate);
            if path.is_file() {
                return self.load(reference.contract_name(), &path);
            }
        }

        Err(ArtifactError::NotFound {
            contract: reference.contract_name().clone(),
            artifacts_dir: self.artifacts_dir.clone(),
        })
    }

    fn contract_names(&self) -> Result<Vec<String>, ArtifactError> {
        let entries = fs::read_dir(&self.artifacts_dir).map_err(|source| ArtifactError::Io {
            path: self.artifacts_dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                if let Some(name) = json_stem(&path) {
                    names.push(name);
                }
            } else if path.is_dir()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(".sol"))
            {
                // Foundry nests artifacts one level deep, per source file
                for nested in fs::read_dir(&path)
                    .map_err(|source| ArtifactError::Io {
                        path: path.clone(),
                        source,
                    })?
                    .flatten()
                {
                    if let Some(name) = json_stem(&nested.path()) {
                        names.push(name);
                    }
                }
            }
        }

        names.sort();
        names.dedup();
        Ok(names)
    }
}

fn json_stem(path: &Path) -> Option<String> {
    if path.extension().is_some_and(|ext| ext == "json") {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string)
    } else {
        None
    }
}
