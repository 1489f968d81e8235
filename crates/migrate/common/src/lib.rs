#![allow(clippy::must_use_candidate)]

pub mod args;

/// A reference to a compiled contract artifact, resolved by name against a
/// project's artifact output directory.
#[derive(Debug, Clone)]
pub struct ContractRef {
    file_name: Option<String>,
    contract_name: String,
}

impl ContractRef {
    pub fn new(file_name: Option<String>, contract_name: String) -> Self {
        Self {
            file_name,
            contract_name,
        }
    }

    /// Candidate artifact paths relative to the artifact directory, probed in
    /// order: the Foundry layout (`Name.sol/Name.json`), then the flat layout
    /// Truffle and Hardhat write (`Name.json`).
    pub fn candidate_paths(&self) -> Vec<String> {
        if let Some(file_name) = &self.file_name {
            vec![file_name.clone()]
        } else {
            vec![
                format!("{0}.sol/{0}.json", self.contract_name),
                format!("{0}.json", self.contract_name),
            ]
        }
    }

    pub const fn contract_name(&self) -> &String {
        &self.contract_name
    }
}
