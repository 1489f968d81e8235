//! The migration plan: an ordered list of numbered migrations, each naming
//! the contracts it deploys.
//!
//! Plans are declarative (`migrations.toml` at the project root) rather than
//! per-migration scripts, so loading a plan has no side effects.

use crate::error::RunError;
use migrate_common::ContractRef;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    fmt,
    fs,
    path::Path,
    str::FromStr,
};

/// A deployment directive: the artifact to deploy plus its constructor
/// arguments, written `Name(arg1,arg2)` in plans and on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractKey {
    pub contract_name: String,
    pub constructor_args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContractKeyError {
    #[error("empty contract spec")]
    Empty,
    #[error("contract spec `{0}` has unbalanced parentheses")]
    UnbalancedParens(String),
    #[error("contract spec `{0}` has an empty contract name")]
    MissingName(String),
    #[error("contract name `{0}` may not contain whitespace")]
    InvalidName(String),
    #[error("contract spec `{0}` contains an empty constructor argument")]
    EmptyArgument(String),
}

impl ContractKey {
    pub fn new(contract_name: String, constructor_args: Vec<String>) -> Self {
        Self {
            contract_name,
            constructor_args,
        }
    }

    /// Reference used to resolve this directive against an artifact store.
    pub fn contract_ref(&self) -> ContractRef {
        ContractRef::new(None, self.contract_name.clone())
    }
}

impl FromStr for ContractKey {
    type Err = ContractKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        if spec.is_empty() {
            return Err(ContractKeyError::Empty);
        }

        let Some(open) = spec.find('(') else {
            if spec.contains(')') {
                return Err(ContractKeyError::UnbalancedParens(spec.to_string()));
            }
            if spec.chars().any(char::is_whitespace) {
                return Err(ContractKeyError::InvalidName(spec.to_string()));
            }
            return Ok(Self::new(spec.to_string(), Vec::new()));
        };

        if !spec.ends_with(')') {
            return Err(ContractKeyError::UnbalancedParens(spec.to_string()));
        }

        let contract_name = spec[..open].trim();
        if contract_name.is_empty() {
            return Err(ContractKeyError::MissingName(spec.to_string()));
        }
        if contract_name.chars().any(char::is_whitespace) {
            return Err(ContractKeyError::InvalidName(contract_name.to_string()));
        }

        let inner = &spec[open + 1..spec.len() - 1];
        let constructor_args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            inner
                .split(',')
                .map(|arg| {
                    let arg = arg.trim();
                    if arg.is_empty() {
                        Err(ContractKeyError::EmptyArgument(spec.to_string()))
                    } else {
                        Ok(arg.to_string())
                    }
                })
                .collect::<Result<_, _>>()?
        };

        Ok(Self {
            contract_name: contract_name.to_string(),
            constructor_args,
        })
    }
}

impl fmt::Display for ContractKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constructor_args.is_empty() {
            write!(f, "{}", self.contract_name)
        } else {
            write!(
                f,
                "{}({})",
                self.contract_name,
                self.constructor_args.join(",")
            )
        }
    }
}

impl TryFrom<String> for ContractKey {
    type Error = ContractKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContractKey> for String {
    fn from(key: ContractKey) -> Self {
        key.to_string()
    }
}

/// One numbered migration: its directives run in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    pub number: u64,
    pub name: String,
    pub contracts: Vec<ContractKey>,
}

/// The ordered migrations of a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationPlan {
    #[serde(rename = "migration", default)]
    pub migrations: Vec<Migration>,
}

impl MigrationPlan {
    /// Load and validate a plan file.
    pub fn load(path: &Path) -> Result<Self, RunError> {
        if !path.is_file() {
            return Err(RunError::PlanNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| RunError::PlanIo {
            path: path.to_path_buf(),
            source,
        })?;
        let plan: Self = toml::from_str(&contents).map_err(|source| RunError::PlanParse {
            path: path.to_path_buf(),
            source,
        })?;

        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), RunError> {
        let mut previous: Option<u64> = None;
        for migration in &self.migrations {
            if let Some(previous) = previous {
                if migration.number <= previous {
                    return Err(RunError::OutOfOrder {
                        previous,
                        current: migration.number,
                    });
                }
            }
            if migration.contracts.is_empty() {
                return Err(RunError::EmptyMigration(migration.number));
            }
            previous = Some(migration.number);
        }
        Ok(())
    }

    /// Migrations still to run, given the last completed number and an
    /// optional upper bound.
    pub fn pending(&self, last_completed: Option<u64>, to: Option<u64>) -> Vec<&Migration> {
        self.migrations
            .iter()
            .filter(|migration| last_completed.is_none_or(|last| migration.number > last))
            .filter(|migration| to.is_none_or(|to| migration.number <= to))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn plan_file(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("migrations.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_bare_contract_name() {
        let key: ContractKey = "Migrations".parse().unwrap();
        assert_eq!(key.contract_name, "Migrations");
        assert!(key.constructor_args.is_empty());
    }

    #[test]
    fn parses_spec_with_constructor_args() {
        let key: ContractKey = "LocalCrypto(0x01, 42)".parse().unwrap();
        assert_eq!(key.contract_name, "LocalCrypto");
        assert_eq!(key.constructor_args, vec!["0x01", "42"]);
    }

    #[test]
    fn parses_empty_parens_as_no_args() {
        let key: ContractKey = "Token()".parse().unwrap();
        assert!(key.constructor_args.is_empty());
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(
            "".parse::<ContractKey>().unwrap_err(),
            ContractKeyError::Empty
        );
        assert!(matches!(
            "Token(1".parse::<ContractKey>().unwrap_err(),
            ContractKeyError::UnbalancedParens(_)
        ));
        assert!(matches!(
            "(1,2)".parse::<ContractKey>().unwrap_err(),
            ContractKeyError::MissingName(_)
        ));
        assert!(matches!(
            "My Token".parse::<ContractKey>().unwrap_err(),
            ContractKeyError::InvalidName(_)
        ));
        assert!(matches!(
            "Token(1,,2)".parse::<ContractKey>().unwrap_err(),
            ContractKeyError::EmptyArgument(_)
        ));
    }

    #[test]
    fn display_round_trips() {
        for spec in ["Migrations", "LocalCrypto(0x01,42)"] {
            let key: ContractKey = spec.parse().unwrap();
            assert_eq!(key.to_string(), spec);
            assert_eq!(key.to_string().parse::<ContractKey>().unwrap(), key);
        }
    }

    #[test]
    fn loads_and_validates_plan() {
        let (_dir, path) = plan_file(
            r#"
            [[migration]]
            number = 1
            name = "initial_migration"
            contracts = ["Migrations", "LocalCrypto"]

            [[migration]]
            number = 2
            name = "governance"
            contracts = ["Governor(0x0000000000000000000000000000000000000001)"]
            "#,
        );

        let plan = MigrationPlan::load(&path).unwrap();
        assert_eq!(plan.migrations.len(), 2);
        assert_eq!(plan.migrations[0].contracts[0].contract_name, "Migrations");
        assert_eq!(
            plan.migrations[1].contracts[0].constructor_args,
            vec!["0x0000000000000000000000000000000000000001"]
        );
    }

    #[test]
    fn missing_plan_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = MigrationPlan::load(&dir.path().join("migrations.toml"));
        assert!(matches!(result, Err(RunError::PlanNotFound(_))));
    }

    #[test]
    fn rejects_out_of_order_numbers() {
        let (_dir, path) = plan_file(
            r#"
            [[migration]]
            number = 2
            name = "second"
            contracts = ["A"]

            [[migration]]
            number = 1
            name = "first"
            contracts = ["B"]
            "#,
        );

        assert!(matches!(
            MigrationPlan::load(&path),
            Err(RunError::OutOfOrder {
                previous: 2,
                current: 1
            })
        ));
    }

    #[test]
    fn rejects_migration_without_contracts() {
        let (_dir, path) = plan_file(
            r#"
            [[migration]]
            number = 1
            name = "empty"
            contracts = []
            "#,
        );

        assert!(matches!(
            MigrationPlan::load(&path),
            Err(RunError::EmptyMigration(1))
        ));
    }

    #[test]
    fn pending_respects_completion_and_bound() {
        let (_dir, path) = plan_file(
            r#"
            [[migration]]
            number = 1
            name = "first"
            contracts = ["A"]

            [[migration]]
            number = 2
            name = "second"
            contracts = ["B"]

            [[migration]]
            number = 3
            name = "third"
            contracts = ["C"]
            "#,
        );
        let plan = MigrationPlan::load(&path).unwrap();

        let all: Vec<u64> = plan.pending(None, None).iter().map(|m| m.number).collect();
        assert_eq!(all, vec![1, 2, 3]);

        let after_first: Vec<u64> = plan
            .pending(Some(1), None)
            .iter()
            .map(|m| m.number)
            .collect();
        assert_eq!(after_first, vec![2, 3]);

        let bounded: Vec<u64> = plan
            .pending(Some(1), Some(2))
            .iter()
            .map(|m| m.number)
            .collect();
        assert_eq!(bounded, vec![2]);
    }
}
