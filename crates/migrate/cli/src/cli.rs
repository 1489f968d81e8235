use clap::Parser;
use migrate_common::args::CliArgs;
use migrate_core::{
    DEFAULT_RPC_URL,
    config::ConfigArgs,
    contract_deploy::DeployArgs,
    migration_run::RunArgs,
    status::StatusArgs,
};
use std::sync::OnceLock;

fn version_message() -> &'static str {
    static VERSION: OnceLock<String> = OnceLock::new();
    VERSION
        .get_or_init(|| {
            format!(
                "{}\nDefault RPC URL: {}",
                env!("CARGO_PKG_VERSION"),
                DEFAULT_RPC_URL,
            )
        })
        .as_str()
}

#[derive(Parser)]
#[command(
    name = "migrate",
    version = version_message(),
    long_version = version_message(),
    about = "Contract migration runner for EVM networks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    #[command(flatten)]
    pub args: CliArgs,
}

#[derive(clap::Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum Commands {
    #[command(name = "run")]
    Run(RunArgs),
    #[command(name = "deploy")]
    Deploy(DeployArgs),
    #[command(name = "status")]
    Status(StatusArgs),
    #[command(about = "Manage configuration")]
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_deploy_command_with_contract_flag() {
        let cli =
            Cli::try_parse_from(["migrate", "--json", "deploy", "-c", "TestToken(0x01,42)"])
                .unwrap();
        assert!(cli.args.json_output());
        match cli.command {
            Commands::Deploy(args) => {
                assert_eq!(args.contract_specs.len(), 1);
                assert_eq!(args.contract_specs[0].contract_name, "TestToken");
                assert_eq!(args.contract_specs[0].constructor_args, vec!["0x01", "42"]);
                assert!(args.contract_name.is_none());
            }
            _ => panic!("expected deploy command"),
        }
    }

    #[test]
    fn parses_deploy_command_with_positional_args() {
        let cli = Cli::try_parse_from(["migrate", "deploy", "TestToken", "0x01", "42"]).unwrap();

        match cli.command {
            Commands::Deploy(args) => {
                assert!(args.contract_specs.is_empty());
                assert_eq!(args.contract_name.as_deref(), Some("TestToken"));
                assert_eq!(args.constructor_args, vec!["0x01", "42"]);
            }
            _ => panic!("expected deploy command"),
        }
    }

    #[test]
    fn rejects_positional_contract_combined_with_specs() {
        let result = Cli::try_parse_from(["migrate", "deploy", "-c", "TestToken", "Other"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_run_command_with_bounds() {
        let cli = Cli::try_parse_from([
            "migrate",
            "run",
            "--rpc-url",
            "http://localhost:9545",
            "--to",
            "2",
            "--reset",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.rpc_url, "http://localhost:9545");
                assert_eq!(args.to, Some(2));
                assert!(args.reset);
                assert!(!args.dry_run);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn run_defaults_to_dev_node() {
        let cli = Cli::try_parse_from(["migrate", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => assert_eq!(args.rpc_url, DEFAULT_RPC_URL),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn parses_status_with_chain_filter() {
        let cli = Cli::try_parse_from(["migrate", "status", "--chain", "1337"]).unwrap();
        match cli.command {
            Commands::Status(args) => assert_eq!(args.chain, Some(1337)),
            _ => panic!("expected status command"),
        }
    }

    #[test]
    fn parses_config_show_command() {
        let cli = Cli::try_parse_from(["migrate", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(_)));
    }
}
