use crate::config::{
    CliConfig,
    DeployedContract,
};
use colored::Colorize;
use migrate_common::args::CliArgs;
use serde_json::json;

#[derive(clap::Parser)]
#[clap(
    name = "status",
    about = "Show the contracts this CLI has recorded as deployed."
)]
pub struct StatusArgs {
    /// Only show deployments on this chain id
    #[clap(long, value_name = "CHAIN_ID")]
    pub chain: Option<u64>,
}

impl StatusArgs {
    fn filtered<'a>(&self, config: &'a CliConfig) -> Vec<&'a DeployedContract> {
        config
            .deployments
            .values()
            .filter(|deployment| {
                self.chain
                    .is_none_or(|chain| deployment.chain_id == chain)
            })
            .collect()
    }

    pub fn run(&self, cli_args: &CliArgs, config: &CliConfig) {
        let deployments = self.filtered(config);

        if cli_args.json_output() {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "status": "success",
                    "deployments": deployments,
                }))
                .unwrap()
            );
            return;
        }

        if deployments.is_empty() {
            println!("No recorded deployments.");
            return;
        }

        println!("{}", "Recorded Deployments".bold().green());
        println!("{}", "====================".green());
        for deployment in deployments {
            println!("\n{deployment}");
        }
    }
}
