mod cli;

use crate::cli::{
    Cli,
    Commands,
};
use clap::Parser;
use color_eyre::{
    Result,
    eyre::Report,
};
use migrate_core::config::CliConfig;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure color_eyre to hide location information and backtrace messages
    color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install()?;

    let cli = Cli::parse();
    let mut config = CliConfig::read_from_file(&cli.args).unwrap_or_default();

    let result = async {
        match cli.command {
            Commands::Run(run) => {
                run.run(&cli.args, &mut config).await?;
            }
            Commands::Deploy(deploy) => {
                deploy.run(&cli.args, &mut config).await?;
            }
            Commands::Status(status) => {
                status.run(&cli.args, &config);
            }
            Commands::Config(config_cmd) => {
                config_cmd.run(&cli.args, &mut config)?;
            }
        }
        config.write_to_file(&cli.args)?;
        Ok::<_, Report>(())
    }
    .await;

    if let Err(err) = result {
        if cli.args.json_output() {
            eprintln!(
                "{}",
                json!({
                    "status": "error",
                    "error": {
                        "message": err.to_string(),
                    }
                })
            );
            std::process::exit(1);
        } else {
            return Err(err);
        }
    }

    Ok(())
}
