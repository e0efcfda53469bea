use anyhow::Result;
use clap::Parser;

use employment_verifier::cli::commands::config::ConfigInitCommand;
use employment_verifier::cli::commands::export::ExportCommand;
use employment_verifier::cli::commands::history::{HistoryListCommand, HistoryUpdateCommand};
use employment_verifier::cli::commands::session::SessionCommand;
use employment_verifier::cli::commands::show::ShowCommand;
use employment_verifier::cli::commands::upload::UploadCommand;
use employment_verifier::cli::commands::show_how_to_get_started;
use employment_verifier::cli::{Cli, Commands, ConfigAction, HistoryAction};
use employment_verifier::config::{config, init_config};
use employment_verifier::telemetry::{init_telemetry, shutdown_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_config()?;
    let config = config()?;

    let mut observability = config.observability.clone();
    observability.json_logs |= cli.json_logs;
    init_telemetry(&observability)?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        match cli.command {
            // Default behavior: no subcommand - explain how to get started
            None => show_how_to_get_started().await,
            Some(Commands::Upload { file }) => UploadCommand::new(file).execute(config).await,
            Some(Commands::Show { raw_text }) => ShowCommand::new(raw_text).execute(config).await,
            Some(Commands::Export { format, output }) => {
                ExportCommand::new(format, output).execute(config).await
            }
            Some(Commands::Session) => SessionCommand.execute(config).await,
            Some(Commands::History { action }) => match action {
                HistoryAction::List => HistoryListCommand.execute(config).await,
                HistoryAction::Update { id, status, hr_reply } => {
                    HistoryUpdateCommand::new(id, status, hr_reply)
                        .execute(config)
                        .await
                }
            },
            Some(Commands::Config { action }) => match action {
                ConfigAction::Init { force } => ConfigInitCommand::new(force).execute(config),
            },
        }
    });

    shutdown_telemetry();
    result
}
