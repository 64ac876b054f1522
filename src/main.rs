//! physician-notetaker binary: parse arguments, set up logging, run one command.

use anyhow::Result;
use physician_notetaker::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbosity())?;
    let settings = Settings::load()?;

    info!(command = cli.command_name(), "starting command");
    cli.dispatch(settings).await
}
