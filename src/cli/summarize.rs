//! CLI entry-point for the clinical summary.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    export,
    nlp::summary,
};

use super::TranscriptArgs;

/// Args for the `summarize` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: TranscriptArgs,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let transcript = args.input.read()?;
    let registry = super::build_registry(&settings)?;
    let summary = summary::summarize(&registry, &transcript, &settings.analysis).await;

    let path = export::write_json(
        &args.input.out_dir(&settings),
        export::SUMMARY_FILE,
        &summary,
    )?;
    info!(path = %path.display(), "clinical summary exported");
    println!("{}", export::to_pretty_json(&summary)?);
    Ok(())
}
