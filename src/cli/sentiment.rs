//! CLI entry-point for sentiment and intent annotation.

use anyhow::{bail, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    export,
    nlp::{self, SentimentOutcome},
};

use super::TranscriptArgs;

/// Args for the `sentiment` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: TranscriptArgs,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let transcript = args.input.read()?;
    let registry = super::build_registry(&settings)?;
    match nlp::annotate_transcript(&registry, &transcript, &settings.analysis).await {
        SentimentOutcome::Annotated { utterances } => {
            let path = export::write_json(
                &args.input.out_dir(&settings),
                export::SENTIMENT_FILE,
                &utterances,
            )?;
            info!(path = %path.display(), rows = utterances.len(), "sentiment exported");
            println!("{}", export::to_pretty_json(&utterances)?);
            Ok(())
        }
        SentimentOutcome::NoPatientDialogue => {
            warn!("no patient dialogue found; ensure lines start with 'Patient:'");
            Ok(())
        }
        SentimentOutcome::Failed { error } => bail!("sentiment analysis failed: {error}"),
    }
}
