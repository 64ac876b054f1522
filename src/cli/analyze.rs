//! CLI entry-point running every analysis over one transcript.

use anyhow::Result;
use clap::Args as ClapArgs;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    config::Settings,
    export,
    nlp::{self, SentimentOutcome},
    soap::SoapOutcome,
};

use super::{ApiKeyArgs, TranscriptArgs};

/// Args for the `analyze` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: TranscriptArgs,
    /// Also generate the SOAP note (needs an API key).
    #[arg(long)]
    pub soap: bool,
    #[command(flatten)]
    pub key: ApiKeyArgs,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let transcript = args.input.read()?;
    let out_dir = args.input.out_dir(&settings);
    let registry = super::build_registry(&settings)?;

    let report = nlp::analyze(&registry, &transcript, &settings.analysis).await;
    export::write_json(&out_dir, export::SUMMARY_FILE, &report.summary)?;
    if let SentimentOutcome::Annotated { utterances } = &report.sentiment {
        export::write_json(&out_dir, export::SENTIMENT_FILE, utterances)?;
    }

    let soap = if args.soap {
        match args.key.api_key.as_deref() {
            Some(api_key) => {
                let outcome = super::soap::generate(&settings, api_key, &transcript).await?;
                if let SoapOutcome::Note(note) = &outcome {
                    export::write_json(&out_dir, export::SOAP_FILE, note)?;
                }
                Some(outcome)
            }
            None => {
                warn!("--soap given without an API key; skipping SOAP note");
                None
            }
        }
    } else {
        None
    };

    info!(dir = %out_dir.display(), "analysis artefacts written");
    let combined = json!({
        "summary": report.summary,
        "sentiment": report.sentiment,
        "soap_note": soap,
    });
    println!("{}", export::to_pretty_json(&combined)?);
    Ok(())
}
