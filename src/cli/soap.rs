//! CLI entry-point for SOAP note generation.

use anyhow::{bail, Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    export,
    soap::{self, gemini::GeminiConnector, SoapOptions, SoapOutcome},
};

use super::{ApiKeyArgs, TranscriptArgs};

/// Args for the `soap` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub input: TranscriptArgs,
    #[command(flatten)]
    pub key: ApiKeyArgs,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let Some(api_key) = args.key.api_key.as_deref() else {
        bail!("API key required: pass --api-key or set GOOGLE_API_KEY");
    };
    let transcript = args.input.read()?;
    let outcome = generate(&settings, api_key, &transcript).await?;
    println!("{}", export::to_pretty_json(&outcome)?);

    match &outcome {
        SoapOutcome::Note(note) => {
            let path =
                export::write_json(&args.input.out_dir(&settings), export::SOAP_FILE, note)?;
            info!(path = %path.display(), "soap note exported");
            Ok(())
        }
        SoapOutcome::Failed(failure) => {
            bail!("{}: {}", failure.error.as_str(), failure.details)
        }
    }
}

pub(crate) async fn generate(
    settings: &Settings,
    api_key: &str,
    transcript: &str,
) -> Result<SoapOutcome> {
    let connector = GeminiConnector::new(&settings.soap).context("building generative client")?;
    let options = SoapOptions::from(&settings.soap);
    Ok(soap::generate_soap_note(&connector, api_key, transcript, &options).await)
}
