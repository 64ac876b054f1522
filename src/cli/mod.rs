//! Command-line interface wiring for physician-notetaker.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::{
    config::Settings,
    nlp::{hosted, registry::ModelRegistry},
    transcript,
};

pub mod analyze;
pub mod sentiment;
pub mod serve;
pub mod soap;
pub mod summarize;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Clinical transcript notetaker", long_about = None)]
pub struct Cli {
    /// Raise log detail (-v debug, -vv trace); RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn verbosity(&self) -> u8 {
        self.verbose
    }

    /// Sub-command name for logging; arguments may carry credentials.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Summarize(_) => "summarize",
            Commands::Sentiment(_) => "sentiment",
            Commands::Soap(_) => "soap",
            Commands::Analyze(_) => "analyze",
            Commands::Serve(_) => "serve",
        }
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Summarize(args) => summarize::run(args, settings).await,
            Commands::Sentiment(args) => sentiment::run(args, settings).await,
            Commands::Soap(args) => soap::run(args, settings).await,
            Commands::Analyze(args) => analyze::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract patient name, symptoms, treatment and QA findings.
    Summarize(summarize::Args),
    /// Annotate patient utterances with sentiment and intent.
    Sentiment(sentiment::Args),
    /// Generate a structured SOAP note with the generative model.
    Soap(soap::Args),
    /// Run summary and sentiment, optionally the SOAP note too.
    Analyze(analyze::Args),
    /// Serve the JSON API.
    Serve(serve::Args),
}

/// Transcript input shared by the analysis commands.
#[derive(Debug, Clone, Args)]
pub struct TranscriptArgs {
    /// Path to a UTF-8 `.txt` transcript.
    #[arg(long)]
    pub transcript: PathBuf,
    /// Directory for JSON artefacts; defaults to OUTPUTS_DIR.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl TranscriptArgs {
    pub fn read(&self) -> Result<String> {
        transcript::read_transcript(&self.transcript)
    }

    pub fn out_dir(&self, settings: &Settings) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| settings.outputs_dir.clone())
    }
}

/// Credential for the generative model, read from the flag or GOOGLE_API_KEY.
#[derive(Clone, Args)]
pub struct ApiKeyArgs {
    /// Google AI Studio API key.
    #[arg(long = "api-key", env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ApiKeyArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyArgs")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub(crate) fn build_registry(settings: &Settings) -> Result<ModelRegistry> {
    hosted::registry_from_settings(settings).context("building inference client")
}
