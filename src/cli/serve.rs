//! `serve`: expose analysis and SOAP generation over HTTP.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{api, config::Settings};

/// Serve `GET /health`, `POST /analyze` and `POST /soap`.
///
/// Models are loaded lazily on the first request that needs them and shared
/// by every request after that.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Interface to bind; use 0.0.0.0 to accept remote clients.
    #[arg(long, env = "NOTETAKER_HOST", default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, env = "NOTETAKER_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl Args {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    api::serve(settings, args.addr()?).await
}
