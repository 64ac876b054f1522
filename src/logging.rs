//! Structured logging bootstrap using `tracing`.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset, by `-v` count.
///
/// Crate and HTTP-layer events are shown; chatty dependencies stay at `warn`.
pub fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "physician_notetaker=info,tower_http=info,warn",
        1 => "physician_notetaker=debug,tower_http=debug,info",
        _ => "trace",
    }
}

/// Install a global tracing subscriber writing to stderr, so JSON printed on
/// stdout stays machine-readable.
pub fn init_tracing(verbosity: u8) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbosity)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(verbosity > 0)
        .with_file(verbosity > 1)
        .with_line_number(verbosity > 1)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;

    tracing::debug!(verbosity, "tracing initialised");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        for verbosity in 0..3 {
            assert!(EnvFilter::try_new(default_directives(verbosity)).is_ok());
        }
    }
}
