//! Tracing initialization.

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Level used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "warn";

/// Initializes the tracing subscriber.
///
/// Records go to standard error so that standard output only carries command
/// output such as signed URLs. The level is read from `RUST_LOG` and defaults
/// to `warn`.
///
/// ```bash
/// RUST_LOG=debug s3cli -c config.json exists obj
/// RUST_LOG=s3cli_sign=trace s3cli -c config.json sign obj get 1h
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub(crate) fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(create_fmt_layer())
        .with(create_env_filter())
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}

/// Creates an environment filter, falling back to [`DEFAULT_FILTER`] when
/// `RUST_LOG` is unset or invalid.
fn create_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Creates a formatted tracing layer writing to standard error.
fn create_fmt_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_ansi(false)
}
