//! Tracing subscriber setup.
//!
//! Library crates log through the `log` facade; `init()` installs the
//! `LogTracer` bridge (tracing-subscriber `tracing-log` feature) so those
//! records reach the same output.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogConfig, LogFormat};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level '{}'", config.level))?
        .add_directive("actix_server=warn".parse()?);

    let mut layers: Vec<BoxedLayer> = vec![format_layer(config.format, std::io::stdout, true)];

    let guard = match &config.dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "subdomain-router.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            layers.push(format_layer(config.format, writer, false));
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("failed to install tracing subscriber")?;

    if let Some(dir) = &config.dir {
        tracing::info!("Logging to {}", dir.display());
    }
    Ok(guard)
}

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}
