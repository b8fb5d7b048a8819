//! Process-wide tracing subscriber

use std::fmt;

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;
use crate::error::{Error, Result};

/// Renders `timestamp - target - LEVEL - message`
#[derive(Debug, Default, Clone, Copy)]
pub struct DashFormat;

impl<S, N> FormatEvent<S, N> for DashFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{} - {} - {} - ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            metadata.target(),
            level_name(metadata.level()),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_name(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Install the global subscriber. Call once, before serving.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_tracing(level: LevelFilter, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().event_format(DashFormat))
            .try_init(),
    };

    result.map_err(|e| Error::invalid_config(format!("failed to install logger: {}", e)))
}
