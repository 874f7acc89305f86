// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Tracing formatter for the adapter's own logs.
//!
//! Lines are prefixed so they are easy to tell apart from the container
//! output the adapter forwards:
//!
//! ```text
//! SOLR_ADAPTER | WARN | SOLR | Write attempt 1 failed, retrying: ...
//! ```

use std::fmt;
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext, FormattedFields,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

pub const LOG_PREFIX: &str = "SOLR_ADAPTER";

#[derive(Debug, Clone, Copy)]
pub struct Formatter;

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(&mut writer, "{} | {} | ", LOG_PREFIX, metadata.level())?;

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{fields}}}")?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Filter for `level`, with the HTTP stack silenced.
#[must_use]
pub fn env_filter(level: &str) -> EnvFilter {
    let directives = format!("h2=off,hyper=off,hyper_util=off,reqwest=off,rustls=off,{level}");
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the adapter formatter as the global subscriber.
///
/// Fails if the host already installed one.
pub fn init(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::fmt::Subscriber::builder()
        .with_ansi(false)
        .event_format(Formatter)
        .with_env_filter(env_filter(level))
        .finish()
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_formatter_prefix_and_spans() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_ansi(false)
            .with_writer(buffer.clone())
            .event_format(Formatter)
            .with_env_filter(env_filter("debug"))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("deliver", attempt = 2);
            let _guard = span.enter();
            tracing::warn!(container = "web", "write failed");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            output,
            "SOLR_ADAPTER | WARN | deliver{attempt=2}: write failed container=\"web\"\n"
        );
    }

    #[test]
    fn test_env_filter_respects_level() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_ansi(false)
            .with_writer(buffer.clone())
            .event_format(Formatter)
            .with_env_filter(env_filter("warn"))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hidden");
            tracing::error!("shown");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output, "SOLR_ADAPTER | ERROR | shown\n");
    }
}
