//! The global tracing subscriber: a console formatter and a log-file layer.
use std::fmt;
use std::fs;
use std::io::{LineWriter, Write as _};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::types::Channel;
use super::utils::{HEADER_STAMP, LINE_STAMP, log_file_path, strip_ansi, utc_now};

/// The `message` field of an event.
#[derive(Default)]
struct Message(String);

impl Message {
    fn of(event: &tracing::Event<'_>) -> String {
        let mut message = Self::default();
        event.record(&mut message);
        message.0
    }
}

impl Visit for Message {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// One console line, without the trailing newline.
///
/// Without `color` every escape sequence is removed, including any the
/// message carries itself.
fn console_line(channel: Channel, msg: &str, color: bool) -> String {
    if !color {
        let msg = strip_ansi(msg);
        return match channel {
            Channel::Stage => format!("==> {msg}"),
            Channel::Error => format!("ERROR {msg}"),
            Channel::Warn => format!("WARN  {msg}"),
            Channel::DryRun => format!("  [DRY RUN] {msg}"),
            Channel::Info | Channel::Debug => format!("  {msg}"),
        };
    }
    match channel {
        Channel::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        Channel::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        Channel::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
        Channel::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
        Channel::Info => format!("  {msg}"),
        Channel::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// One log file line: timestamp, channel tag, plain message.
fn file_line(channel: Channel, stamp: &str, msg: &str) -> String {
    let msg = strip_ansi(msg);
    let tag = match channel {
        Channel::Stage => return format!("[{stamp}] ==> {msg}"),
        Channel::Info => "",
        Channel::Debug => "[debug] ",
        Channel::Warn => "[warn] ",
        Channel::Error => "[error] ",
        Channel::DryRun => "[dry run] ",
    };
    format!("[{stamp}]     {tag}{msg}")
}

/// Layer appending every event to a per-command log file.
#[derive(Debug)]
pub(super) struct FileLayer {
    sink: Mutex<LineWriter<fs::File>>,
}

impl FileLayer {
    /// Layer writing to `<cache>/sitebuild/<command>.log`.
    ///
    /// Returns `None` when the file cannot be created; the run then logs to
    /// the console only.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::create(&log_file_path(command)?, command)
    }

    /// Truncate `path`, write a header naming the run, and append from
    /// there on.
    pub(super) fn create(path: &Path, command: &str) -> Option<Self> {
        let version =
            option_env!("SITEBUILD_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let mut sink = LineWriter::new(fs::File::create(path).ok()?);
        writeln!(
            sink,
            "### sitebuild {version} {command} started {} UTC",
            utc_now(HEADER_STAMP)
        )
        .ok()?;
        Some(Self {
            sink: Mutex::new(sink),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _: tracing_subscriber::layer::Context<'_, S>) {
        let line = file_line(Channel::of(event), &utc_now(LINE_STAMP), &Message::of(event));
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink, "{line}").ok();
    }
}

/// Console event format; see [`console_line`].
struct ConsoleFormat {
    color: bool,
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        writeln!(
            writer,
            "{}",
            console_line(Channel::of(event), &Message::of(event), self.color)
        )
    }
}

/// Install the process-wide subscriber. Call once, before logging.
///
/// Warnings and errors go to stderr, everything else to stdout; debug lines
/// reach the console only with `verbose`. The log file for `command`
/// receives every event regardless.
pub fn init_subscriber(verbose: bool, command: &str, color: bool) {
    use tracing::Level;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;
    use tracing_subscriber::Layer as _;

    let streams = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat { color })
        .with_writer(streams)
        .with_filter(if verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        });
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
