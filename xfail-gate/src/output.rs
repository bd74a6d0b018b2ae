// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use clap::{
    Args, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use owo_colors::{OwoColorize, Style, style};
use std::{
    fmt,
    io::{self, BufWriter, Write},
};
use tracing::{Event, Level, Subscriber, level_filters::LevelFilter, warn};
use tracing_subscriber::{
    Layer,
    filter::Targets,
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};
use xfail_runner::reconcile::DiagnosticStyles;

/// Log target for lines that are printed without an `error:`/`info:` heading.
pub(crate) const NO_HEADING: &str = "xfail_gate::no_heading";

const LOG_ENV: &str = "XFAIL_GATE_LOG";

/// Help output styles, matching Cargo's.
pub(crate) const fn clap_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
}

#[derive(Copy, Clone, Debug, Args)]
#[must_use]
pub(crate) struct OutputOpts {
    /// Verbose output
    #[arg(long, short, env = "XFAIL_GATE_VERBOSE")]
    pub(crate) verbose: bool,

    /// Produce color output: auto, always, never
    #[arg(
        long,
        value_enum,
        default_value_t,
        hide_possible_values = true,
        value_name = "WHEN",
        env = "CARGO_TERM_COLOR"
    )]
    pub(crate) color: Color,
}

impl OutputOpts {
    pub(crate) fn init(self) -> OutputContext {
        let OutputOpts { verbose, color } = self;

        color.init(verbose);

        OutputContext { color }
    }
}

#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct OutputContext {
    pub(crate) color: Color,
}

impl OutputContext {
    /// Returns general stderr styles for the current output context.
    pub fn stderr_styles(&self) -> StderrStyles {
        let mut styles = StderrStyles::default();

        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.colorize();
        }

        styles
    }

    /// Returns styles for per-test diagnostics, which are written to stderr.
    pub fn diagnostic_styles(&self) -> DiagnosticStyles {
        let mut styles = DiagnosticStyles::default();

        if self.color.should_colorize(supports_color::Stream::Stderr) {
            styles.colorize();
        }

        styles
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
#[must_use]
pub enum Color {
    #[default]
    Auto,
    Always,
    Never,
}

impl Color {
    pub(crate) fn init(self, verbose: bool) {
        static INIT_LOGGER: std::sync::Once = std::sync::Once::new();

        let formatter = HeadingFormatter {
            colorize: self.should_colorize(supports_color::Stream::Stderr),
        };

        INIT_LOGGER.call_once(|| {
            let default_level = if verbose {
                LevelFilter::DEBUG
            } else {
                LevelFilter::INFO
            };
            let (targets, invalid_filter) = log_targets(default_level);

            let layer = tracing_subscriber::fmt::layer()
                .event_format(formatter)
                .with_writer(io::stderr)
                .with_filter(targets);

            tracing_subscriber::registry().with(layer).init();

            if let Some(reason) = invalid_filter {
                warn!("ignoring {LOG_ENV}: {reason}");
            }
        });
    }

    pub(crate) fn should_colorize(self, stream: supports_color::Stream) -> bool {
        match self {
            Color::Auto => supports_color::on_cached(stream).is_some(),
            Color::Always => true,
            Color::Never => false,
        }
    }
}

/// Reads the log filter from the environment. If it's unset or empty, `default_level` is used.
///
/// An invalid filter also falls back to `default_level`, and the reason is returned so it can be
/// logged once the subscriber is installed.
fn log_targets(default_level: LevelFilter) -> (Targets, Option<String>) {
    let default_targets = Targets::new().with_default(default_level);
    let Some(level_str) = std::env::var_os(LOG_ENV) else {
        return (default_targets, None);
    };
    let Some(level_str) = level_str.to_str() else {
        return (default_targets, Some("value is not valid UTF-8".to_owned()));
    };
    if level_str.is_empty() {
        return (default_targets, None);
    }

    match level_str.parse() {
        Ok(targets) => (targets, None),
        Err(error) => (default_targets, Some(error.to_string())),
    }
}

/// Formats each event as `<level>: <message>`, like Cargo does.
struct HeadingFormatter {
    colorize: bool,
}

impl HeadingFormatter {
    fn heading(&self, level: Level) -> (&'static str, Style) {
        let (heading, colored) = match level {
            Level::ERROR => ("error", style().red().bold()),
            Level::WARN => ("warning", style().yellow().bold()),
            Level::INFO => ("info", style().bold()),
            Level::DEBUG => ("debug", style().bold()),
            Level::TRACE => ("trace", style().dimmed()),
        };
        (heading, if self.colorize { colored } else { style() })
    }
}

impl<S, N> FormatEvent<S, N> for HeadingFormatter
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
        if metadata.target() != NO_HEADING {
            let (heading, heading_style) = self.heading(*metadata.level());
            write!(writer, "{}: ", heading.style(heading_style))?;
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Debug, Default)]
pub struct StderrStyles {
    pub(crate) bold: Style,
    pub(crate) warning_text: Style,
}

impl StderrStyles {
    fn colorize(&mut self) {
        self.bold = style().bold();
        self.warning_text = style().yellow();
    }
}

/// A helper for capturing output in tests
///
/// The test pass is gated by `#[cfg(test)]` to allow a better
/// optimization in the binary.
#[derive(Default)]
pub enum OutputWriter {
    /// No capture
    #[default]
    Normal,
    /// Output captured
    #[cfg(test)]
    Test {
        /// stdout capture
        stdout: Vec<u8>,
        /// stderr capture
        stderr: Vec<u8>,
    },
}

impl OutputWriter {
    /// Returns a writer for the raw result stream in `--dump` mode.
    pub(crate) fn stdout_writer(&mut self) -> Box<dyn Write + '_> {
        match self {
            Self::Normal => Box::new(BufWriter::new(io::stdout())),
            #[cfg(test)]
            Self::Test { stdout, .. } => Box::new(stdout),
        }
    }

    /// Returns a writer for the echoed command line and per-test diagnostics.
    pub(crate) fn stderr_writer(&mut self) -> Box<dyn Write + '_> {
        match self {
            Self::Normal => Box::new(BufWriter::new(io::stderr())),
            #[cfg(test)]
            Self::Test { stderr, .. } => Box::new(stderr),
        }
    }
}
