//! `tracing` subscriber setup for the binary and for embedding applications
//!
//! Console events go to stderr so JSON results on stdout stay machine-readable.
//! Optional file logging writes one JSON object per event to a daily rolling
//! file named `airport-facility-sim.YYYY-MM-DD`.

use std::io;
use tracing::{debug, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const LOG_FILE_PREFIX: &str = "airport-facility-sim";

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleFormat {
    /// Multi-line human readable output
    #[default]
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event
    Json,
}

/// Where and how much the simulator logs
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Maximum level for this crate's events, unless `RUST_LOG` is set
    pub level: Level,
    /// Console output format
    pub console_format: ConsoleFormat,
    /// Directory for the rolling JSON log files
    pub log_directory: Option<String>,
    /// Log span open and close, which times each simulator and optimizer run
    pub enable_span_events: bool,
    /// Colored console output
    pub enable_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            console_format: ConsoleFormat::Pretty,
            log_directory: None,
            enable_span_events: false,
            enable_ansi: true,
        }
    }
}

impl LoggingConfig {
    /// INFO to a pretty console, no files
    pub fn new() -> Self {
        Self::default()
    }

    /// Level picked from the CLI verbosity flags, debug winning over verbose
    ///
    /// Without either flag only warnings are shown: unstaffed urgent tasks,
    /// gate fallbacks and steps that did not converge.
    pub fn for_cli(verbose: bool, debug: bool) -> Self {
        let level = match (verbose, debug) {
            (_, true) => Level::DEBUG,
            (true, false) => Level::INFO,
            (false, false) => Level::WARN,
        };
        Self { level, enable_span_events: verbose || debug, ..Self::default() }
    }

    /// Override the level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Override the console format
    pub fn with_console_format(mut self, format: ConsoleFormat) -> Self {
        self.console_format = format;
        self
    }

    /// Also write JSON events to daily files in `directory`
    pub fn with_file_logging(mut self, directory: impl Into<String>) -> Self {
        self.log_directory = Some(directory.into());
        self
    }

    /// Plain console output, for terminals and CI logs without color support
    pub fn without_ansi(mut self) -> Self {
        self.enable_ansi = false;
        self
    }

    fn span_events(&self) -> FmtSpan {
        match self.enable_span_events {
            true => FmtSpan::NEW | FmtSpan::CLOSE,
            false => FmtSpan::NONE,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level))
        })
    }

    fn console_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let layer = fmt::layer().with_writer(io::stderr).with_span_events(self.span_events());
        match self.console_format {
            ConsoleFormat::Pretty => layer.pretty().with_ansi(self.enable_ansi).boxed(),
            ConsoleFormat::Compact => layer.compact().with_ansi(self.enable_ansi).boxed(),
            ConsoleFormat::Json => layer.json().boxed(),
        }
    }

    /// Install the global subscriber; fails if one is already installed
    pub fn init(self) -> InitResult {
        let registry = Registry::default().with(self.filter()).with(self.console_layer());

        match &self.log_directory {
            Some(directory) => {
                let (writer, guard) = non_blocking(rolling::daily(directory, LOG_FILE_PREFIX));
                let file_layer = fmt::layer().json().with_writer(writer).with_span_events(self.span_events());
                registry.with(file_layer).try_init()?;
                // the writer thread must outlive every event of the process
                std::mem::forget(guard);
            }
            None => registry.try_init()?,
        }

        debug!(level = %self.level, format = ?self.console_format, files = ?self.log_directory, "Logging initialized");
        Ok(())
    }
}
