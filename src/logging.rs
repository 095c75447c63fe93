//! Logging setup
//!
//! Events go to stderr (stdout carries the event stream for the host), in
//! text or JSON, with an optional daily-rolling log file.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Selects the stderr log format
pub const LOG_FORMAT_ENV: &str = "JUPYTER_AGENT_LOG_FORMAT";

/// Directory for rolling log files
pub const LOG_DIR_ENV: &str = "JUPYTER_AGENT_LOG_DIR";

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "jupyter_deepagents=info";

const LOG_FILE_PREFIX: &str = "jupyter-deepagents.log";

/// Output format for stderr logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directives used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Write a daily-rolling log file here as well
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            default_filter: DEFAULT_FILTER.to_string(),
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Read format and log directory from the environment
    pub fn from_env() -> Self {
        let format = match env::var(LOG_FORMAT_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                eprintln!("Warning: {}; using text logs", e);
                LogFormat::Text
            }),
            Err(_) => LogFormat::Text,
        };
        Self {
            format,
            log_dir: env::var_os(LOG_DIR_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }
}

/// Install the global tracing subscriber
///
/// Keep the returned guard alive for as long as file logging should flush.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?;

    let text_layer = (config.format == LogFormat::Text)
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));
    let json_layer = (config.format == LogFormat::Json)
        .then(|| fmt::layer().json().with_writer(std::io::stderr));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()?;

    tracing::debug!("Logging initialized ({:?})", config.format);
    Ok(guard)
}
