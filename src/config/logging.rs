use std::env;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    Initialization(String),

    #[error("Invalid LOG_LEVEL: {0}")]
    InvalidLogLevel(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),
}

fn filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive)
        .map_err(|e| LoggingError::InvalidLogLevel(format!("{}: {}", directive, e)))
}

/// Set up the tracing subscriber. Console output is always on; a daily
/// rotating file is added when APP_LOG_FILE names a path. The level
/// directive comes from LOG_LEVEL and defaults to INFO.
pub fn init_logging() -> Result<(), LoggingError> {
    let directive = env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string());
    let log_file: Option<PathBuf> = env::var("APP_LOG_FILE").ok().map(PathBuf::from);

    let console = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter(&directive)?);
    let registry = tracing_subscriber::registry().with(console);

    let Some(path) = log_file else {
        return registry
            .try_init()
            .map_err(|e| LoggingError::Initialization(e.to_string()));
    };

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)?;
    }
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::Initialization("APP_LOG_FILE has no file name".to_string()))?;
    let appender = tracing_appender::rolling::daily(dir.unwrap_or(Path::new(".")), file_name);

    let file = fmt::layer()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter(&directive)?);

    registry
        .with(file)
        .try_init()
        .map_err(|e| LoggingError::Initialization(e.to_string()))
}
