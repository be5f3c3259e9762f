//! Console logging plus optional daily rotating log files.

use std::path::Path;

use tracing::{Level, Metadata};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use aquahub_core::config::LoggingConfig;
use aquahub_core::error::{AppError, ErrorKind};

const DATABASE_TARGET: &str = "aquahub::database";
const HTTP_TARGET: &str = "tower_http";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// One family of rotated log files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFile {
    App,
    Error,
    Database,
    Http,
}

impl LogFile {
    const ALL: [LogFile; 4] = [Self::App, Self::Error, Self::Database, Self::Http];

    fn prefix(self) -> &'static str {
        match self {
            Self::App => "App",
            Self::Error => "Error",
            Self::Database => "DB",
            Self::Http => "HTTP",
        }
    }

    fn accepts(self, level: &Level, target: &str) -> bool {
        let database = target.starts_with(DATABASE_TARGET);
        let http = target.starts_with(HTTP_TARGET);
        match self {
            Self::App => *level >= Level::INFO && !database && !http,
            Self::Error => *level <= Level::WARN,
            Self::Database => database,
            Self::Http => http,
        }
    }
}

/// Installs the global subscriber.
///
/// The returned guards flush the file writers on drop and must be held
/// until the process exits.
pub fn init(config: &LoggingConfig) -> Result<Vec<WorkerGuard>, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console: BoxedLayer = match config.format.as_str() {
        "json" => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        _ => fmt::layer().pretty().with_target(true).boxed(),
    };
    let mut layers: Vec<BoxedLayer> = vec![console];

    let mut guards = Vec::new();
    if let Some(directory) = config.directory.as_deref().filter(|d| !d.is_empty()) {
        let (files, file_guards) = file_layers(Path::new(directory), config.max_files)?;
        layers.extend(files);
        guards = file_guards;
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to install logger", e))?;

    Ok(guards)
}

fn file_layers(
    directory: &Path,
    max_files: usize,
) -> Result<(Vec<BoxedLayer>, Vec<WorkerGuard>), AppError> {
    let mut layers = Vec::with_capacity(LogFile::ALL.len());
    let mut guards = Vec::with_capacity(LogFile::ALL.len());

    for file in LogFile::ALL {
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(file.prefix())
            .filename_suffix("log")
            .max_log_files(max_files.max(1))
            .build(directory)
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Cannot open {} log in {}", file.prefix(), directory.display()),
                    e,
                )
            })?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_filter(filter_fn(move |meta: &Metadata<'_>| {
                file.accepts(meta.level(), meta.target())
            }))
            .boxed();
        layers.push(layer);
        guards.push(guard);
    }

    Ok((layers, guards))
}
