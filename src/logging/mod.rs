//! Logging system
//!
//! Structured logs through `tracing`. The config file picks a profile
//! (`standard`, `development` or `production`) and may override its level,
//! format, output, directory, rotation and per-target levels.
//!
//! Access denials are logged by the pipeline at `warn` with their code and
//! stage. Tokens are never logged.

mod config;


pub use config::{
    LogFormat, LogLevel, LogOutput, LogProfile, LogSettings, LoggingConfig, RotationStrategy,
};

use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file name prefix inside the log directory
pub const LOG_FILE_NAME: &str = "protected-resource.log";

/// Logging system errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Installed logging subscriber
///
/// Keep this alive for the lifetime of the process; dropping it flushes and
/// stops the background file writer.
pub struct LoggingSystem {
    profile: LogProfile,
    settings: LogSettings,
    _guards: Vec<WorkerGuard>,
}

impl LoggingSystem {
    /// Resolve the configured profile and install the global subscriber
    pub fn init(config: &LoggingConfig) -> LoggingResult<Self> {
        let settings = config.resolve();
        if settings.output.writes_file() {
            std::fs::create_dir_all(&settings.directory).map_err(|e| {
                LoggingError::DirectoryCreationError(format!(
                    "Failed to create log directory {:?}: {}",
                    settings.directory, e
                ))
            })?;
        }

        let mut guards = Vec::new();
        let env_filter = Self::build_env_filter(&settings);
        let registry = tracing_subscriber::registry();

        match settings.output {
            LogOutput::Console => {
                registry
                    .with(env_filter)
                    .with(Self::create_console_layer(&settings))
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
            }
            LogOutput::File => {
                let (file_layer, guard) = Self::create_file_layer(&settings);
                guards.push(guard);
                registry
                    .with(env_filter)
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
            }
            LogOutput::Both => {
                let (file_layer, guard) = Self::create_file_layer(&settings);
                guards.push(guard);
                registry
                    .with(env_filter)
                    .with(Self::create_console_layer(&settings))
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
            }
        }

        Ok(Self {
            profile: config.profile,
            settings,
            _guards: guards,
        })
    }

    /// Global level plus per-target directives, in target order.
    ///
    /// Target directives that fail to parse are skipped.
    pub(crate) fn build_env_filter(settings: &LogSettings) -> EnvFilter {
        let mut filter = EnvFilter::new(settings.level.as_str());

        for (target, level) in &settings.module_levels {
            match format!("{}={}", target, level).parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(_) => eprintln!("ignoring invalid log directive for target {target:?}"),
            }
        }

        filter
    }

    fn create_console_layer<S>(settings: &LogSettings) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_thread_ids(settings.thread_ids)
            .with_file(settings.source_locations)
            .with_line_number(settings.source_locations);

        match settings.format {
            LogFormat::Json => layer.json().boxed(),
            LogFormat::Text => layer.boxed(),
        }
    }

    fn create_file_layer<S>(
        settings: &LogSettings,
    ) -> (Box<dyn Layer<S> + Send + Sync>, WorkerGuard)
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        let file_appender = RollingFileAppender::new(
            Self::rotation(settings.rotation),
            &settings.directory,
            LOG_FILE_NAME,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_thread_ids(settings.thread_ids)
            .with_file(settings.source_locations)
            .with_line_number(settings.source_locations)
            .with_ansi(false);

        match settings.format {
            LogFormat::Json => (layer.json().boxed(), guard),
            LogFormat::Text => (layer.boxed(), guard),
        }
    }

    pub(crate) fn rotation(strategy: RotationStrategy) -> Rotation {
        match strategy {
            RotationStrategy::Daily => Rotation::DAILY,
            RotationStrategy::Hourly => Rotation::HOURLY,
            RotationStrategy::Never => Rotation::NEVER,
        }
    }

    pub fn profile(&self) -> LogProfile {
        self.profile
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    /// Directory receiving log files, when file output is enabled
    pub fn log_directory(&self) -> Option<&Path> {
        self.settings
            .output
            .writes_file()
            .then_some(self.settings.directory.as_path())
    }
}
