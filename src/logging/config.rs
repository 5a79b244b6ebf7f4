//! `logging` section of the configuration file
//!
//! A profile supplies every setting; fields given in the file override it.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Console,
    File,
    Both,
}

impl LogOutput {
    pub fn writes_file(&self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    Daily,
    Hourly,
    Never,
}

/// Named set of logging defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogProfile {
    /// Info level text on the console
    #[default]
    Standard,
    /// Debug level text on the console with thread ids and source locations
    Development,
    /// Info level JSON on the console and in a daily rolling file
    Production,
}

impl LogProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogProfile::Standard => "standard",
            LogProfile::Development => "development",
            LogProfile::Production => "production",
        }
    }

    fn settings(self) -> LogSettings {
        let standard = LogSettings {
            level: LogLevel::Info,
            format: LogFormat::Text,
            output: LogOutput::Console,
            directory: default_log_directory(),
            rotation: RotationStrategy::Daily,
            module_levels: BTreeMap::new(),
            thread_ids: false,
            source_locations: false,
        };

        match self {
            LogProfile::Standard => standard,
            LogProfile::Development => LogSettings {
                level: LogLevel::Debug,
                rotation: RotationStrategy::Never,
                thread_ids: true,
                source_locations: true,
                ..standard
            },
            LogProfile::Production => LogSettings {
                format: LogFormat::Json,
                output: LogOutput::Both,
                ..standard
            },
        }
    }
}

impl fmt::Display for LogProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logging configuration as written in the file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub profile: LogProfile,
    pub level: Option<LogLevel>,
    pub format: Option<LogFormat>,
    pub output: Option<LogOutput>,
    pub log_directory: Option<PathBuf>,
    pub rotation: Option<RotationStrategy>,
    /// Per-target levels on top of the global level
    pub module_levels: BTreeMap<String, LogLevel>,
}

impl LoggingConfig {
    /// Apply the file's overrides to the profile defaults
    pub fn resolve(&self) -> LogSettings {
        let mut settings = self.profile.settings();

        if let Some(level) = self.level {
            settings.level = level;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(directory) = &self.log_directory {
            settings.directory = directory.clone();
        }
        if let Some(rotation) = self.rotation {
            settings.rotation = rotation;
        }
        settings.module_levels.extend(
            self.module_levels
                .iter()
                .map(|(target, level)| (target.clone(), *level)),
        );

        settings
    }
}

/// Effective logging settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Only used when `output` writes a file
    pub directory: PathBuf,
    pub rotation: RotationStrategy,
    pub module_levels: BTreeMap<String, LogLevel>,
    pub thread_ids: bool,
    pub source_locations: bool,
}

fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("protected-resource").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}
