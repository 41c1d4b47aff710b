use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;
use std::time::Duration;

use crate::report::ReportLabels;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the directly fetched track (BCP-47 style tag)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language the source track is translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Directory receiving one report per video
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pause between videos that contacted the service, in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Transcript service settings
    #[serde(default)]
    pub youtube: YoutubeConfig,

    /// Report layout
    #[serde(default)]
    pub report: ReportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// YouTube client configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct YoutubeConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Accept-Language header sent with page requests
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            accept_language: default_accept_language(),
        }
    }
}

impl YoutubeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Text used when rendering the bilingual report
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReportConfig {
    /// First line of every report
    #[serde(default = "default_header")]
    pub header: String,

    /// Prefix of source-language lines, the source language name when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,

    /// Prefix of target-language lines, the target language name when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,

    /// Shown when the source track has no entry at a timestamp
    #[serde(default = "default_source_placeholder")]
    pub source_placeholder: String,

    /// Shown when the target track has no entry at a timestamp
    #[serde(default = "default_target_placeholder")]
    pub target_placeholder: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            source_label: None,
            target_label: None,
            source_placeholder: default_source_placeholder(),
            target_placeholder: default_target_placeholder(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "zh-Hans".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("youtube_subtitles")
}

fn default_request_delay_ms() -> u64 {
    1000 // 1 second between videos
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_accept_language() -> String {
    "en-US".to_string()
}

fn default_header() -> String {
    "=== Bilingual Subtitles ===".to_string()
}

fn default_source_placeholder() -> String {
    "[no corresponding source text]".to_string()
}

fn default_target_placeholder() -> String {
    "[no corresponding target text]".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.source_language)?;
        crate::language_utils::validate_language_code(&self.target_language)?;

        if crate::language_utils::tags_equal(&self.source_language, &self.target_language) {
            return Err(anyhow!(
                "Source and target language must differ (both are '{}')",
                self.source_language
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        if self.youtube.timeout_secs == 0 {
            return Err(anyhow!("YouTube request timeout must be at least one second"));
        }

        Ok(())
    }

    /// Pause applied between videos
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Line prefixes for the configured language pair
    pub fn report_labels(&self) -> ReportLabels {
        ReportLabels::for_languages(&self.report, &self.source_language, &self.target_language)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            output_dir: default_output_dir(),
            request_delay_ms: default_request_delay_ms(),
            youtube: YoutubeConfig::default(),
            report: ReportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
