//! Configuration structures for the extraction pipeline.

use std::fmt::{Display, Write};
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::InvexError;

/// Keys accepted by [`InvexConfig::get`] and [`InvexConfig::set`].
pub const CONFIG_KEYS: [&str; 12] = [
    "extraction.classify_pages",
    "extraction.date_format",
    "output.delimiter",
    "output.timestamp_format",
    "output.missing_value",
    "batch.jobs",
    "batch.archive_on_success",
    "fallback.enabled",
    "fallback.provider",
    "fallback.model",
    "fallback.api_key_env",
    "fallback.min_confidence",
];

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Classification and parsing configuration.
    pub extraction: ExtractionConfig,

    /// CSV output configuration.
    pub output: OutputConfig,

    /// Batch run configuration.
    pub batch: BatchConfig,

    /// Settings for the external fallback extractor.
    pub fallback: FallbackConfig,
}

/// Classification and parsing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of leading pages scanned for vendor fingerprints.
    pub classify_pages: u32,

    /// chrono format used for dates in the output.
    pub date_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            classify_pages: 2,
            date_format: "%d.%m.%Y".to_string(),
        }
    }
}

/// CSV output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Field delimiter. Semicolon, since amounts use comma decimals.
    pub delimiter: char,

    /// chrono format for timestamps embedded in file names.
    pub timestamp_format: String,

    /// Text written for absent values.
    pub missing_value: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            timestamp_format: "%Y%m%d_%H%M%S".to_string(),
            missing_value: "N/A".to_string(),
        }
    }
}

/// Batch run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents parsed concurrently.
    pub jobs: usize,

    /// Move successfully parsed documents to the archive folder.
    pub archive_on_success: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            archive_on_success: true,
        }
    }
}

/// Settings handed to the LLM-based fallback extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Whether the surrounding application may call the fallback.
    pub enabled: bool,

    /// Provider name, e.g. "openai".
    pub provider: String,

    /// Model identifier passed to the provider.
    pub model: String,

    /// Environment variable holding the API key. The key itself is never stored.
    pub api_key_env: String,

    /// Minimum confidence for accepting a fallback result.
    pub min_confidence: f32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "INVEX_FALLBACK_API_KEY".to_string(),
            min_confidence: 0.8,
        }
    }
}

impl FallbackConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check the values serde accepts but the pipeline cannot use.
    ///
    /// Both chrono formats are rendered once, so a format that would fail later while
    /// writing CSV or file names is rejected here.
    pub fn validate(&self) -> Result<(), InvexError> {
        if !self.output.delimiter.is_ascii() {
            return Err(InvexError::Config(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                self.output.delimiter
            )));
        }
        if self.extraction.classify_pages == 0 {
            return Err(InvexError::Config(
                "extraction.classify_pages must be at least 1".to_string(),
            ));
        }
        if self.batch.jobs == 0 {
            return Err(InvexError::Config("batch.jobs must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.fallback.min_confidence) {
            return Err(InvexError::Config(format!(
                "fallback.min_confidence must be between 0 and 1, got {}",
                self.fallback.min_confidence
            )));
        }

        let mut sample = String::new();
        let date_format = &self.extraction.date_format;
        if write!(sample, "{}", NaiveDate::default().format(date_format)).is_err() {
            return Err(unusable_format("extraction.date_format", date_format));
        }
        let timestamp_format = &self.output.timestamp_format;
        if write!(sample, "{}", Local::now().format(timestamp_format)).is_err() {
            return Err(unusable_format("output.timestamp_format", timestamp_format));
        }

        Ok(())
    }

    /// Current value of a config key, rendered as text.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "extraction.classify_pages" => self.extraction.classify_pages.to_string(),
            "extraction.date_format" => self.extraction.date_format.clone(),
            "output.delimiter" => self.output.delimiter.to_string(),
            "output.timestamp_format" => self.output.timestamp_format.clone(),
            "output.missing_value" => self.output.missing_value.clone(),
            "batch.jobs" => self.batch.jobs.to_string(),
            "batch.archive_on_success" => self.batch.archive_on_success.to_string(),
            "fallback.enabled" => self.fallback.enabled.to_string(),
            "fallback.provider" => self.fallback.provider.clone(),
            "fallback.model" => self.fallback.model.clone(),
            "fallback.api_key_env" => self.fallback.api_key_env.clone(),
            "fallback.min_confidence" => self.fallback.min_confidence.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Parse `value` into the field named by `key`.
    ///
    /// The change is only applied if the resulting configuration still validates.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), InvexError> {
        let mut updated = self.clone();
        match key {
            "extraction.classify_pages" => updated.extraction.classify_pages = parse_value(key, value)?,
            "extraction.date_format" => updated.extraction.date_format = value.to_string(),
            "output.delimiter" => updated.output.delimiter = parse_value(key, value)?,
            "output.timestamp_format" => updated.output.timestamp_format = value.to_string(),
            "output.missing_value" => updated.output.missing_value = value.to_string(),
            "batch.jobs" => updated.batch.jobs = parse_value(key, value)?,
            "batch.archive_on_success" => updated.batch.archive_on_success = parse_value(key, value)?,
            "fallback.enabled" => updated.fallback.enabled = parse_value(key, value)?,
            "fallback.provider" => updated.fallback.provider = value.to_string(),
            "fallback.model" => updated.fallback.model = value.to_string(),
            "fallback.api_key_env" => updated.fallback.api_key_env = value.to_string(),
            "fallback.min_confidence" => updated.fallback.min_confidence = parse_value(key, value)?,
            _ => {
                return Err(InvexError::Config(format!(
                    "unknown configuration key: {} (known keys: {})",
                    key,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }

        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, InvexError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| InvexError::Config(format!("invalid value '{}' for {}: {}", value, key, e)))
}

fn unusable_format(key: &str, format: &str) -> InvexError {
    InvexError::Config(format!("'{}' is not a usable chrono format for {}", format, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InvexConfig =
            serde_json::from_str(r#"{ "batch": { "jobs": 4 } }"#).unwrap();
        assert_eq!(config.batch.jobs, 4);
        assert!(config.batch.archive_on_success);
        assert_eq!(config.output.delimiter, ';');
        assert_eq!(config.extraction.classify_pages, 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvexConfig::default();
        config.fallback.model = "local-model".to_string();
        config.save(&path).unwrap();

        let loaded = InvexConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = InvexConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(InvexConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_formats() {
        let mut config = InvexConfig::default();
        config.extraction.date_format = "%Q".to_string();
        assert!(matches!(config.validate(), Err(InvexError::Config(_))));

        // a time specifier cannot be rendered from a date
        config.extraction.date_format = "%d.%m.%Y %H:%M".to_string();
        assert!(matches!(config.validate(), Err(InvexError::Config(_))));

        let mut config = InvexConfig::default();
        config.output.timestamp_format = "%Y%m%d_%".to_string();
        assert!(matches!(config.validate(), Err(InvexError::Config(_))));
    }

    #[test]
    fn test_get_and_set() {
        let mut config = InvexConfig::default();

        config.set("batch.jobs", "3").unwrap();
        config.set("output.delimiter", ",").unwrap();
        config.set("fallback.enabled", "true").unwrap();

        assert_eq!(config.get("batch.jobs").as_deref(), Some("3"));
        assert_eq!(config.get("output.delimiter").as_deref(), Some(","));
        assert!(config.fallback.enabled);
        assert_eq!(config.get("batch.unknown"), None);
        assert!(CONFIG_KEYS.iter().all(|key| config.get(key).is_some()));
    }

    #[test]
    fn test_set_rejects_invalid_values_without_change() {
        let mut config = InvexConfig::default();

        assert!(config.set("batch.jobs", "many").is_err());
        assert!(config.set("batch.jobs", "0").is_err());
        assert!(config.set("output.delimiter", "§").is_err());
        assert!(config.set("output.delimiter", ";;").is_err());
        assert!(config.set("extraction.date_format", "%Q").is_err());
        assert!(config.set("fallback.min_confidence", "1.5").is_err());
        assert!(config.set("ocr.threshold", "1").is_err());

        assert_eq!(config, InvexConfig::default());
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = FallbackConfig {
            api_key_env: "INVEX_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..FallbackConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
