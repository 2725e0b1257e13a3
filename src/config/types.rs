use std::collections::HashSet;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::LanguageCatalog;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "targetLanguages[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file {path}: {source}")]
    IoError { path: String, source: std::io::Error },

    #[error("Failed to parse configuration file {path}: {source}")]
    ParseError { path: String, source: serde_json::Error },
}

/// バリデーションエラーを 1 行ずつ並べる
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Target languages used when `targetLanguages` is not configured.
const DEFAULT_TARGET_LANGUAGES: &[&str] = &[
    "it", "fr", "de", "nl", "es", "pt", "pl", "bg", "cs", "da", "et", "el", "ga", "hr", "lv", "lt",
    "hu", "mt", "sk", "sl", "fi", "sv", "ro", "en",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Language of the source-of-truth file.
    pub source_language: String,
    /// Languages to keep in sync, processed in this order.
    pub target_languages: Vec<String>,

    /// Directory holding `<sourceLanguage>.json`, relative to the working directory.
    pub source_dir: String,
    /// Directory receiving one `<language>.json` per target language.
    pub output_dir: String,

    /// Regular expression matching interpolation tokens that must not be translated.
    pub placeholder_pattern: String,

    pub translator: TranslatorConfig,
    pub concurrency: ConcurrencyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorConfig {
    pub endpoint: String,
    /// Upper bound for a single translation request.
    pub timeout_ms: u64,
    /// Translation requests in flight at once, across all languages.
    pub max_concurrent_requests: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_ms: 10_000,
            max_concurrent_requests: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ConcurrencyConfig {
    /// Languages synchronized at once.
    /// Default: number of CPU cores.
    pub max_concurrent_languages: Option<usize>,
}

impl ConcurrencyConfig {
    #[must_use]
    pub fn effective_max_languages(&self) -> usize {
        self.max_concurrent_languages.unwrap_or_else(num_cpus::get).max(1)
    }
}

impl SyncSettings {
    /// # Errors
    /// - Required field is empty
    /// - Duplicate target language
    /// - Invalid placeholder pattern
    /// - Zero timeout or concurrency limit
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.source_language.trim().is_empty() {
            errors.push(ValidationError::new(
                "sourceLanguage",
                "The source language cannot be empty. Example: \"en\"",
            ));
        }

        if self.target_languages.is_empty() {
            errors.push(ValidationError::new(
                "targetLanguages",
                "At least one target language is required. Example: [\"fr\", \"de\"]",
            ));
        }

        let mut seen = HashSet::new();
        for (index, lang) in self.target_languages.iter().enumerate() {
            if lang.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("targetLanguages[{index}]"),
                    "The language code cannot be empty",
                ));
            } else if !seen.insert(lang.as_str()) {
                errors.push(ValidationError::new(
                    format!("targetLanguages[{index}]"),
                    format!("Duplicate target language '{lang}'"),
                ));
            }
        }

        if self.source_dir.is_empty() {
            errors.push(ValidationError::new(
                "sourceDir",
                "The directory cannot be empty. Example: \"sourceLanguage\"",
            ));
        }

        if self.output_dir.is_empty() {
            errors.push(ValidationError::new(
                "outputDir",
                "The directory cannot be empty. Example: \"i18n\"",
            ));
        }

        if self.placeholder_pattern.is_empty() {
            errors.push(ValidationError::new(
                "placeholderPattern",
                "The pattern cannot be empty. Example: \"\\\\{\\\\{.*?\\\\}\\\\}\"",
            ));
        } else if let Err(e) = regex::Regex::new(&self.placeholder_pattern) {
            errors.push(ValidationError::new(
                "placeholderPattern",
                format!("Invalid regular expression '{}': {e}", self.placeholder_pattern),
            ));
        }

        if self.translator.endpoint.is_empty() {
            errors.push(ValidationError::new(
                "translator.endpoint",
                "The endpoint cannot be empty. Please specify a translation service URL",
            ));
        }

        if self.translator.timeout_ms == 0 {
            errors.push(ValidationError::new(
                "translator.timeoutMs",
                "The timeout must be greater than 0",
            ));
        }

        if self.translator.max_concurrent_requests == 0 {
            errors.push(ValidationError::new(
                "translator.maxConcurrentRequests",
                "The limit must be greater than 0",
            ));
        }

        if self.concurrency.max_concurrent_languages == Some(0) {
            errors.push(ValidationError::new(
                "concurrency.maxConcurrentLanguages",
                "The limit must be greater than 0, or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    #[must_use]
    pub fn catalog(&self) -> LanguageCatalog {
        LanguageCatalog::new(self.source_language.clone(), self.target_languages.clone())
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_languages: DEFAULT_TARGET_LANGUAGES.iter().map(ToString::to_string).collect(),
            source_dir: "sourceLanguage".to_string(),
            output_dir: "i18n".to_string(),
            placeholder_pattern: r"\{\{.*?\}\}".to_string(),
            translator: TranslatorConfig::default(),
            concurrency: ConcurrencyConfig::default(),
        }
    }
}
