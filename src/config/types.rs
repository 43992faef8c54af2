use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use super::Policy;
use crate::scanner::{
    DEFAULT_PREFIX,
    DEFAULT_STOP_CONDITION,
    DelimiterRule,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "includePatterns[0]")
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

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON in '{}': {message}", path.display())]
    SyntaxError { path: PathBuf, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// One numbered line per error.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Token delimiter as written in the settings file.
///
/// At most one of `suffix` / `stop_condition` may be set. With neither, the
/// default stop condition applies.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DelimiterConfig {
    pub prefix: String,
    pub suffix: Option<String>,
    pub stop_condition: Option<String>,
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self { prefix: DEFAULT_PREFIX.to_string(), suffix: None, stop_condition: None }
    }
}

impl DelimiterConfig {
    /// Compiles the configured patterns into a [`DelimiterRule`].
    ///
    /// # Errors
    /// - Empty prefix
    /// - Both `suffix` and `stopCondition` set
    /// - Invalid regular expression
    pub fn to_rule(&self) -> Result<DelimiterRule, ValidationError> {
        if self.prefix.is_empty() {
            return Err(ValidationError::new(
                "delimiter.prefix",
                "The prefix cannot be empty. Example: \"R.\"",
            ));
        }

        match (&self.suffix, &self.stop_condition) {
            (Some(_), Some(_)) => Err(ValidationError::new(
                "delimiter",
                "Cannot specify both 'suffix' and 'stopCondition'. Please use only one",
            )),
            (Some(suffix), None) => {
                DelimiterRule::bounded(self.prefix.clone(), suffix).map_err(|e| {
                    ValidationError::new(
                        "delimiter.suffix",
                        format!("Invalid pattern '{suffix}': {e}"),
                    )
                })
            }
            (None, stop) => {
                let stop = stop.as_deref().unwrap_or(DEFAULT_STOP_CONDITION);
                DelimiterRule::unbounded(self.prefix.clone(), stop).map_err(|e| {
                    ValidationError::new(
                        "delimiter.stopCondition",
                        format!("Invalid pattern '{stop}': {e}"),
                    )
                })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslatorSettings {
    /// Directory holding one dictionary file per language.
    pub locales: PathBuf,
    pub delimiter: DelimiterConfig,
    /// Output path template (`${path}`, `${name}`, `${ext}`, `${lang}`).
    pub filename: String,

    pub whitelist: Policy,
    pub blacklist: Policy,

    /// Files for which missing keys are reported.
    pub warn: Policy,
    /// Reuse dictionaries already loaded for the same directory.
    pub cache: bool,
    pub ignore_errors: Policy,
    pub dry_run: Policy,
    pub include_original: Policy,
    /// Files copied to every language without scanning.
    pub ignore_tokens: Policy,
    pub encode_entities: Policy,
    pub verbose: bool,
    /// Language whose outputs drop the `${lang}` suffix.
    pub root_lang: Option<String>,

    /// Directory source files are read from.
    pub source_root: PathBuf,
    /// Directory outputs are written to.
    pub out_dir: PathBuf,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl TranslatorSettings {
    /// # Errors
    /// - Invalid delimiter
    /// - Empty filename template
    /// - Invalid glob pattern
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.delimiter.to_rule() {
            errors.push(e);
        }

        if self.filename.is_empty() {
            errors.push(ValidationError::new(
                "filename",
                "The template cannot be empty. Example: \"${path}/${name}-${lang}.${ext}\"",
            ));
        }

        if self.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "includePatterns",
                "At least one pattern is required. Example: [\"**/*.html\"]",
            ));
        }

        for (index, pattern) in self.include_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("includePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        for (index, pattern) in self.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if let Some(root_lang) = &self.root_lang
            && root_lang.is_empty()
        {
            errors.push(ValidationError::new(
                "rootLang",
                "The root language cannot be empty. Please specify a language (e.g., \"en\"), or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            locales: PathBuf::from("./locales"),
            delimiter: DelimiterConfig::default(),
            filename: "${path}/${name}-${lang}.${ext}".to_string(),
            whitelist: Policy::Always,
            blacklist: Policy::Never,
            warn: Policy::Always,
            cache: true,
            ignore_errors: Policy::Never,
            dry_run: Policy::Never,
            include_original: Policy::Never,
            ignore_tokens: Policy::Never,
            encode_entities: Policy::Never,
            verbose: false,
            root_lang: None,
            source_root: PathBuf::from("."),
            out_dir: PathBuf::from("dist"),
            include_patterns: vec!["**/*".to_string()],
            exclude_patterns: vec![
                "node_modules/**".to_string(),
                "locales/**".to_string(),
                "dist/**".to_string(),
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn validate_valid_settings() {
        let settings = TranslatorSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: TranslatorSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings.filename, eq("${path}/${name}-${lang}.${ext}"));
        assert_that!(settings.delimiter.prefix, eq("R."));
        assert_that!(settings.cache, eq(true));
        assert_that!(settings.include_patterns, elements_are![eq("**/*")]);
        assert_that!(settings.whitelist.matches("en"), eq(true));
        assert_that!(settings.blacklist.matches("en"), eq(false));
        assert_that!(settings.dry_run.matches("index.html"), eq(false));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{
            "locales": "i18n",
            "delimiter": { "prefix": "{{", "suffix": "\\}\\}" },
            "blacklist": ["de", { "pattern": "^x-" }],
            "encodeEntities": ".html",
            "rootLang": "en"
        }"#;

        let settings: TranslatorSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.locales, eq(&PathBuf::from("i18n")));
        assert_that!(settings.delimiter.suffix, some(eq("\\}\\}")));
        assert_that!(settings.blacklist.matches("x-pirate"), eq(true));
        assert_that!(settings.blacklist.matches("fr"), eq(false));
        assert_that!(settings.encode_entities.matches("page.html"), eq(true));
        assert_that!(settings.root_lang, some(eq("en")));
        assert!(matches!(settings.delimiter.to_rule(), Ok(DelimiterRule::Bounded { .. })));
    }

    #[rstest]
    fn deserialize_invalid_policy_pattern() {
        let result = serde_json::from_str::<TranslatorSettings>(r#"{"warn": {"pattern": "("}}"#);

        assert_that!(result.is_err(), eq(true));
    }

    #[rstest]
    fn delimiter_defaults_to_stop_condition() {
        let rule = DelimiterConfig::default().to_rule().unwrap();

        assert!(matches!(rule, DelimiterRule::Unbounded { .. }));
        assert_that!(rule.prefix(), eq("R."));
    }

    #[rstest]
    fn validate_delimiter_with_both_terminators() {
        let settings = TranslatorSettings {
            delimiter: DelimiterConfig {
                prefix: "R.".to_string(),
                suffix: Some(";".to_string()),
                stop_condition: Some(r"\s".to_string()),
            },
            ..TranslatorSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("delimiter")),
                field!(ValidationError.message, contains_substring("only one"))
            ]])
        );
    }

    #[rstest]
    fn validate_empty_prefix() {
        let settings = TranslatorSettings {
            delimiter: DelimiterConfig { prefix: String::new(), ..DelimiterConfig::default() },
            ..TranslatorSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("delimiter.prefix")),
                field!(ValidationError.message, contains_substring("cannot be empty"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_stop_condition() {
        let settings = TranslatorSettings {
            delimiter: DelimiterConfig {
                stop_condition: Some("[unclosed".to_string()),
                ..DelimiterConfig::default()
            },
            ..TranslatorSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("delimiter.stopCondition")),
                field!(ValidationError.message, contains_substring("[unclosed"))
            ]])
        );
    }

    #[rstest]
    fn validate_invalid_exclude_pattern_invalid_glob() {
        let settings = TranslatorSettings {
            exclude_patterns: vec!["dist/**".to_string(), "invalid[pattern".to_string()],
            ..TranslatorSettings::default()
        };

        assert_that!(
            settings.validate(),
            err(elements_are![all![
                field!(ValidationError.field_path, eq("excludePatterns[1]")),
                field!(ValidationError.message, contains_substring("Invalid glob pattern"))
            ]])
        );
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = TranslatorSettings {
            filename: String::new(),
            include_patterns: vec![],
            ..TranslatorSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let error_message = format!("{}", ConfigError::ValidationErrors(errors));

        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. filename"));
        assert_that!(error_message, contains_substring("2. includePatterns"));
    }
}
