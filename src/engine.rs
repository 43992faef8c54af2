//! Per-language token substitution.
/// Entity encoders for substituted values
pub mod entities;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use thiserror::Error;

pub use self::entities::{
    EntityEncoder,
    HtmlEntityEncoder,
    NoopEncoder,
};
use crate::config::{
    Policy,
    TranslatorSettings,
};
use crate::dictionary::{
    Dictionary,
    DictionarySet,
};
use crate::scanner::{
    DelimiterRule,
    Scanner,
};

/// Number of leading characters inspected by [`is_binary`].
const BINARY_SNIFF_CHARS: usize = 24;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Whitelist / blacklist leave no language to translate into
    #[error("No active languages for '{}'", path.display())]
    NoActiveLanguages { path: PathBuf },
}

/// Policies deciding which languages are produced and how each file is treated.
#[derive(Debug, Clone)]
pub struct TranslationPolicies {
    pub whitelist: Policy,
    pub blacklist: Policy,
    /// Files whose missing keys are logged.
    pub warn: Policy,
    /// Log missing keys for every file.
    pub verbose: bool,
    /// Files copied verbatim without scanning.
    pub ignore_tokens: Policy,
    /// Files whose substituted values are entity-encoded.
    pub encode_entities: Policy,
}

impl Default for TranslationPolicies {
    fn default() -> Self {
        Self {
            whitelist: Policy::Always,
            blacklist: Policy::Never,
            warn: Policy::Always,
            verbose: false,
            ignore_tokens: Policy::Never,
            encode_entities: Policy::Never,
        }
    }
}

impl TranslationPolicies {
    /// Whether missing keys in `path` are logged. They are recorded either way.
    #[must_use]
    pub fn reports_missing(&self, path: &Path) -> bool {
        self.verbose || self.warn.matches_path(path)
    }
}

impl From<&TranslatorSettings> for TranslationPolicies {
    fn from(settings: &TranslatorSettings) -> Self {
        Self {
            whitelist: settings.whitelist.clone(),
            blacklist: settings.blacklist.clone(),
            warn: settings.warn.clone(),
            verbose: settings.verbose,
            ignore_tokens: settings.ignore_tokens.clone(),
            encode_entities: settings.encode_entities.clone(),
        }
    }
}

/// A token whose key is absent from one language's dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub language: String,
    pub key: String,
}

/// Result of translating one buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    /// Language → fully substituted buffer.
    pub outputs: BTreeMap<String, Vec<u8>>,
    /// Keys that were dropped, in scan order.
    pub missing: Vec<MissingKey>,
}

/// Substitutes tokens with dictionary values, one output per active language.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Shared, read-only for the whole run
    dictionaries: Arc<DictionarySet>,
    /// Token delimiters
    rule: DelimiterRule,
    /// Language and per-file policies
    policies: TranslationPolicies,
    /// Applied to values when `encode_entities` matches
    encoder: Arc<dyn EntityEncoder + Send + Sync>,
}

impl Translator {
    /// Creates a translator using [`HtmlEntityEncoder`] for entity encoding.
    #[must_use]
    pub fn new(
        dictionaries: Arc<DictionarySet>,
        rule: DelimiterRule,
        policies: TranslationPolicies,
    ) -> Self {
        Self { dictionaries, rule, policies, encoder: Arc::new(HtmlEntityEncoder) }
    }

    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn EntityEncoder + Send + Sync>) -> Self {
        self.encoder = encoder;
        self
    }

    #[must_use]
    pub fn dictionaries(&self) -> &DictionarySet {
        &self.dictionaries
    }

    /// Languages passing the whitelist and not the blacklist, in sorted order.
    pub fn active_languages(&self) -> impl Iterator<Item = (&str, &Dictionary)> {
        self.dictionaries.iter().filter(|(language, _)| {
            self.policies.whitelist.matches(language) && !self.policies.blacklist.matches(language)
        })
    }

    /// Translates `input`, read from `path`, into every active language.
    ///
    /// Binary input and files matched by `ignore_tokens` are copied unchanged.
    /// A language that ends up with an empty buffer receives the original input.
    ///
    /// # Errors
    /// [`TranslateError::NoActiveLanguages`] if no language is active.
    pub fn translate(&self, path: &Path, input: &[u8]) -> Result<Translation, TranslateError> {
        let active: Vec<(&str, &Dictionary)> = self.active_languages().collect();
        if active.is_empty() {
            return Err(TranslateError::NoActiveLanguages { path: path.to_path_buf() });
        }

        if is_binary(input) || self.policies.ignore_tokens.matches_path(path) {
            tracing::debug!(path = %path.display(), "Copying without scanning");
            let outputs = active
                .iter()
                .map(|(language, _)| ((*language).to_string(), input.to_vec()))
                .collect();
            return Ok(Translation { outputs, missing: Vec::new() });
        }

        let (buffers, missing) = self.substitute(path, input, &active);

        let outputs = buffers
            .into_iter()
            .map(|(language, buffer)| {
                let bytes = if buffer.is_empty() { input.to_vec() } else { buffer };
                (language.to_string(), bytes)
            })
            .collect();

        Ok(Translation { outputs, missing })
    }

    /// Scans `text` once and fans every segment out to all `active` languages.
    ///
    /// Literal segments are copied from `text` unchanged.
    fn substitute<'l>(
        &self,
        path: &Path,
        text: &[u8],
        active: &[(&'l str, &Dictionary)],
    ) -> (Vec<(&'l str, Vec<u8>)>, Vec<MissingKey>) {
        let encode = self.policies.encode_entities.matches_path(path);
        let report = self.policies.reports_missing(path);

        let mut buffers: Vec<(&str, Vec<u8>)> = active
            .iter()
            .map(|(language, _)| (*language, Vec::with_capacity(text.len())))
            .collect();
        let mut missing = Vec::new();
        let mut copied_to = 0;

        for token in Scanner::new(text, &self.rule) {
            let literal = text.get(copied_to..token.span.start).unwrap_or_default();
            let key = token.key_str();

            for ((language, dictionary), (_, buffer)) in active.iter().zip(buffers.iter_mut()) {
                buffer.extend_from_slice(literal);
                if let Some(value) = dictionary.get(&key) {
                    let value: Cow<'_, str> =
                        if encode { Cow::Owned(self.encoder.encode(value)) } else { Cow::Borrowed(value) };
                    buffer.extend_from_slice(value.as_bytes());
                    continue;
                }

                if report {
                    tracing::warn!(
                        language = %language,
                        key = %key,
                        "Missing translation in {}",
                        path.display()
                    );
                }
                missing.push(MissingKey { language: (*language).to_string(), key: key.to_string() });
            }

            copied_to = token.span.end;
        }

        let tail = text.get(copied_to..).unwrap_or_default();
        for (_, buffer) in &mut buffers {
            buffer.extend_from_slice(tail);
        }

        (buffers, missing)
    }
}

/// Heuristic binary check on the first characters of the lossily decoded buffer.
///
/// A replacement character or a control character with code ≤ 8 marks the
/// buffer as binary.
#[must_use]
pub fn is_binary(input: &[u8]) -> bool {
    // 24 chars never span more than 96 bytes of UTF-8
    let head = input.get(..input.len().min(BINARY_SNIFF_CHARS * 4)).unwrap_or(input);
    String::from_utf8_lossy(head)
        .chars()
        .take(BINARY_SNIFF_CHARS)
        .any(|ch| ch == char::REPLACEMENT_CHARACTER || u32::from(ch) <= 8)
}
