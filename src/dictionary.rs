//! Per-language dictionaries.
/// Format readers (JSON, INI, CSV)
pub mod parser;
/// Directory loading and caching
pub mod store;

use std::collections::{
    BTreeMap,
    HashMap,
};

pub use parser::{
    DictionaryFormat,
    ParseError,
    flatten_json,
};
pub use store::{
    DictionaryStore,
    LoadError,
};

/// Flat translation table for one language (e.g., "menu.open" -> "Open").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary(HashMap<String, String>);

impl Dictionary {
    #[must_use]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts an entry, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl From<HashMap<String, String>> for Dictionary {
    fn from(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
    }
}

/// All dictionaries of one locales directory, keyed by language identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionarySet(BTreeMap<String, Dictionary>);

impl DictionarySet {
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, language: impl Into<String>, dictionary: Dictionary) {
        self.0.insert(language.into(), dictionary);
    }

    #[must_use]
    pub fn get(&self, language: &str) -> Option<&Dictionary> {
        self.0.get(language)
    }

    /// Language identifiers in sorted order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dictionary)> {
        self.0.iter().map(|(language, dictionary)| (language.as_str(), dictionary))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, Dictionary)> for DictionarySet {
    fn from_iter<I: IntoIterator<Item = (L, Dictionary)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(language, dictionary)| (language.into(), dictionary)).collect())
    }
}
