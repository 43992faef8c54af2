//! Loading dictionary directories.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use thiserror::Error;

use super::{
    Dictionary,
    DictionaryFormat,
    DictionarySet,
    ParseError,
};

#[derive(Error, Debug)]
pub enum LoadError {
    /// The directory is missing or cannot be listed
    #[error("No dictionaries found in '{}': {source}", directory.display())]
    NoDictionaries {
        directory: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A dictionary file could not be read
    #[error("Failed to read dictionary '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A dictionary file of a known format is malformed
    #[error("Failed to parse dictionary '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Loads dictionary directories and caches them by absolute path.
///
/// The store is owned by the caller; nothing is shared between stores.
#[derive(Debug, Default)]
pub struct DictionaryStore {
    /// Canonical directory path → last loaded snapshot
    cache: HashMap<PathBuf, Arc<DictionarySet>>,
}

impl DictionaryStore {
    #[must_use]
    pub fn new() -> Self {
        Self { cache: HashMap::new() }
    }

    /// Loads every dictionary directly inside `directory`.
    ///
    /// With `use_cache`, a directory loaded before is returned without touching
    /// the file system. Otherwise every file is read again and the cached
    /// snapshot is replaced.
    ///
    /// # Errors
    /// - [`LoadError::NoDictionaries`] when the directory cannot be resolved or listed
    /// - [`LoadError::Read`] / [`LoadError::Parse`] for the first bad dictionary file
    pub fn load(
        &mut self,
        directory: &Path,
        use_cache: bool,
    ) -> Result<Arc<DictionarySet>, LoadError> {
        let no_dictionaries =
            |source: io::Error| LoadError::NoDictionaries { directory: directory.to_path_buf(), source };

        let canonical = fs::canonicalize(directory).map_err(no_dictionaries)?;

        if use_cache && let Some(cached) = self.cache.get(&canonical) {
            tracing::debug!(directory = %canonical.display(), "Using cached dictionaries");
            return Ok(Arc::clone(cached));
        }

        let mut paths = fs::read_dir(&canonical)
            .and_then(|entries| {
                entries.map(|entry| entry.map(|e| e.path())).collect::<io::Result<Vec<_>>>()
            })
            .map_err(no_dictionaries)?;
        paths.sort();

        let mut set = DictionarySet::new();
        for path in paths {
            let Some((language, dictionary)) = load_file(&path)? else {
                continue;
            };
            tracing::debug!(
                language = %language,
                entries = dictionary.len(),
                "Loaded dictionary from {}",
                path.display()
            );
            set.insert(language, dictionary);
        }

        tracing::debug!(
            directory = %canonical.display(),
            languages = set.len(),
            "Loaded dictionary directory"
        );

        let set = Arc::new(set);
        self.cache.insert(canonical, Arc::clone(&set));
        Ok(set)
    }

    /// Drops every cached directory.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Returns true if `directory` has a cached snapshot.
    #[must_use]
    pub fn is_cached(&self, directory: &Path) -> bool {
        fs::canonicalize(directory).is_ok_and(|canonical| self.cache.contains_key(&canonical))
    }
}

/// Reads one directory entry.
///
/// Returns `None` for sub-directories and files of unknown format.
fn load_file(path: &Path) -> Result<Option<(String, Dictionary)>, LoadError> {
    if !path.is_file() {
        return Ok(None);
    }

    let Some(format) = DictionaryFormat::from_path(path) else {
        tracing::debug!("Skipping non-dictionary file {}", path.display());
        return Ok(None);
    };

    let Some(language) = path.file_stem().and_then(|stem| stem.to_str()) else {
        tracing::warn!("Skipping dictionary with non UTF-8 name {}", path.display());
        return Ok(None);
    };

    let content = fs::read_to_string(path)
        .map_err(|source| LoadError::Read { path: path.to_path_buf(), source })?;
    let dictionary = format
        .parse(&content)
        .map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })?;

    Ok(Some((language.to_string(), dictionary)))
}
