//! File pattern matcher for source files.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::TranslatorSettings;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid include pattern '{pattern}': {source}")]
    InvalidIncludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Decides which files under the source root get translated.
///
/// Besides the include / exclude globs, everything inside the output or the
/// locales directory is rejected, so a run never picks up its own results or
/// its dictionaries.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    /// Directory every matched path is relative to
    source_root: PathBuf,
    /// `outDir` and `locales` relative to the source root, when inside it
    reserved_dirs: Vec<PathBuf>,
    /// Compiled `includePatterns`
    include_set: GlobSet,
    /// Compiled `excludePatterns`
    exclude_set: GlobSet,
}

impl FileMatcher {
    /// Relative `settings.out_dir` and `settings.locales` are taken relative to
    /// `source_root`.
    ///
    /// # Errors
    /// An include or exclude pattern does not compile.
    pub fn new(source_root: PathBuf, settings: &TranslatorSettings) -> Result<Self, MatcherError> {
        let include_set = glob_set(&settings.include_patterns, |pattern, source| {
            MatcherError::InvalidIncludePattern { pattern, source }
        })?;
        let exclude_set = glob_set(&settings.exclude_patterns, |pattern, source| {
            MatcherError::InvalidExcludePattern { pattern, source }
        })?;

        let reserved_dirs = [&settings.out_dir, &settings.locales]
            .into_iter()
            .filter_map(|dir| relative_dir(&source_root, dir))
            .collect();

        Ok(Self { source_root, reserved_dirs, include_set, exclude_set })
    }

    #[must_use]
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Returns true if `relative_path` matches `includePatterns`, no
    /// `excludePatterns`, and is not inside the output or locales directory.
    #[must_use]
    pub fn is_source_file_relative(&self, relative_path: &Path) -> bool {
        if self.reserved_dirs.iter().any(|dir| relative_path.starts_with(dir)) {
            return false;
        }
        self.include_set.is_match(relative_path) && !self.exclude_set.is_match(relative_path)
    }
}

/// `dir` relative to `source_root`; `None` when it lies outside or is the root itself.
fn relative_dir(source_root: &Path, dir: &Path) -> Option<PathBuf> {
    source_root
        .join(dir)
        .strip_prefix(source_root)
        .ok()
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Compiles `patterns`, reporting the first invalid one through `invalid`.
fn glob_set(
    patterns: &[String],
    invalid: impl Fn(String, globset::Error) -> MatcherError,
) -> Result<GlobSet, MatcherError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(|e| invalid(pattern.clone(), e))?);
    }
    Ok(builder.build()?)
}
