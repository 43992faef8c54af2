//! Drives translation over a tree of source files.
/// Output destinations
pub mod sink;

use std::fs;
use std::io;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use ignore::WalkBuilder;
use thiserror::Error;

pub use self::sink::{
    FsSink,
    MemorySink,
    OutputDescriptor,
    OutputSink,
};
use crate::config::{
    FileMatcher,
    MatcherError,
    Policy,
    TranslatorSettings,
    ValidationError,
};
use crate::dictionary::DictionarySet;
use crate::engine::{
    MissingKey,
    TranslateError,
    TranslationPolicies,
    Translator,
};
use crate::output::{
    FileMetadata,
    OutputNamer,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Translate(#[from] TranslateError),
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one source file.
#[derive(Debug)]
pub enum FileEvent {
    Translated {
        source: PathBuf,
        /// Paths handed to the sink, in emission order
        outputs: Vec<PathBuf>,
        missing: Vec<MissingKey>,
    },
    /// Failed, but `ignoreErrors` matched the file
    Ignored { source: PathBuf },
    Failed { source: PathBuf, error: PipelineError },
}

impl FileEvent {
    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Translated { source, .. }
            | Self::Ignored { source }
            | Self::Failed { source, .. } => source,
        }
    }
}

/// Every file event of one run, in processing order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub events: Vec<FileEvent>,
}

impl RunReport {
    /// All paths handed to the sink.
    pub fn emitted(&self) -> impl Iterator<Item = &Path> {
        self.events
            .iter()
            .flat_map(|event| match event {
                FileEvent::Translated { outputs, .. } => outputs.as_slice(),
                _ => &[][..],
            })
            .map(PathBuf::as_path)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &PipelineError)> {
        self.events.iter().filter_map(|event| match event {
            FileEvent::Failed { source, error } => Some((source.as_path(), error)),
            _ => None,
        })
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Lists source files under `source_root` matching the include / exclude globs.
///
/// Paths are relative to `source_root` and sorted. Hidden files and anything
/// ignored by `.gitignore` are skipped.
///
/// # Errors
/// An include or exclude pattern does not compile.
pub fn discover_sources(
    settings: &TranslatorSettings,
    source_root: &Path,
) -> Result<Vec<PathBuf>, MatcherError> {
    let matcher = FileMatcher::new(source_root.to_path_buf(), settings)?;
    let mut sources = Vec::new();

    for result in WalkBuilder::new(source_root)
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let Ok(relative_path) = entry.path().strip_prefix(matcher.source_root()) else {
            continue;
        };

        if matcher.is_source_file_relative(relative_path) {
            sources.push(relative_path.to_path_buf());
        }
    }

    sources.sort();
    tracing::debug!(count = sources.len(), "Discovered source files in {}", source_root.display());
    Ok(sources)
}

/// Translates files one at a time and hands the outputs to a sink.
#[derive(Debug)]
pub struct Pipeline<S> {
    /// Per-file translation
    translator: Translator,
    /// Output path derivation
    namer: OutputNamer,
    /// Directory the relative source paths are read from
    source_root: PathBuf,
    /// Destination of untranslated copies
    out_dir: PathBuf,
    /// Files translated without emitting outputs
    dry_run: Policy,
    /// Files also copied unchanged to the output directory
    include_original: Policy,
    /// Files whose failures are dropped
    ignore_errors: Policy,
    /// Output destination
    sink: S,
}

impl<S: OutputSink> Pipeline<S> {
    /// Builds a pipeline reading from `settings.source_root` and writing under
    /// `settings.out_dir`; both are used as given.
    ///
    /// # Errors
    /// The delimiter settings do not form a valid rule.
    pub fn new(
        settings: &TranslatorSettings,
        dictionaries: Arc<DictionarySet>,
        sink: S,
    ) -> Result<Self, ValidationError> {
        let rule = settings.delimiter.to_rule()?;
        let translator = Translator::new(dictionaries, rule, TranslationPolicies::from(settings));
        let namer = OutputNamer::new(
            settings.filename.clone(),
            settings.root_lang.clone(),
            settings.out_dir.clone(),
        );

        Ok(Self {
            translator,
            namer,
            source_root: settings.source_root.clone(),
            out_dir: settings.out_dir.clone(),
            dry_run: settings.dry_run.clone(),
            include_original: settings.include_original.clone(),
            ignore_errors: settings.ignore_errors.clone(),
            sink,
        })
    }

    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = translator;
        self
    }

    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Processes `files` (relative to the source root) in order.
    ///
    /// A failing file becomes an event; later files are still processed.
    pub fn run<P: AsRef<Path>>(&mut self, files: &[P]) -> RunReport {
        let mut report = RunReport::default();

        for file in files {
            let source = file.as_ref();
            let event = match self.process(source) {
                Ok((outputs, missing)) => {
                    FileEvent::Translated { source: source.to_path_buf(), outputs, missing }
                }
                Err(error) if self.ignore_errors.matches_path(source) => {
                    tracing::debug!(%error, "Ignoring failure in {}", source.display());
                    FileEvent::Ignored { source: source.to_path_buf() }
                }
                Err(error) => {
                    tracing::error!(%error, "Failed to process {}", source.display());
                    FileEvent::Failed { source: source.to_path_buf(), error }
                }
            };
            report.events.push(event);
        }

        report
    }

    /// Reads, translates and emits one file; returns the emitted paths.
    fn process(&mut self, source: &Path) -> Result<(Vec<PathBuf>, Vec<MissingKey>), PipelineError> {
        let absolute = self.source_root.join(source);
        let input = fs::read(&absolute)
            .map_err(|error| PipelineError::Read { path: absolute.clone(), source: error })?;
        let translation = self.translator.translate(source, &input)?;
        let mut emitted = Vec::new();

        if self.include_original.matches_path(source) {
            let path = self.out_dir.join(source);
            self.emit(OutputDescriptor { path: path.clone(), contents: input, language: None })?;
            emitted.push(path);
        }

        if self.dry_run.matches_path(source) {
            tracing::debug!("Dry run, nothing written for {}", source.display());
            return Ok((emitted, translation.missing));
        }

        for (language, contents) in translation.outputs {
            let path = self.namer.output_path(&FileMetadata::from_relative(source, &language));
            self.emit(OutputDescriptor { path: path.clone(), contents, language: Some(language) })?;
            emitted.push(path);
        }

        Ok((emitted, translation.missing))
    }

    /// Hands `output` to the sink.
    fn emit(&mut self, output: OutputDescriptor) -> Result<(), PipelineError> {
        let path = output.path.clone();
        self.sink.emit(output).map_err(|source| PipelineError::Write { path, source })
    }
}
