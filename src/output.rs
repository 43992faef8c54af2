//! Output path derivation from a filename template.

use std::ffi::OsStr;
use std::path::{
    Component,
    Path,
    PathBuf,
};

/// Fields available to `${field}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Extension without the dot (e.g., "html")
    pub ext: String,
    /// File stem (e.g., "index")
    pub name: String,
    /// Parent directory relative to the source root, "." at the root
    pub path: String,
    /// Target language
    pub lang: String,
}

impl FileMetadata {
    /// Derives the metadata of `relative_path` (relative to the source root) for `lang`.
    #[must_use]
    pub fn from_relative(relative_path: &Path, lang: &str) -> Self {
        let lossy = |s: Option<&OsStr>| {
            s.map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
        };

        let segments: Vec<String> = relative_path
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        Self {
            ext: lossy(relative_path.extension()),
            name: lossy(relative_path.file_stem()),
            path: if segments.is_empty() { ".".to_string() } else { segments.join("/") },
            lang: lang.to_string(),
        }
    }

    /// Value of the placeholder `name`, `None` if unknown.
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "ext" => Some(&self.ext),
            "name" => Some(&self.name),
            "path" => Some(&self.path),
            "lang" => Some(&self.lang),
            _ => None,
        }
    }
}

/// Renders per-language output paths.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    /// Filename template with `${field}` placeholders
    template: String,
    /// Language whose value is left out of the rendered name
    root_lang: Option<String>,
    /// Directory every output is placed under
    base_dir: PathBuf,
}

impl OutputNamer {
    #[must_use]
    pub fn new(template: impl Into<String>, root_lang: Option<String>, base_dir: PathBuf) -> Self {
        Self { template: template.into(), root_lang, base_dir }
    }

    /// Expands the template and joins the result onto the base directory.
    ///
    /// A field whose value equals the root language expands to nothing; the
    /// literal text around it is kept as is.
    #[must_use]
    pub fn output_path(&self, metadata: &FileMetadata) -> PathBuf {
        let rendered = self.render(metadata);
        rendered
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .fold(self.base_dir.clone(), |path, segment| path.join(segment))
    }

    /// Substitutes every known `${field}`; unknown placeholders stay literal.
    fn render(&self, metadata: &FileMetadata) -> String {
        let mut rendered = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("${") {
            let (before, placeholder) = rest.split_at(start);
            rendered.push_str(before);

            let value = placeholder
                .find('}')
                .and_then(|end| Some((end, metadata.field(placeholder.get(2..end)?)?)));
            let Some((end, value)) = value else {
                rendered.push_str("${");
                rest = placeholder.get(2..).unwrap_or_default();
                continue;
            };

            if self.root_lang.as_deref() != Some(value) {
                rendered.push_str(value);
            }
            rest = placeholder.get(end + 1..).unwrap_or_default();
        }

        rendered.push_str(rest);
        rendered
    }
}
