//! Settings file discovery and parsing.

use std::fs;
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use jsonc_parser::ParseOptions;

use super::{
    ConfigError,
    TranslatorSettings,
};

/// Settings file looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = ".token-i18n.json";

/// Returns the nearest directory, `start` included, that holds [`CONFIG_FILE_NAME`].
#[must_use]
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Reads `<workspace_root>/.token-i18n.json`.
///
/// Comments and trailing commas are accepted. An empty file yields the
/// defaults.
///
/// # Returns
/// - `Ok(None)`: no settings file in the workspace root
/// - `Err(ConfigError)`: the file is unreadable, not JSON, or has unknown value shapes
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<TranslatorSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            tracing::debug!("Configuration file not found: {}", config_path.display());
            return Ok(None);
        }
        Err(error) => return Err(error.into()),
    };

    tracing::debug!("Loading configuration from {}", config_path.display());

    let value = jsonc_parser::parse_to_serde_value(&content, &ParseOptions::default())
        .map_err(|error| ConfigError::SyntaxError { path: config_path, message: error.to_string() })?;

    let Some(value) = value else {
        return Ok(Some(TranslatorSettings::default()));
    };

    Ok(Some(serde_json::from_value(value)?))
}
