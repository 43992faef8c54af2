//! Settings file, validation and match policies.
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Source file pattern matcher
mod matcher;
/// Per-language and per-file match rules
mod policy;
/// Configuration types and settings
mod types;

pub use loader::{
    CONFIG_FILE_NAME,
    find_workspace_root,
};
pub use manager::ConfigManager;
pub use matcher::{
    FileMatcher,
    MatcherError,
};
pub use policy::{
    InvalidPolicy,
    Policy,
};
pub use types::{
    ConfigError,
    DelimiterConfig,
    TranslatorSettings,
    ValidationError,
};
