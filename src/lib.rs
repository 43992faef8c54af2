//! token-i18n
//!
//! Placeholder token substitution producing one translated copy of every
//! source file per dictionary language.

pub mod config;
pub mod dictionary;
pub mod engine;
pub mod output;
pub mod pipeline;
pub mod scanner;

pub use engine::{
    Translation,
    Translator,
};
