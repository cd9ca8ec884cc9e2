//! Error types for table validation, term compilation and settings loading.
//!
//! Matching itself has no error type: every text chunk is searchable.

use std::path::PathBuf;

/// A malformed confusion table. Fatal: the table is compiled into the crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("confusion class key {key:?} is not a lowercase letter")]
    InvalidClassKey { key: char },
    #[error("confusion class for {key:?} is empty")]
    EmptyClass { key: char },
    #[error("confusion class for {key:?} does not contain its own key")]
    ClassMissingKey { key: char },
    #[error("confusion class for {key:?} is defined twice")]
    DuplicateClass { key: char },
    #[error("multi-character rule has an empty sequence")]
    EmptyRuleSequence,
    #[error("multi-character rule {sequence:?} is shorter than two characters")]
    RuleTooShort { sequence: String },
    #[error("multi-character rule {sequence:?} is not lowercase")]
    RuleNotLowercase { sequence: String },
    #[error("multi-character rule {sequence:?} is defined twice")]
    DuplicateRule { sequence: String },
    #[error("multi-character rule {sequence:?} has no usable alternatives")]
    EmptyAlternation { sequence: String },
}

/// A vocabulary term that cannot be turned into a matcher.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompileError {
    #[error("term is empty")]
    EmptyTerm,
    #[error("term {term:?} produced an expression the regex engine rejected: {source}")]
    Regex {
        term: String,
        #[source]
        source: regex::Error,
    },
}

/// Problems reading or validating a TOML settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Crate-level error for the convenience constructors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
