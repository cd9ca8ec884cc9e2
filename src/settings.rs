//! TOML settings for a search run.
//!
//! ```toml
//! terms = ["Anarchismus", "Terrorismus", "Revolution"]
//! chunk_words = 100
//!
//! [bounds]
//! noise = 1
//! affix = 15
//! wrapper = 3
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::compiler::MatchBounds;
use crate::error::SettingsError;

const MAX_NOISE: usize = 8;
const MAX_AFFIX: usize = 64;
const MAX_WRAPPER: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Vocabulary, in output column order.
    pub terms: Vec<String>,
    /// Words per chunk when splitting page text.
    pub chunk_words: usize,
    pub bounds: MatchBounds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            chunk_words: 100,
            bounds: MatchBounds::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let source = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), terms = settings.terms.len(), "loaded settings");
        Ok(settings)
    }

    /// Reject values that would make chunking degenerate or the compiled
    /// expressions needlessly large.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.chunk_words == 0 {
            return Err(SettingsError::Invalid("chunk_words must be at least 1".into()));
        }
        let checks = [
            ("noise", self.bounds.noise, MAX_NOISE),
            ("affix", self.bounds.affix, MAX_AFFIX),
            ("wrapper", self.bounds.wrapper, MAX_WRAPPER),
        ];
        for (name, value, max) in checks {
            if value > max {
                return Err(SettingsError::Invalid(format!(
                    "bounds.{name} = {value} exceeds the maximum of {max}"
                )));
            }
        }
        Ok(())
    }
}
