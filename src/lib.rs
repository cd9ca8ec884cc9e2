//! OCR-tolerant term search for digitized historical newspapers.
//!
//! Each vocabulary term is compiled once into a regular expression that
//! tolerates the usual Fraktur OCR misreadings (`h`/`n`, `ſ`/`s`/`f`,
//! `rn`/`m`, ...), stray characters, compounds and wrapping punctuation.
//! Searching a chunk reports, per term, the distinct spellings found.
//!
//! ```
//! use rust_ocr_terms::TermSearchEngine;
//!
//! let engine = TermSearchEngine::new(["Terrorismus"]).unwrap();
//! let result = engine.search("Die Terronsmus-Gefahr wächst.");
//! assert!(result.success());
//! assert_eq!(result.get("word1").unwrap(), &["Terronsmus-"]);
//! ```

pub mod chunk;
pub mod compiler;
pub mod confusion;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod result;
pub mod row;
pub mod settings;

#[cfg(feature = "python")]
mod python;

pub use chunk::chunk_by_words;
pub use compiler::{CompiledPattern, MatchBounds, PatternCompiler};
pub use confusion::{ConfusionClass, ConfusionTable, MultiCharRule};
pub use engine::{ChunkMatcher, TermSearchEngine};
pub use error::{CompileError, ConfigError, Error, SettingsError};
pub use result::{MatchResult, label};
pub use row::{ChunkRow, PageMeta};
pub use settings::Settings;
