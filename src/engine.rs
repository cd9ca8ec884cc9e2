//! The term search engine: a fixed vocabulary compiled once, searched per chunk.

use rayon::prelude::*;

use crate::compiler::{CompiledPattern, MatchBounds, PatternCompiler};
use crate::confusion::ConfusionTable;
use crate::error::{CompileError, Error};
use crate::matcher::normalize;
use crate::result::{MatchResult, label};
use crate::settings::Settings;

/// Anything that turns a text chunk into a labeled match record.
///
/// Backends are interchangeable as long as they report one word list per
/// term, in term order.
pub trait ChunkMatcher: Send + Sync {
    fn term_count(&self) -> usize;

    fn generate_response(&self, chunk: &str) -> MatchResult;
}

/// OCR-tolerant regex search over a fixed vocabulary.
///
/// Immutable after construction; share it freely across threads.
#[derive(Debug, Clone)]
pub struct TermSearchEngine {
    patterns: Vec<CompiledPattern>,
}

impl TermSearchEngine {
    /// Compile `terms` against the built-in confusion table with default bounds.
    pub fn new<I, S>(terms: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = ConfusionTable::builtin()?;
        Ok(Self::with_table(terms, table, MatchBounds::default())?)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, Error> {
        let table = ConfusionTable::builtin()?;
        Ok(Self::with_table(&settings.terms, table, settings.bounds)?)
    }

    /// Compile `terms` with an explicit table and bounds. Fails on the first
    /// term that does not compile; no partial engine is returned.
    pub fn with_table<I, S>(
        terms: I,
        table: &ConfusionTable,
        bounds: MatchBounds,
    ) -> Result<Self, CompileError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiler = PatternCompiler::new(table, bounds);
        let patterns = terms
            .into_iter()
            .enumerate()
            .map(|(i, term)| {
                compiler
                    .compile(term.as_ref())
                    .inspect(|pattern| {
                        tracing::debug!(
                            column = %label(i),
                            term = %pattern.term(),
                            expression_len = pattern.as_str().len(),
                            "compiled term"
                        );
                    })
                    .inspect_err(|err| {
                        tracing::warn!(column = %label(i), error = %err, "term failed to compile");
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(terms = patterns.len(), ?bounds, "search engine ready");
        Ok(Self { patterns })
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(CompiledPattern::term)
    }

    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    pub fn term_count(&self) -> usize {
        self.patterns.len()
    }

    /// Match every term against one chunk.
    pub fn search(&self, chunk: &str) -> MatchResult {
        let text = normalize(chunk);
        let words: Vec<Vec<String>> = self
            .patterns
            .iter()
            .map(|pattern| pattern.find_all_normalized(&text))
            .collect();
        let result = MatchResult::from_sorted(words);
        tracing::trace!(
            chunk_len = chunk.len(),
            success = result.success(),
            "searched chunk"
        );
        result
    }

    /// [`search`](Self::search) over many chunks in parallel; output keeps input order.
    pub fn search_batch<S>(&self, chunks: &[S]) -> Vec<MatchResult>
    where
        S: AsRef<str> + Sync,
    {
        chunks
            .par_iter()
            .map(|chunk| self.search(chunk.as_ref()))
            .collect()
    }
}

impl ChunkMatcher for TermSearchEngine {
    fn term_count(&self) -> usize {
        self.patterns.len()
    }

    fn generate_response(&self, chunk: &str) -> MatchResult {
        self.search(chunk)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    const TERMS: [&str; 6] = [
        "Anarchismus",
        "Terrorismus",
        "Revolution",
        "Imperialismus",
        "Sozialismus",
        "Kommunist",
    ];

    #[test]
    fn test_engine_keeps_term_order() {
        let engine = TermSearchEngine::new(TERMS).unwrap();
        assert_eq!(engine.terms().collect::<Vec<_>>(), TERMS);
        assert_eq!(engine.term_count(), 6);
    }

    #[test]
    fn test_empty_term_aborts_construction() {
        let err = TermSearchEngine::new(["Revolution", "", "Kommunist"]).unwrap_err();
        assert!(matches!(err, Error::Compile(CompileError::EmptyTerm)));
    }

    #[test]
    fn test_every_term_has_a_column() {
        let engine = TermSearchEngine::new(TERMS).unwrap();
        let result = engine.search("Die Kommuniſten tagten in Berlin.");
        assert_eq!(result.term_count(), TERMS.len());
        assert!(result.success());
        assert_eq!(result.get("word6").unwrap(), &["Kommuniſten"]);
        for i in 0..5 {
            assert!(result.words(i).unwrap().is_empty(), "word{}", i + 1);
        }
    }

    #[test]
    fn test_empty_vocabulary_never_succeeds() {
        let engine = TermSearchEngine::new(Vec::<String>::new()).unwrap();
        let result = engine.search("Revolution");
        assert_eq!(result.term_count(), 0);
        assert!(!result.success());
    }

    #[test]
    fn test_batch_matches_sequential() {
        let engine = TermSearchEngine::new(TERMS).unwrap();
        let chunks = vec![
            "Der Imperialiſmus der Großmächte",
            "Heute regnet es in Berlin.",
            "REVOLUTION in Rußland",
        ];
        let batch = engine.search_batch(&chunks);
        let sequential: Vec<MatchResult> = chunks.iter().map(|c| engine.search(c)).collect();
        assert_eq!(batch, sequential);
        assert!(batch[0].success());
        assert!(!batch[1].success());
        assert_eq!(batch[2].get("word3").unwrap(), &["REVOLUTION"]);
    }

    #[test]
    fn test_from_settings_uses_bounds() {
        let settings = Settings {
            terms: vec!["Revolution".into()],
            bounds: MatchBounds {
                noise: 0,
                affix: 0,
                wrapper: 0,
            },
            ..Settings::default()
        };
        let engine = TermSearchEngine::from_settings(&settings).unwrap();
        let result = engine.search("Gegenrevolution! Revolution!");
        assert_eq!(result.get("word1").unwrap(), &["Revolution", "revolution"]);
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_compiled_terms_logged_with_column() {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            TermSearchEngine::new(["Revolution", "Kommunist"]).unwrap();
        });

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("column=word1 term=Revolution"), "{logs}");
        assert!(logs.contains("column=word2 term=Kommunist"), "{logs}");
        assert!(logs.contains("search engine ready"), "{logs}");
    }

    #[test]
    fn test_engine_behind_trait_object() {
        let engine = TermSearchEngine::new(["Terrorismus"]).unwrap();
        let backend: &dyn ChunkMatcher = &engine;
        assert_eq!(backend.term_count(), 1);
        assert!(backend.generate_response("Terroriſmus").success());
    }
}
