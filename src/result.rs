//! Per-chunk match records in the `success` / `word{k}` shape.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Column label for the term at zero-based `index` (`word1`, `word2`, ...).
pub fn label(index: usize) -> String {
    format!("word{}", index + 1)
}

/// Which spellings of each term were found in one chunk.
///
/// There is always exactly one word list per term, in term order, even when
/// nothing matched. `success` is derived, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    words: Vec<Vec<String>>,
    raw_response: Option<String>,
}

impl MatchResult {
    /// Build from per-term word lists; each list is sorted and deduplicated.
    pub fn new(mut words: Vec<Vec<String>>) -> Self {
        for list in &mut words {
            list.sort();
            list.dedup();
        }
        Self::from_sorted(words)
    }

    pub(crate) fn from_sorted(words: Vec<Vec<String>>) -> Self {
        Self {
            words,
            raw_response: None,
        }
    }

    /// A result with `term_count` empty word lists.
    pub fn empty(term_count: usize) -> Self {
        Self::from_sorted(vec![Vec::new(); term_count])
    }

    /// A non-tabular response kept verbatim, with empty word lists.
    pub fn raw(term_count: usize, response: impl Into<String>) -> Self {
        Self {
            words: vec![Vec::new(); term_count],
            raw_response: Some(response.into()),
        }
    }

    /// Interpret text produced by a model-backed matcher.
    ///
    /// A JSON object (optionally inside a markdown code fence) is read as
    /// `word{k}` lists; the model's own `success` flag is ignored and
    /// recomputed. Anything else is kept as a raw response.
    pub fn from_model_output(term_count: usize, text: &str) -> Self {
        let map = match serde_json::from_str::<Value>(strip_code_fence(text)) {
            Ok(Value::Object(map)) => map,
            _ => return Self::raw(term_count, text),
        };
        let words = (0..term_count)
            .map(|i| match map.get(&label(i)) {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect(),
                Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
                _ => Vec::new(),
            })
            .collect();
        Self::new(words)
    }

    /// True iff any term matched.
    pub fn success(&self) -> bool {
        self.words.iter().any(|list| !list.is_empty())
    }

    pub fn term_count(&self) -> usize {
        self.words.len()
    }

    /// Word list for the term at zero-based `index`.
    pub fn words(&self, index: usize) -> Option<&[String]> {
        self.words.get(index).map(Vec::as_slice)
    }

    /// Word list by column label, e.g. `"word2"`. Only exact labels resolve.
    pub fn get(&self, column: &str) -> Option<&[String]> {
        let k: usize = column.strip_prefix("word")?.parse().ok()?;
        let index = k.checked_sub(1)?;
        if label(index) != column {
            return None;
        }
        self.words(index)
    }

    /// `(label, words)` pairs in term order.
    pub fn labeled(&self) -> impl Iterator<Item = (String, &[String])> {
        self.words
            .iter()
            .enumerate()
            .map(|(i, list)| (label(i), list.as_slice()))
    }

    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    /// Write `success` and the `word{k}` entries into an open map.
    pub(crate) fn serialize_entries<M: SerializeMap>(&self, map: &mut M) -> Result<(), M::Error> {
        map.serialize_entry("success", &self.success())?;
        for (label, list) in self.labeled() {
            map.serialize_entry(&label, list)?;
        }
        Ok(())
    }
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + self.words.len() + usize::from(self.raw_response.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        self.serialize_entries(&mut map)?;
        if let Some(raw) = &self.raw_response {
            map.serialize_entry("raw_response", raw)?;
        }
        map.end()
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
