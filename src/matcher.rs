//! Runs compiled patterns over text chunks.

use std::borrow::Cow;
use std::collections::BTreeSet;

use unicode_normalization::{IsNormalized, UnicodeNormalization, is_nfc_quick};

use crate::compiler::CompiledPattern;

/// NFC form of `text`, borrowed when it is already normalized.
pub fn normalize(text: &str) -> Cow<'_, str> {
    match is_nfc_quick(text.chars()) {
        IsNormalized::Yes => Cow::Borrowed(text),
        _ => Cow::Owned(text.nfc().collect()),
    }
}

impl CompiledPattern {
    /// All distinct non-overlapping matches in `text`, sorted.
    ///
    /// Matched substrings are taken from the NFC form of `text` and keep
    /// whatever affix or wrapper characters the match consumed.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        self.find_all_normalized(&normalize(text))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex().is_match(&normalize(text))
    }

    /// Same as [`find_all`](Self::find_all) for text that is already NFC.
    pub(crate) fn find_all_normalized(&self, text: &str) -> Vec<String> {
        self.regex()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}
