//! Fixed OCR confusion data for Fraktur-era German newspaper scans.
//!
//! The table is explicit and validated once. Single characters map to the
//! set of glyphs OCR tends to read in their place; multi-character rules
//! cover sequences that get merged or split (`rn` read as `m` and back).

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use lazy_static::lazy_static;

use crate::error::ConfigError;

/// Single-character confusions. Letters without an entry only match themselves.
const CLASSES: &[(char, &str)] = &[
    ('a', "aä"),
    ('ä', "äa"),
    ('c', "ce"),
    ('d', "do"),
    ('e', "eéc"),
    ('f', "fſ"),
    ('g', "gq"),
    ('h', "hn"),
    ('i', "i1ltn"),
    ('k', "kc"),
    ('l', "lt1i"),
    ('m', "mnr"),
    ('n', "nhu"),
    ('o', "o0"),
    ('ö', "öo"),
    ('q', "qg"),
    ('s', "sſf"),
    ('ß', "ßsſ"),
    ('t', "t1i"),
    ('u', "uüvn"),
    ('ü', "üu"),
    ('v', "vu"),
    ('w', "wv"),
    ('z', "z2"),
];

/// Sequences OCR merges into one glyph or splits into two.
const RULES: &[(&str, &[&str])] = &[
    ("rn", &["rn", "m"]),
    ("vv", &["vv", "w"]),
    ("ri", &["ri", "n"]),
    ("cl", &["cl", "d"]),
    ("ch", &["ch", "h"]),
    ("ck", &["ck", "k"]),
    ("ſt", &["ſt", "st", "f"]),
    ("ni", &["ni", "m"]),
    ("li", &["li", "h"]),
    ("tt", &["tt", "n"]),
];

lazy_static! {
    static ref BUILTIN: Result<ConfusionTable, ConfigError> = ConfusionTable::new(CLASSES, RULES);
}

/// A character and every glyph OCR may produce for it, itself included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionClass {
    key: char,
    members: BTreeSet<char>,
}

impl ConfusionClass {
    pub fn key(&self) -> char {
        self.key
    }

    pub fn members(&self) -> &BTreeSet<char> {
        &self.members
    }

    pub fn contains(&self, c: char) -> bool {
        self.members.contains(&c)
    }
}

/// A character sequence and the spellings it may stand for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCharRule {
    sequence: String,
    chars: Vec<char>,
    alternatives: Vec<String>,
}

impl MultiCharRule {
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Sequence length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Alternative spellings, in declaration order with duplicates removed.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    /// True if `folded` begins with this rule's sequence.
    pub fn is_prefix_of(&self, folded: &[char]) -> bool {
        folded.starts_with(&self.chars)
    }

    /// Priority order: longer sequences first, then lexicographic.
    fn priority(&self, other: &Self) -> Ordering {
        other
            .len()
            .cmp(&self.len())
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Immutable, validated confusion data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionTable {
    classes: BTreeMap<char, ConfusionClass>,
    rules: Vec<MultiCharRule>,
}

impl ConfusionTable {
    /// Build and validate a table.
    ///
    /// `classes` pairs a lowercase key with the characters it may be confused
    /// with (the key must be among them). `rules` pairs a lowercase sequence of
    /// at least two characters with its alternative spellings. The rule list is
    /// stored longest-first, ties broken lexicographically, whatever the input
    /// order.
    pub fn new(classes: &[(char, &str)], rules: &[(&str, &[&str])]) -> Result<Self, ConfigError> {
        let mut class_map = BTreeMap::new();
        for &(key, members) in classes {
            if !(key.is_alphabetic() && key.is_lowercase()) {
                return Err(ConfigError::InvalidClassKey { key });
            }
            let members: BTreeSet<char> = members.chars().collect();
            if members.is_empty() {
                return Err(ConfigError::EmptyClass { key });
            }
            if !members.contains(&key) {
                return Err(ConfigError::ClassMissingKey { key });
            }
            if class_map
                .insert(key, ConfusionClass { key, members })
                .is_some()
            {
                return Err(ConfigError::DuplicateClass { key });
            }
        }

        let mut rule_list: Vec<MultiCharRule> = Vec::with_capacity(rules.len());
        for &(sequence, alternatives) in rules {
            let chars: Vec<char> = sequence.chars().collect();
            if chars.is_empty() {
                return Err(ConfigError::EmptyRuleSequence);
            }
            if chars.len() < 2 {
                return Err(ConfigError::RuleTooShort {
                    sequence: sequence.to_string(),
                });
            }
            if sequence.to_lowercase() != sequence {
                return Err(ConfigError::RuleNotLowercase {
                    sequence: sequence.to_string(),
                });
            }
            if rule_list.iter().any(|r| r.sequence == sequence) {
                return Err(ConfigError::DuplicateRule {
                    sequence: sequence.to_string(),
                });
            }
            if alternatives.is_empty() || alternatives.iter().any(|a| a.is_empty()) {
                return Err(ConfigError::EmptyAlternation {
                    sequence: sequence.to_string(),
                });
            }
            let mut seen = BTreeSet::new();
            let alternatives = alternatives
                .iter()
                .filter(|a| seen.insert(**a))
                .map(|a| a.to_string())
                .collect();
            rule_list.push(MultiCharRule {
                sequence: sequence.to_string(),
                chars,
                alternatives,
            });
        }
        rule_list.sort_by(MultiCharRule::priority);

        Ok(Self {
            classes: class_map,
            rules: rule_list,
        })
    }

    /// The process-wide table, validated on first use.
    pub fn builtin() -> Result<&'static ConfusionTable, ConfigError> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Confusion class for a lowercase character, if it has one.
    pub fn confusable_class(&self, c: char) -> Option<&ConfusionClass> {
        self.classes.get(&c)
    }

    /// All multi-character rules, highest priority first.
    pub fn multi_char_rules(&self) -> &[MultiCharRule] {
        &self.rules
    }

    /// The highest-priority rule whose sequence starts `folded`.
    pub fn rule_at(&self, folded: &[char]) -> Option<&MultiCharRule> {
        self.rules.iter().find(|rule| rule.is_prefix_of(folded))
    }
}
