//! Compiles a vocabulary term into an OCR-tolerant regular expression.
//!
//! The term is walked left to right over its lowercase form. At each
//! position the longest applicable multi-character rule wins, then the
//! single-character confusion class, then the escaped literal. Units are
//! joined by a short noise gap of any characters (the same gap separates the
//! letters of a rule spelling), and the whole core is
//! wrapped in bounded word-character affixes and punctuation wrappers:
//!
//! ```text
//! (?i)[^\w\s]{0,W}\w{0,A}(?:U1.{0,N}U2 ... .{0,N}Uk)\w{0,A}[^\w\s]{0,W}
//! ```
//!
//! Every quantifier is bounded, and `regex` runs in linear time, so
//! there is no catastrophic backtracking.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::confusion::{ConfusionClass, ConfusionTable, MultiCharRule};
use crate::error::CompileError;

/// Upper bound on the compiled program size. Unicode `\w` is a large class
/// and the affixes repeat it, so the default limit is too tight for long
/// bounds.
const REGEX_SIZE_LIMIT: usize = 64 * (1 << 20);

/// Quantifier bounds used when assembling an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchBounds {
    /// Max stray characters between two units of the term.
    pub noise: usize,
    /// Max word characters before and after the term (compounds, inflection).
    pub affix: usize,
    /// Max punctuation characters wrapping the word.
    pub wrapper: usize,
}

impl Default for MatchBounds {
    fn default() -> Self {
        Self {
            noise: 1,
            affix: 15,
            wrapper: 3,
        }
    }
}

/// A term compiled into a case-insensitive matcher. Immutable and cheap to clone.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    term: String,
    expression: String,
    regex: Regex,
}

impl CompiledPattern {
    /// The term this pattern was compiled from (NFC).
    pub fn term(&self) -> &str {
        &self.term
    }

    /// The expression source. Identical inputs give identical strings.
    pub fn as_str(&self) -> &str {
        &self.expression
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// One matching position in the term.
enum Unit<'t> {
    Rule(&'t MultiCharRule),
    Class(&'t ConfusionClass),
    Literal(char),
}

impl Unit<'_> {
    /// Writes this unit. Characters inside a rule spelling are joined by `gap`.
    fn write_to(&self, out: &mut String, gap: &str) {
        match self {
            Unit::Rule(rule) => {
                out.push_str("(?:");
                for (i, alt) in rule.alternatives().iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    for (j, c) in alt.chars().enumerate() {
                        if j > 0 {
                            out.push_str(gap);
                        }
                        push_escaped(out, c);
                    }
                }
                out.push(')');
            }
            Unit::Class(class) if class.members().len() == 1 => push_escaped(out, class.key()),
            Unit::Class(class) => {
                out.push('[');
                for &c in class.members() {
                    push_escaped(out, c);
                }
                out.push(']');
            }
            Unit::Literal(c) => push_escaped(out, *c),
        }
    }

    /// Rough byte length, for pre-sizing the output buffer.
    fn size_hint(&self, gap_len: usize) -> usize {
        match self {
            Unit::Rule(rule) => {
                5 + rule
                    .alternatives()
                    .iter()
                    .map(|a| a.len() * (1 + gap_len) + 1)
                    .sum::<usize>()
            }
            Unit::Class(class) => 2 + class.members().len() * 4,
            Unit::Literal(_) => 5,
        }
    }
}

fn push_escaped(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// `class{0,max}`, or nothing when `max` is zero.
fn push_bounded(out: &mut String, class: &str, max: usize) {
    if max > 0 {
        out.push_str(class);
        out.push_str("{0,");
        out.push_str(&max.to_string());
        out.push('}');
    }
}

/// Lowercase form of `c` if it is a single character, else `c` itself.
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Builds [`CompiledPattern`]s from terms against one confusion table.
#[derive(Debug, Clone, Copy)]
pub struct PatternCompiler<'a> {
    table: &'a ConfusionTable,
    bounds: MatchBounds,
}

impl<'a> PatternCompiler<'a> {
    pub fn new(table: &'a ConfusionTable, bounds: MatchBounds) -> Self {
        Self { table, bounds }
    }

    /// Compile one term. Empty or whitespace-only terms are rejected.
    pub fn compile(&self, term: &str) -> Result<CompiledPattern, CompileError> {
        let term: String = term.nfc().collect();
        if term.trim().is_empty() {
            return Err(CompileError::EmptyTerm);
        }

        let expression = self.expression(&term);
        let regex = RegexBuilder::new(&expression)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(|source| CompileError::Regex {
                term: term.clone(),
                source,
            })?;

        Ok(CompiledPattern {
            term,
            expression,
            regex,
        })
    }

    fn units(&self, folded: &[char]) -> Vec<Unit<'a>> {
        let mut units = Vec::with_capacity(folded.len());
        let mut i = 0;
        while i < folded.len() {
            if let Some(rule) = self.table.rule_at(&folded[i..]) {
                units.push(Unit::Rule(rule));
                i += rule.len();
                continue;
            }
            units.push(match self.table.confusable_class(folded[i]) {
                Some(class) => Unit::Class(class),
                None => Unit::Literal(folded[i]),
            });
            i += 1;
        }
        units
    }

    fn expression(&self, term: &str) -> String {
        let folded: Vec<char> = term.chars().map(fold).collect();
        let units = self.units(&folded);

        let mut gap = String::new();
        push_bounded(&mut gap, ".", self.bounds.noise);

        let capacity = 64
            + units.iter().map(|u| u.size_hint(gap.len())).sum::<usize>()
            + gap.len() * units.len().saturating_sub(1);
        let mut out = String::with_capacity(capacity);

        out.push_str("(?i)");
        push_bounded(&mut out, r"[^\w\s]", self.bounds.wrapper);
        push_bounded(&mut out, r"\w", self.bounds.affix);
        out.push_str("(?:");
        for (i, unit) in units.iter().enumerate() {
            if i > 0 {
                out.push_str(&gap);
            }
            unit.write_to(&mut out, &gap);
        }
        out.push(')');
        push_bounded(&mut out, r"\w", self.bounds.affix);
        push_bounded(&mut out, r"[^\w\s]", self.bounds.wrapper);
        out
    }
}
