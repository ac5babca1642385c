//! Line pattern definitions
//!
//! Highlighting rules match against single lines, never across them, so every
//! pattern here is compiled anchored at the current scan position. A pattern
//! whose source begins with `^` additionally matches only at the very start
//! of a line; the tokenizer enforces that flag. Keeping all patterns anchored
//! this way rules out scan-ahead matches and the usual backtracking blowups.
//!
//! Rule tables write their patterns as plain source strings and compile them
//! through [`LinePattern::new`]. The boundary patterns of the composite
//! grammar (fence openers, document markers, the calendar-date literal) are
//! assembled with [`LineBuilder`] instead, so escaping is handled at
//! construction time rather than by convention.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

/// Error type for pattern construction
#[derive(Debug, Clone, PartialEq)]
pub enum PatternError {
    /// The pattern source is not valid regex syntax
    InvalidPattern(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
        }
    }
}

impl std::error::Error for PatternError {}

/// A compiled single-line pattern.
///
/// Wraps the compiled regex together with its original source text. The
/// source is what equality, ordering of rule tables, and serialization are
/// defined over; two patterns are equal exactly when their sources are.
#[derive(Debug, Clone)]
pub struct LinePattern {
    source: String,
    bol_only: bool,
    regex: Regex,
}

impl LinePattern {
    /// Compile a pattern from its source text.
    ///
    /// A leading `^` is stripped and recorded as the beginning-of-line flag;
    /// the remainder is compiled anchored at the match position, so the
    /// pattern can never match later than where the scan currently stands.
    /// A `^` after the first character is not given line semantics; write
    /// alternations as `^(?:a|b)`, not `^a|^b`.
    pub fn new(source: &str) -> Result<Self, PatternError> {
        let (bol_only, body) = match source.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, source),
        };

        let regex = Regex::new(&format!("\\A(?:{})", body))
            .map_err(|e| PatternError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            bol_only,
            regex,
        })
    }

    /// The original source text, including a leading `^` if present.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this pattern may only match at the start of a line.
    pub fn bol_only(&self) -> bool {
        self.bol_only
    }

    /// Number of capture groups, not counting the implicit whole-match group.
    pub fn capture_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Test the pattern against text beginning at the match position.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Run the pattern against text beginning at the match position.
    pub(crate) fn captures<'t>(&self, text: &'t str) -> Option<regex::Captures<'t>> {
        self.regex.captures(text)
    }
}

impl PartialEq for LinePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for LinePattern {}

impl Serialize for LinePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// Incremental builder for line patterns.
///
/// Every method appends a well-formed fragment (literals are escaped, groups
/// are always closed), so the accumulated source is valid regex by
/// construction and the final compile cannot fail.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    source: String,
}

/// Start a pattern that matches only at the beginning of a line.
pub fn line() -> LineBuilder {
    LineBuilder {
        source: String::from("^"),
    }
}

/// Start a pattern that may match anywhere in a line.
pub fn fragment() -> LineBuilder {
    LineBuilder {
        source: String::new(),
    }
}

impl LineBuilder {
    fn empty() -> Self {
        LineBuilder {
            source: String::new(),
        }
    }

    fn push(mut self, fragment: &str) -> Self {
        self.source.push_str(fragment);
        self
    }

    /// Up to `max` leading spaces.
    pub fn spaces_up_to(self, max: u8) -> Self {
        self.push(&format!(" {{0,{}}}", max))
    }

    /// A fence of at least `min` backticks.
    pub fn backticks_at_least(self, min: u8) -> Self {
        self.push(&format!("`{{{},}}", min))
    }

    /// The literal text, escaped.
    pub fn lit(self, text: &str) -> Self {
        let escaped = regex::escape(text);
        self.push(&escaped)
    }

    /// The literal text, escaped, matched case-insensitively.
    pub fn lit_nocase(self, text: &str) -> Self {
        let escaped = regex::escape(text);
        self.push(&format!("(?i:{})", escaped))
    }

    /// Any one of the given literals, escaped.
    pub fn one_of(self, words: &[&str]) -> Self {
        let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
        self.push(&format!("(?:{})", escaped.join("|")))
    }

    /// A single lowercase letter.
    pub fn letter(self) -> Self {
        self.push("[a-z]")
    }

    /// One or more digits.
    pub fn digits(self) -> Self {
        self.push("\\d+")
    }

    /// Anything, including nothing, up to the end of the line.
    pub fn any(self) -> Self {
        self.push(".*")
    }

    /// Optional whitespace.
    pub fn opt_blanks(self) -> Self {
        self.push("\\s*")
    }

    /// Mandatory whitespace.
    pub fn blank_sep(self) -> Self {
        self.push("\\s+")
    }

    /// An optional sub-pattern.
    pub fn optionally(self, f: impl FnOnce(LineBuilder) -> LineBuilder) -> Self {
        let inner = f(LineBuilder::empty());
        self.push(&format!("(?:{})?", inner.source))
    }

    /// Exactly one of two sub-patterns, tried in order.
    pub fn either(
        self,
        first: impl FnOnce(LineBuilder) -> LineBuilder,
        second: impl FnOnce(LineBuilder) -> LineBuilder,
    ) -> Self {
        let a = first(LineBuilder::empty());
        let b = second(LineBuilder::empty());
        self.push(&format!("(?:{}|{})", a.source, b.source))
    }

    /// Require the end of the line and compile.
    pub fn to_end(self) -> LinePattern {
        let built = self.push("$");
        built.build()
    }

    /// Compile without requiring the end of the line.
    pub fn build(self) -> LinePattern {
        LinePattern::new(&self.source).expect("LineBuilder emits valid pattern syntax")
    }
}
