//! Line tokenizer
//!
//! Scans text one line at a time against a [`RuleSet`]: at each position the
//! rules of the current state are tried in order and the first match wins,
//! emits its tokens, and may move to another state. The state left at the
//! end of one line is where the next line begins, which is all an editor
//! needs to re-tokenize incrementally from any line. There is no saved-state
//! stack; grammars encode their return paths in the transitions themselves.
//!
//! Unmatched text falls back to the default classification one character at
//! a time; adjacent tokens of the same class are merged, so a paragraph no
//! rule claims still comes out as a single token.
//!
//! Zero-width matches get special treatment. A rule matching empty text is
//! honored only if it names a next state; applying it at the end of a line
//! finishes the line, and a second zero-width application at the same
//! position ends the scan rather than loop. Grammars use this for rules
//! like "a blank line returns to the start state."

use std::fmt;
use std::ops::Range;

use super::grammar::rules::{Classification, Rule, RuleSet, START_STATE};

/// Classification given to text no rule matched.
pub const DEFAULT_TOKEN: &str = "text";

/// Error type for tokenization
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizeError {
    /// Tokenization was asked to run in a state the rule set does not define
    UnknownState(String),
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::UnknownState(state) => {
                write!(f, "unknown tokenizer state '{}'", state)
            }
        }
    }
}

impl std::error::Error for TokenizeError {}

/// One classified span of a line, in byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: String,
    pub span: Range<usize>,
}

impl Token {
    /// The text this token covers within its line.
    pub fn text<'a>(&self, line: &'a str) -> &'a str {
        &line[self.span.clone()]
    }
}

/// The result of tokenizing one line: its tokens plus the state the next
/// line starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedLine {
    pub tokens: Vec<Token>,
    pub end_state: String,
}

/// Tokenizer over an immutable rule set.
pub struct Tokenizer<'g> {
    rules: &'g RuleSet,
}

impl<'g> Tokenizer<'g> {
    pub fn new(rules: &'g RuleSet) -> Self {
        Tokenizer { rules }
    }

    /// Tokenize a whole document from the start state, threading the end
    /// state of each line into the next. Lines are split on `\n`; a trailing
    /// `\r` is not part of any token.
    pub fn tokenize(&self, text: &str) -> Result<Vec<TokenizedLine>, TokenizeError> {
        let mut state = START_STATE.to_string();
        let mut lines = Vec::new();
        for raw in text.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let tokenized = self.tokenize_line(line, &state)?;
            state = tokenized.end_state.clone();
            lines.push(tokenized);
        }
        Ok(lines)
    }

    /// Tokenize a single line beginning in `start_state`.
    pub fn tokenize_line(
        &self,
        line: &str,
        start_state: &str,
    ) -> Result<TokenizedLine, TokenizeError> {
        let mut state = start_state.to_string();
        let mut rules = self
            .rules
            .state(&state)
            .ok_or_else(|| TokenizeError::UnknownState(state.clone()))?;

        let mut tokens: Vec<Token> = Vec::new();
        let len = line.len();
        let mut pos = 0;
        let mut zero_width_at: Option<usize> = None;

        loop {
            let Some((rule, caps)) = first_match(rules, line, pos) else {
                if pos >= len {
                    break;
                }
                let step = line[pos..].chars().next().map_or(1, |c| c.len_utf8());
                push_token(&mut tokens, DEFAULT_TOKEN, pos..pos + step);
                pos += step;
                zero_width_at = None;
                continue;
            };

            let width = caps.get(0).map_or(0, |m| m.len());
            emit(&mut tokens, rule, &caps, pos);
            pos += width;

            if let Some(next) = rule.next() {
                if width == 0 {
                    if pos >= len {
                        state = next.to_string();
                        break;
                    }
                    if zero_width_at == Some(pos) {
                        break;
                    }
                    zero_width_at = Some(pos);
                } else {
                    zero_width_at = None;
                }
                if next != state {
                    state = next.to_string();
                    rules = self
                        .rules
                        .state(&state)
                        .ok_or_else(|| TokenizeError::UnknownState(state.clone()))?;
                }
            } else {
                zero_width_at = None;
            }
        }

        Ok(TokenizedLine {
            tokens,
            end_state: state,
        })
    }
}

/// First rule of `rules` matching `line` at `pos`. Rules restricted to the
/// beginning of a line are skipped elsewhere; zero-width matches without a
/// state change are skipped outright, or they would stall the scan.
fn first_match<'r, 't>(
    rules: &'r [Rule],
    line: &'t str,
    pos: usize,
) -> Option<(&'r Rule, regex::Captures<'t>)> {
    let rest = &line[pos..];
    for rule in rules {
        if rule.pattern().bol_only() && pos != 0 {
            continue;
        }
        if let Some(caps) = rule.pattern().captures(rest) {
            let width = caps.get(0).map_or(0, |m| m.len());
            if width == 0 && rule.next().is_none() {
                continue;
            }
            return Some((rule, caps));
        }
    }
    None
}

fn emit(tokens: &mut Vec<Token>, rule: &Rule, caps: &regex::Captures<'_>, pos: usize) {
    match rule.classification() {
        Classification::One(class) => {
            if let Some(m) = caps.get(0) {
                if m.end() > m.start() {
                    push_token(tokens, class, pos + m.start()..pos + m.end());
                }
            }
        }
        Classification::PerCapture(labels) => {
            let Some(whole) = caps.get(0) else { return };
            let mut cursor = pos + whole.start();
            for (i, label) in labels.iter().enumerate() {
                if let Some(group) = caps.get(i + 1) {
                    let start = pos + group.start();
                    let end = pos + group.end();
                    if start > cursor {
                        push_token(tokens, DEFAULT_TOKEN, cursor..start);
                    }
                    if end > start {
                        push_token(tokens, label, start..end);
                    }
                    cursor = end;
                }
            }
            let end = pos + whole.end();
            if end > cursor {
                push_token(tokens, DEFAULT_TOKEN, cursor..end);
            }
        }
    }
}

/// Append a token, merging it into the previous one when the class matches
/// and the spans touch.
fn push_token(tokens: &mut Vec<Token>, class: &str, span: Range<usize>) {
    if let Some(last) = tokens.last_mut() {
        if last.class == class && last.span.end == span.start {
            last.span.end = span.end;
            return;
        }
    }
    tokens.push(Token {
        class: class.to_string(),
        span,
    });
}
