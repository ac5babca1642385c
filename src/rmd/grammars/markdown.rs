//! Markdown host grammar
//!
//! A line-oriented cut of Markdown, enough to carry the block structure the
//! composite document format cares about: headings, block quotes, lists,
//! horizontal rules, fenced and indented code blocks, and a little inline
//! markup. Paragraph text is whatever no rule claims; the tokenizer's
//! default classification covers it.
//!
//! Three states matter to embedding: "start" hosts top-level blocks,
//! "listblock" runs while a list is open, and "allowBlock" is the
//! state reached after a blank line, where indented code is legal. Code
//! fences may open in any of them.

use once_cell::sync::Lazy;

use crate::rmd::grammar::rules::{RuleSet, START_STATE};
use crate::rmd::grammars::table;

const START: &[(&str, &str, Option<&str>)] = &[
    ("^#{1,6}(?:\\s.*)?$", "markup.heading", None),
    ("^\\s*>\\s*(?:[*+-]\\s+)?", "string.blockquote", Some("blockquote")),
    (
        "^ {0,3}(?:(?:\\* ?){3,}|(?:- ?){3,}|(?:_ ?){3,})\\s*$",
        "constant",
        None,
    ),
    ("^\\s*(?:[*+-]|\\d+\\.)\\s+", "markup.list", Some("listblock")),
    (
        "^`{3,}(?:[A-Za-z0-9]+)?\\s*$",
        "support.function",
        Some("githubblock"),
    ),
    ("`[^`]+`", "support.function", None),
    ("\\*\\*[^*]+\\*\\*|__[^_]+__", "string.strong", None),
    ("\\*[^*]+\\*|_[^_]+_", "string.emphasis", None),
    ("\\[[^\\]]*\\]\\([^)]*\\)", "string", None),
    ("^$", "text", Some("allowBlock")),
];

const LISTBLOCK: &[(&str, &str, Option<&str>)] = &[
    ("^\\s*(?:[*+-]|\\d+\\.)\\s+", "markup.list", None),
    ("^$", "text", Some(START_STATE)),
    ("`[^`]+`", "support.function", None),
    ("\\*\\*[^*]+\\*\\*|__[^_]+__", "string.strong", None),
    ("\\*[^*]+\\*|_[^_]+_", "string.emphasis", None),
];

const ALLOW_BLOCK: &[(&str, &str, Option<&str>)] = &[
    ("^ {4}.+", "support.function", None),
    ("^\\s*$", "text", Some("allowBlock")),
    ("", "text", Some(START_STATE)),
];

const BLOCKQUOTE: &[(&str, &str, Option<&str>)] = &[
    ("^\\s*$", "text", Some(START_STATE)),
    (".+", "string.blockquote", None),
];

const GITHUB_BLOCK: &[(&str, &str, Option<&str>)] = &[
    ("^`{3,}\\s*$", "support.function", Some(START_STATE)),
    (".+", "support.function", None),
];

static TEMPLATE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_states(vec![
        (START_STATE, table(START)),
        ("listblock", table(LISTBLOCK)),
        ("allowBlock", table(ALLOW_BLOCK)),
        ("blockquote", table(BLOCKQUOTE)),
        ("githubblock", table(GITHUB_BLOCK)),
    ])
    .expect("markdown states are unique")
});

/// A fresh, independent copy of the Markdown rule set.
pub fn rules() -> RuleSet {
    TEMPLATE.clone()
}
