//! R guest grammar
//!
//! Covers the surface that matters inside a code chunk: comments, both
//! string quote styles (with continuation states so strings may span lines),
//! backquoted names, numbers, the keyword and builtin-constant sets, and
//! operators including the `%op%` family.

use once_cell::sync::Lazy;

use crate::rmd::grammar::rules::{RuleSet, START_STATE};
use crate::rmd::grammars::table;

const START: &[(&str, &str, Option<&str>)] = &[
    ("#.*", "comment", None),
    ("\"", "string", Some("qqstring")),
    ("'", "string", Some("qstring")),
    ("`[^`]*`", "string", None),
    (
        "\\b(?:0[xX][0-9a-fA-F]+|\\d+(?:\\.\\d*)?(?:[eE][+-]?\\d+)?)[iL]?\\b",
        "constant.numeric",
        None,
    ),
    (
        "\\b(?:TRUE|FALSE|NULL|NA|NA_integer_|NA_real_|NA_character_|Inf|NaN)\\b",
        "constant.language",
        None,
    ),
    (
        "\\b(?:function|if|else|for|while|repeat|break|next|return|in|library|require|stop|warning)\\b",
        "keyword",
        None,
    ),
    ("[.a-zA-Z][.a-zA-Z0-9_]*", "identifier", None),
    ("<<?-|->>?|%[^%\\s]*%|[-+*/^><=!&|~?$@:]+", "keyword.operator", None),
    ("[(){}\\[\\],;]", "paren", None),
];

const QQSTRING: &[(&str, &str, Option<&str>)] = &[
    ("(?:[^\"\\\\]|\\\\.)*\"", "string", Some(START_STATE)),
    (".+", "string", None),
];

const QSTRING: &[(&str, &str, Option<&str>)] = &[
    ("(?:[^'\\\\]|\\\\.)*'", "string", Some(START_STATE)),
    (".+", "string", None),
];

static TEMPLATE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_states(vec![
        (START_STATE, table(START)),
        ("qqstring", table(QQSTRING)),
        ("qstring", table(QSTRING)),
    ])
    .expect("r states are unique")
});

/// A fresh, independent copy of the R rule set.
pub fn rules() -> RuleSet {
    TEMPLATE.clone()
}
