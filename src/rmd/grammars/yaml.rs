//! YAML guest grammar
//!
//! Front matter only ever holds simple mappings and short lists, so this is
//! a single-state grammar: keys, list dashes, quoted strings, numbers,
//! booleans, anchors, block-scalar introducers, flow punctuation, comments.
//! Unquoted scalar text is left to the tokenizer's default classification.

use once_cell::sync::Lazy;

use crate::rmd::grammar::patterns::LinePattern;
use crate::rmd::grammar::rules::{Rule, RuleSet, START_STATE};
use crate::rmd::grammars::table;

const START: &[(&str, &str, Option<&str>)] = &[
    ("#.*", "comment", None),
    ("\"(?:[^\"\\\\]|\\\\.)*\"", "string", None),
    ("'[^']*'", "string", None),
    ("^\\s*-(?:\\s+|$)", "keyword.operator", None),
    ("[&*]\\w+", "variable", None),
    ("[|>][+-]?\\s*$", "keyword.operator", None),
    ("[\\[\\]{},]", "paren", None),
    ("\\b(?:true|false|yes|no|null)\\b", "constant.language", None),
    ("\\b\\d+(?:\\.\\d+)?\\b", "constant.numeric", None),
];

static TEMPLATE: Lazy<RuleSet> = Lazy::new(|| {
    // The key rule labels its two captures separately, so "title:" renders
    // as a tag followed by an operator.
    let key = Rule::per_capture(
        LinePattern::new("^\\s*([A-Za-z0-9_][\\w.-]*)(:)").expect("static grammar pattern"),
        &["meta.tag", "keyword.operator"],
        None,
    );

    let mut rules = vec![key];
    rules.extend(table(START));
    RuleSet::from_states(vec![(START_STATE, rules)]).expect("yaml states are unique")
});

/// A fresh, independent copy of the YAML rule set.
pub fn rules() -> RuleSet {
    TEMPLATE.clone()
}
