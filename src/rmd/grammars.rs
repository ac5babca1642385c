//! Sub-language grammars
//!
//! One module per language: the Markdown host grammar plus the R, C++, and
//! YAML guests, and the composite R Markdown grammar assembled from them.
//!
//! Each language module keeps its rules as a static table compiled once and
//! hands out independent copies through a `rules()` factory, so composition
//! can never mutate data shared with another grammar instance.

pub mod cpp;
pub mod markdown;
pub mod r;
pub mod rmarkdown;
pub mod yaml;

use super::grammar::patterns::LinePattern;
use super::grammar::rules::Rule;

/// Build the rules of one state from a static `(pattern, token, next)` table.
pub(crate) fn table(rules: &[(&str, &str, Option<&str>)]) -> Vec<Rule> {
    rules
        .iter()
        .map(|(source, token, next)| {
            let pattern = LinePattern::new(source).expect("static grammar pattern");
            Rule::one(pattern, token, *next)
        })
        .collect()
}
