//! # rmd-highlight
//!
//! Composable syntax highlighting rules for R Markdown documents.
//!
//! An R Markdown file is Markdown that can switch languages mid-stream:
//! fenced chunks of R or C++, and an optional YAML header at the very top.
//! This crate builds one rule set that tokenizes across those boundaries by
//! embedding each guest grammar into the Markdown host under a namespace
//! prefix, with entry and exit rules wired so leaving a region restores the
//! exact state it opened from.
//!
//! The composed grammar is plain immutable data. Obtain it from
//! [`rmd::grammars::rmarkdown`], run lines through [`rmd::tokenizer`], or
//! serialize it to JSON for an external editor component.

pub mod rmd;

pub use rmd::grammar::{
    embed, Classification, Embedding, GrammarError, LinePattern, PatternError, Rule, RuleSet,
};
pub use rmd::tokenizer::{Token, TokenizeError, TokenizedLine, Tokenizer};
