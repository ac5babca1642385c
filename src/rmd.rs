//! R Markdown highlighting
//!
//! Everything needed to tokenize a composite R Markdown document: the
//! grammar data model and embedding machinery ([`grammar`]), the four
//! sub-language rule sets and the composite built from them ([`grammars`]),
//! and the line tokenizer that runs the result ([`tokenizer`]).

pub mod grammar;
pub mod grammars;
pub mod testing;
pub mod tokenizer;
