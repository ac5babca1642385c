//! Grammar data model and composition
//!
//! The pieces a highlighting grammar is made of: anchored line patterns
//! ([`patterns`]), states and rule tables ([`rules`]), and the embedding
//! operation that splices one grammar into another ([`embedding`]).
//!
//! Everything here is plain immutable data once constructed. Composition
//! happens once, up front; tokenization only ever reads the result.

pub mod embedding;
pub mod patterns;
pub mod rules;

pub use embedding::{embed, Embedding, ENTRY_TOKEN, EXIT_TOKEN};
pub use patterns::{LinePattern, PatternError};
pub use rules::{Classification, GrammarError, Rule, RuleSet, START_STATE};
