//! Rule sets
//!
//! A highlighting grammar is a table of named states, each holding an ordered
//! list of rules. Tokenization tries the rules of the current state in order
//! and commits to the first match, so rule order within a state is part of a
//! grammar's meaning and is preserved everywhere: states iterate in insertion
//! order, and every transformation here keeps relative order stable.
//!
//! [`RuleSet`] is plain data. The operations on it (prepend, append, clone a
//! state, redirect transitions, merge) are exactly the moves grammar
//! composition is built from; none of them interpret patterns or tokens.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

use super::patterns::LinePattern;

/// Conventional name of a grammar's initial state.
pub const START_STATE: &str = "start";

/// Error type for grammar construction and validation
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// A state name was inserted twice
    DuplicateState(String),
    /// An operation referenced a state that does not exist
    MissingState(String),
    /// An embedding named a target state the host does not define
    MissingTargetState { prefix: String, target: String },
    /// An embedded grammar has no start state to enter
    MissingGuestStart { prefix: String },
    /// A rule transitions to a state that does not exist
    DanglingTransition { state: String, next: String },
    /// A per-capture classification does not line up with its pattern
    CaptureMismatch {
        state: String,
        pattern: String,
        groups: usize,
        labels: usize,
    },
    /// A state can never be entered from any root state
    UnreachableState(String),
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::DuplicateState(name) => {
                write!(f, "duplicate state '{}'", name)
            }
            GrammarError::MissingState(name) => {
                write!(f, "no such state '{}'", name)
            }
            GrammarError::MissingTargetState { prefix, target } => {
                write!(
                    f,
                    "embedding '{}' targets missing host state '{}'",
                    prefix, target
                )
            }
            GrammarError::MissingGuestStart { prefix } => {
                write!(f, "embedded grammar '{}' has no start state", prefix)
            }
            GrammarError::DanglingTransition { state, next } => {
                write!(
                    f,
                    "state '{}' transitions to undefined state '{}'",
                    state, next
                )
            }
            GrammarError::CaptureMismatch {
                state,
                pattern,
                groups,
                labels,
            } => {
                write!(
                    f,
                    "state '{}': pattern '{}' has {} capture groups but {} token labels",
                    state, pattern, groups, labels
                )
            }
            GrammarError::UnreachableState(name) => {
                write!(f, "state '{}' is unreachable from the root states", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// How a rule's match text maps to token classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The whole match is one token of the given class.
    One(String),
    /// Each capture group becomes its own token, labelled positionally.
    /// Text between groups falls back to the plain text class.
    PerCapture(Vec<String>),
}

impl Classification {
    pub fn one(class: &str) -> Self {
        Classification::One(class.to_string())
    }

    pub fn per_capture(classes: &[&str]) -> Self {
        Classification::PerCapture(classes.iter().map(|c| c.to_string()).collect())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Classification::One(class) => serializer.serialize_str(class),
            Classification::PerCapture(classes) => {
                let mut seq = serializer.serialize_seq(Some(classes.len()))?;
                for class in classes {
                    seq.serialize_element(class)?;
                }
                seq.end()
            }
        }
    }
}

/// One highlighting rule: a pattern, what its match becomes, and where the
/// tokenizer goes next. `next: None` stays in the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub(crate) pattern: LinePattern,
    pub(crate) classification: Classification,
    pub(crate) next: Option<String>,
}

impl Rule {
    pub fn new(pattern: LinePattern, classification: Classification, next: Option<&str>) -> Self {
        Rule {
            pattern,
            classification,
            next: next.map(|n| n.to_string()),
        }
    }

    /// Rule whose whole match is one token of class `token`.
    pub fn one(pattern: LinePattern, token: &str, next: Option<&str>) -> Self {
        Rule::new(pattern, Classification::one(token), next)
    }

    /// Rule that labels each capture group of `pattern` positionally.
    pub fn per_capture(pattern: LinePattern, tokens: &[&str], next: Option<&str>) -> Self {
        Rule::new(pattern, Classification::per_capture(tokens), next)
    }

    pub fn pattern(&self) -> &LinePattern {
        &self.pattern
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn next(&self) -> Option<&str> {
        self.next.as_deref()
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.next.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("token", &self.classification)?;
        map.serialize_entry("regex", self.pattern.source())?;
        if let Some(next) = &self.next {
            map.serialize_entry("next", next)?;
        }
        map.end()
    }
}

/// An ordered table of named states.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    states: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { states: Vec::new() }
    }

    /// Build a rule set from a list of `(name, rules)` pairs, rejecting
    /// duplicate names.
    pub fn from_states(states: Vec<(&str, Vec<Rule>)>) -> Result<Self, GrammarError> {
        let mut set = RuleSet::new();
        for (name, rules) in states {
            set.insert_state(name, rules)?;
        }
        Ok(set)
    }

    /// Add a new state at the end of the table.
    pub fn insert_state(&mut self, name: &str, rules: Vec<Rule>) -> Result<(), GrammarError> {
        if self.contains_state(name) {
            return Err(GrammarError::DuplicateState(name.to_string()));
        }
        self.states.push((name.to_string(), rules));
        Ok(())
    }

    pub fn contains_state(&self, name: &str) -> bool {
        self.states.iter().any(|(n, _)| n == name)
    }

    pub fn state(&self, name: &str) -> Option<&[Rule]> {
        self.states
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rules)| rules.as_slice())
    }

    fn state_rules_mut(&mut self, name: &str) -> Option<&mut Vec<Rule>> {
        self.states
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, rules)| rules)
    }

    /// State names in insertion order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|(n, _)| n.as_str())
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn rule_count(&self) -> usize {
        self.states.iter().map(|(_, rules)| rules.len()).sum()
    }

    /// Put `rule` in front of everything already in `state`, so it is tried
    /// first during tokenization.
    pub fn prepend_rule(&mut self, state: &str, rule: Rule) -> Result<(), GrammarError> {
        match self.state_rules_mut(state) {
            Some(rules) => {
                rules.insert(0, rule);
                Ok(())
            }
            None => Err(GrammarError::MissingState(state.to_string())),
        }
    }

    /// Put `rule` after everything already in `state`.
    pub fn append_rule(&mut self, state: &str, rule: Rule) -> Result<(), GrammarError> {
        match self.state_rules_mut(state) {
            Some(rules) => {
                rules.push(rule);
                Ok(())
            }
            None => Err(GrammarError::MissingState(state.to_string())),
        }
    }

    /// Copy the rules of `from` into a new state `to`, appended at the end of
    /// the table. The copy is independent; later edits to either state do not
    /// affect the other.
    pub fn clone_state(&mut self, from: &str, to: &str) -> Result<(), GrammarError> {
        let rules = self
            .state(from)
            .ok_or_else(|| GrammarError::MissingState(from.to_string()))?
            .to_vec();
        self.insert_state(to, rules)
    }

    /// Rewrite every transition that points at `from_next` to point at
    /// `to_next` instead, across all states. Returns how many rules changed.
    pub fn redirect_transitions(&mut self, from_next: &str, to_next: &str) -> usize {
        let mut changed = 0;
        for (_, rules) in &mut self.states {
            for rule in rules {
                if rule.next.as_deref() == Some(from_next) {
                    rule.next = Some(to_next.to_string());
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Append every state of `other` to this table, rejecting name clashes.
    pub fn merge(&mut self, other: RuleSet) -> Result<(), GrammarError> {
        for (name, rules) in other.states {
            if self.contains_state(&name) {
                return Err(GrammarError::DuplicateState(name));
            }
            self.states.push((name, rules));
        }
        Ok(())
    }

    pub(crate) fn into_states(self) -> Vec<(String, Vec<Rule>)> {
        self.states
    }

    /// Check the whole table for structural problems: transitions into
    /// undefined states, per-capture labels that do not line up with their
    /// pattern, and states that cannot be entered from any of `roots`.
    ///
    /// Composition runs this before handing a grammar out, so a bad merge
    /// fails loudly instead of producing a grammar that misbehaves later.
    pub fn validate(&self, roots: &[&str]) -> Result<(), GrammarError> {
        for root in roots {
            if !self.contains_state(root) {
                return Err(GrammarError::MissingState(root.to_string()));
            }
        }

        for (name, rules) in &self.states {
            for rule in rules {
                if let Some(next) = &rule.next {
                    if !self.contains_state(next) {
                        return Err(GrammarError::DanglingTransition {
                            state: name.clone(),
                            next: next.clone(),
                        });
                    }
                }
                if let Classification::PerCapture(labels) = &rule.classification {
                    let groups = rule.pattern.capture_count();
                    if labels.len() != groups {
                        return Err(GrammarError::CaptureMismatch {
                            state: name.clone(),
                            pattern: rule.pattern.source().to_string(),
                            groups,
                            labels: labels.len(),
                        });
                    }
                }
            }
        }

        let mut reachable: HashSet<&str> = HashSet::new();
        let mut queue: Vec<&str> = roots.to_vec();
        while let Some(name) = queue.pop() {
            if !reachable.insert(name) {
                continue;
            }
            if let Some(rules) = self.state(name) {
                for rule in rules {
                    if let Some(next) = rule.next() {
                        if !reachable.contains(next) {
                            queue.push(next);
                        }
                    }
                }
            }
        }
        for (name, _) in &self.states {
            if !reachable.contains(name.as_str()) {
                return Err(GrammarError::UnreachableState(name.clone()));
            }
        }

        Ok(())
    }

    /// Serialize to pretty-printed JSON, states in insertion order.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.states.len()))?;
        for (name, rules) in &self.states {
            map.serialize_entry(name, rules)?;
        }
        map.end()
    }
}
