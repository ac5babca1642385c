//! Grammar embedding
//!
//! Splices a guest rule set into a host so tokenization can cross language
//! boundaries: an entry rule in the host hands control to the guest's start
//! state, and an exit rule in every guest state hands it back. Guest states
//! are renamed under a namespace prefix before merging, so "start" in an
//! embedded R grammar becomes "r-start" and cannot collide with the host.
//!
//! Exits return to the exact host state that was active when the boundary
//! opened. Rather than making the tokenizer carry a stack of saved states,
//! the embedder merges one namespaced copy of the guest per target state,
//! each copy wired to return to its own target. A fence opened from inside a
//! list therefore closes back into the list, and the tokenizer stays a plain
//! (state, line) function.

use super::patterns::LinePattern;
use super::rules::{GrammarError, Rule, RuleSet, START_STATE};

/// Token class for a matched entry boundary, unless overridden.
pub const ENTRY_TOKEN: &str = "support.function.codebegin";

/// Token class for a matched exit boundary.
pub const EXIT_TOKEN: &str = "support.function.codeend";

/// Configuration for one embedding: which prefix to merge the guest under,
/// how its region opens and closes, and which host states can open it.
#[derive(Debug, Clone)]
pub struct Embedding {
    prefix: String,
    entry: Option<LinePattern>,
    entry_token: String,
    exit: LinePattern,
    targets: Vec<String>,
}

impl Embedding {
    /// Embedding opened by `entry` and closed by `exit`.
    pub fn new(prefix: &str, entry: LinePattern, exit: LinePattern) -> Self {
        Embedding {
            prefix: prefix.to_string(),
            entry: Some(entry),
            entry_token: ENTRY_TOKEN.to_string(),
            exit,
            targets: Vec::new(),
        }
    }

    /// Embedding with no entry rule of its own. The guest region still closes
    /// on `exit`; entering it is left to the caller's own wiring.
    pub fn without_entry(prefix: &str, exit: LinePattern) -> Self {
        Embedding {
            prefix: prefix.to_string(),
            entry: None,
            entry_token: ENTRY_TOKEN.to_string(),
            exit,
            targets: Vec::new(),
        }
    }

    /// Override the token class emitted for the entry boundary line.
    pub fn entry_token(mut self, token: &str) -> Self {
        self.entry_token = token.to_string();
        self
    }

    /// Host states in which the guest region may open. Defaults to just the
    /// start state when left empty.
    pub fn targets(mut self, targets: &[&str]) -> Self {
        self.targets = targets.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn resolved_targets(&self) -> Vec<String> {
        if self.targets.is_empty() {
            vec![START_STATE.to_string()]
        } else {
            self.targets.clone()
        }
    }

    /// Namespace for the guest copy serving `target`, the `index`-th target.
    ///
    /// The first target gets the bare prefix, so the canonical entry point
    /// keeps its expected name ("r-start"). Copies for further targets are
    /// tagged with their return state ("r@listblock-start").
    fn namespace(&self, index: usize, target: &str) -> String {
        if index == 0 {
            self.prefix.clone()
        } else {
            format!("{}@{}", self.prefix, target)
        }
    }
}

/// Splice a guest rule set into `host` according to `embedding`.
///
/// The factory is invoked fresh per call, so embedding the same guest twice
/// under different prefixes yields two fully independent copies. Any
/// misconfiguration (missing target state, guest without a start state, a
/// prefix already merged) fails before `host` is touched or part-way with an
/// error, never by silently skipping a splice.
pub fn embed<F>(host: &mut RuleSet, guest: F, embedding: &Embedding) -> Result<(), GrammarError>
where
    F: Fn() -> RuleSet,
{
    if !host.contains_state(START_STATE) {
        return Err(GrammarError::MissingState(START_STATE.to_string()));
    }

    let targets = embedding.resolved_targets();
    for target in &targets {
        if !host.contains_state(target) {
            return Err(GrammarError::MissingTargetState {
                prefix: embedding.prefix.clone(),
                target: target.clone(),
            });
        }
    }

    let template = guest();
    if !template.contains_state(START_STATE) {
        return Err(GrammarError::MissingGuestStart {
            prefix: embedding.prefix.clone(),
        });
    }

    for (index, target) in targets.iter().enumerate() {
        let namespace = embedding.namespace(index, target);
        let mut copy = namespaced(template.clone(), &namespace)?;

        // The exit boundary goes in front of every guest state, so a closing
        // line is recognized even from inside a guest string or comment.
        let exit_rule = Rule::one(embedding.exit.clone(), EXIT_TOKEN, Some(target));
        let guest_states: Vec<String> = copy.state_names().map(|n| n.to_string()).collect();
        for state in &guest_states {
            copy.prepend_rule(state, exit_rule.clone())?;
        }

        host.merge(copy)?;

        if let Some(entry) = &embedding.entry {
            let guest_start = format!("{}-{}", namespace, START_STATE);
            host.prepend_rule(
                target,
                Rule::one(entry.clone(), &embedding.entry_token, Some(&guest_start)),
            )?;
        }
    }

    Ok(())
}

/// Rename every guest state under `namespace` and rewrite guest-internal
/// transitions to the renamed targets. Transitions that point outside the
/// guest are left untouched.
fn namespaced(guest: RuleSet, namespace: &str) -> Result<RuleSet, GrammarError> {
    let guest_names: Vec<String> = guest.state_names().map(|n| n.to_string()).collect();

    let mut renamed = RuleSet::new();
    for (name, rules) in guest.into_states() {
        let rules = rules
            .into_iter()
            .map(|mut rule| {
                if let Some(next) = &rule.next {
                    if guest_names.iter().any(|n| n == next) {
                        rule.next = Some(format!("{}-{}", namespace, next));
                    }
                }
                rule
            })
            .collect();
        renamed.insert_state(&format!("{}-{}", namespace, name), rules)?;
    }
    Ok(renamed)
}
