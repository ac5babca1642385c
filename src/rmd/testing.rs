//! Test support
//!
//! Renders tokenizer output as stable one-line-per-source-line text, so
//! tests can snapshot whole documents instead of asserting token lists
//! field by field.
//!
//! ```text
//! title: "Untitled" => meta.tag:"title" keyword.operator:":" text:" " string:"\"Untitled\"" [yaml-start]
//! ```

use super::grammar::rules::START_STATE;
use super::tokenizer::{TokenizeError, TokenizedLine, Tokenizer};

/// Render one tokenized line as `class:"text"` pairs.
pub fn render_line(line: &str, tokenized: &TokenizedLine) -> String {
    let parts: Vec<String> = tokenized
        .tokens
        .iter()
        .map(|token| format!("{}:{:?}", token.class, token.text(line)))
        .collect();
    parts.join(" ")
}

/// Render a whole document, one line per source line, each suffixed with the
/// state the line ends in.
pub fn render_document(tokenizer: &Tokenizer<'_>, text: &str) -> Result<String, TokenizeError> {
    let lines = tokenizer.tokenize(text)?;
    let mut out = String::new();
    for (raw, tokenized) in text.split('\n').zip(&lines) {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        out.push_str(&format!(
            "{} => {} [{}]\n",
            line,
            render_line(line, tokenized),
            tokenized.end_state
        ));
    }
    Ok(out)
}

/// The state a document leaves the tokenizer in.
pub fn final_state(tokenizer: &Tokenizer<'_>, text: &str) -> Result<String, TokenizeError> {
    let lines = tokenizer.tokenize(text)?;
    Ok(lines
        .last()
        .map(|line| line.end_state.clone())
        .unwrap_or_else(|| START_STATE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rmd::grammar::patterns::LinePattern;
    use crate::rmd::grammar::rules::{Rule, RuleSet};

    #[test]
    fn test_render_line_format() {
        let set = RuleSet::from_states(vec![(
            "start",
            vec![Rule::one(
                LinePattern::new("^#+").unwrap(),
                "markup.heading",
                None,
            )],
        )])
        .unwrap();
        let tok = Tokenizer::new(&set);
        let line = tok.tokenize_line("## hi", "start").unwrap();
        assert_eq!(
            render_line("## hi", &line),
            "markup.heading:\"##\" text:\" hi\""
        );
    }

    #[test]
    fn test_final_state_follows_transitions() {
        let set = RuleSet::from_states(vec![
            (
                "start",
                vec![Rule::one(LinePattern::new("\"").unwrap(), "string", Some("str"))],
            ),
            ("str", vec![Rule::one(LinePattern::new(".+").unwrap(), "string", None)]),
        ])
        .unwrap();
        let tok = Tokenizer::new(&set);
        assert_eq!(final_state(&tok, "plain").unwrap(), "start");
        assert_eq!(final_state(&tok, "a \"b\nc").unwrap(), "str");
    }
}
