//! Composite R Markdown grammar
//!
//! Markdown hosting three guests: R chunks, C++ chunks, and a YAML front
//! matter header. Assembly order is load-bearing:
//!
//! 1. Embed R into every state where a fence may open. Entry rules are
//!    prepended, so later embeddings outrank earlier ones.
//! 2. Embed C++ into the same states. Its entry pattern is stricter than
//!    R's (an `engine = "Rcpp"` option or an `rcpp` language tag) and must
//!    win over the plain R pattern, which embedding second guarantees.
//! 3. Split "start" in two: "start" stays the document's one-shot entry
//!    state, a clone named "$start" becomes the body state every later
//!    transition funnels into.
//! 4. Embed YAML into "start" alone, then redirect its exits into "$start".
//!    Only the first line of a document can open front matter, and closing
//!    it lands in the body, never back in the entry state.
//! 5. Put a calendar-date rule in front of the YAML rules, so `date:` values
//!    like `March 3rd, 2023` come out as one literal token.

use once_cell::sync::Lazy;

use crate::rmd::grammar::embedding::{embed, Embedding};
use crate::rmd::grammar::patterns::{fragment, line, LineBuilder, LinePattern};
use crate::rmd::grammar::rules::{GrammarError, Rule, RuleSet, START_STATE};
use crate::rmd::grammars::{cpp, markdown, r, yaml};

/// Body state: where tokenization runs once the document has begun.
pub const BODY_START_STATE: &str = "$start";

/// Host states in which a code fence may open.
const CHUNK_TARGETS: &[&str] = &["start", "listblock", "allowBlock"];

const MONTHS: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn fence(builder: LineBuilder) -> LineBuilder {
    builder.spaces_up_to(3).backticks_at_least(3).opt_blanks()
}

/// ```` ```{r, options} ```` with up to three spaces of indent.
static R_CHUNK_START: Lazy<LinePattern> = Lazy::new(|| {
    fence(line())
        .lit("{")
        .one_of(&["r", "R"])
        .any()
        .lit("}")
        .opt_blanks()
        .to_end()
});

/// A chunk header that belongs to C++: either an `engine = "Rcpp"` option
/// anywhere after the tag, or the tag itself being `rcpp`, case-insensitive.
static CPP_CHUNK_START: Lazy<LinePattern> = Lazy::new(|| {
    fence(line())
        .lit("{")
        .one_of(&["r", "R"])
        .either(
            |alt| {
                alt.any()
                    .lit("engine")
                    .opt_blanks()
                    .lit("=")
                    .opt_blanks()
                    .one_of(&["'", "\""])
                    .lit("Rcpp")
                    .one_of(&["'", "\""])
                    .any()
            },
            |alt| alt.lit_nocase("cpp").any(),
        )
        .lit("}")
        .opt_blanks()
        .to_end()
});

/// A closing fence, alone on its line.
static CHUNK_END: Lazy<LinePattern> = Lazy::new(|| fence(line()).to_end());

static FRONT_MATTER_OPEN: Lazy<LinePattern> =
    Lazy::new(|| line().lit("---").opt_blanks().to_end());

static FRONT_MATTER_CLOSE: Lazy<LinePattern> = Lazy::new(|| {
    line()
        .either(|alt| alt.lit("---"), |alt| alt.lit("..."))
        .opt_blanks()
        .to_end()
});

/// Long-form date: full month name, day, optional ordinal suffix, optional
/// comma and year.
static DATE_LITERAL: Lazy<LinePattern> = Lazy::new(|| {
    fragment()
        .one_of(MONTHS)
        .blank_sep()
        .digits()
        .optionally(|suffix| {
            suffix.either(|s| s.one_of(&["st", "nd", "rd"]), |s| s.letter())
        })
        .optionally(|rest| {
            rest.opt_blanks()
                .optionally(|comma| comma.lit(","))
                .optionally(|year| year.opt_blanks().digits())
        })
        .build()
});

/// Build the composite rule set.
///
/// Every call assembles a fresh, fully independent copy and validates it
/// before returning, so a miswired embedding can never escape as a
/// half-merged grammar.
pub fn rules() -> Result<RuleSet, GrammarError> {
    let mut rules = markdown::rules();

    embed(
        &mut rules,
        r::rules,
        &Embedding::new("r", R_CHUNK_START.clone(), CHUNK_END.clone()).targets(CHUNK_TARGETS),
    )?;
    embed(
        &mut rules,
        cpp::rules,
        &Embedding::new("r-cpp", CPP_CHUNK_START.clone(), CHUNK_END.clone())
            .targets(CHUNK_TARGETS),
    )?;

    // One-shot entry state: everything that used to return to "start" now
    // returns to the body clone instead.
    rules.clone_state(START_STATE, BODY_START_STATE)?;
    rules.redirect_transitions(START_STATE, BODY_START_STATE);

    embed(
        &mut rules,
        yaml::rules,
        &Embedding::new("yaml", FRONT_MATTER_OPEN.clone(), FRONT_MATTER_CLOSE.clone())
            .targets(&[START_STATE]),
    )?;
    // The exits merged just now still point at "start"; closing the header
    // lands in the body, not back in the entry state.
    rules.redirect_transitions(START_STATE, BODY_START_STATE);

    rules.prepend_rule("yaml-start", Rule::one(DATE_LITERAL.clone(), "string", None))?;

    // Ordinary content on the first line retires the entry state for good;
    // anything "start" itself does not claim re-scans from the body clone.
    rules.append_rule(
        START_STATE,
        Rule::one(fragment().build(), "text", Some(BODY_START_STATE)),
    )?;

    rules.validate(&[START_STATE])?;
    Ok(rules)
}

/// Shared composite grammar, built once.
pub fn grammar() -> &'static RuleSet {
    static GRAMMAR: Lazy<RuleSet> = Lazy::new(|| rules().expect("composite grammar is well-formed"));
    &GRAMMAR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rmd::grammar::embedding::{ENTRY_TOKEN, EXIT_TOKEN};
    use crate::rmd::grammar::rules::Classification;

    fn full_match(pattern: &LinePattern, text: &str) -> bool {
        pattern
            .captures(text)
            .map(|caps| caps.get(0).map(|m| m.end()) == Some(text.len()))
            .unwrap_or(false)
    }

    #[test]
    fn test_r_chunk_pattern() {
        for header in ["```{r}", "```{R}", "   ```{r}", "```{r, echo=FALSE}", "`````{r label}  "] {
            assert!(full_match(&R_CHUNK_START, header), "rejected {}", header);
        }
        for text in ["``{r}", "    ```{r}", "```{python}", "```{r} x", "```"] {
            assert!(!full_match(&R_CHUNK_START, text), "accepted {}", text);
        }
    }

    #[test]
    fn test_cpp_chunk_pattern() {
        for header in [
            "```{rcpp}",
            "```{Rcpp}",
            "```{RCPP}",
            "```{rcpp, var='x'}",
            "```{r, engine='Rcpp'}",
            "```{r engine = \"Rcpp\"}",
        ] {
            assert!(full_match(&CPP_CHUNK_START, header), "rejected {}", header);
        }
        for text in ["```{r}", "```{r, engine='python'}", "```{cpp}"] {
            assert!(!full_match(&CPP_CHUNK_START, text), "accepted {}", text);
        }
    }

    #[test]
    fn test_closing_fence_pattern() {
        assert!(full_match(&CHUNK_END, "```"));
        assert!(full_match(&CHUNK_END, "   `````  "));
        assert!(!full_match(&CHUNK_END, "``` x"));
        assert!(!full_match(&CHUNK_END, "    ```"));
    }

    #[test]
    fn test_front_matter_patterns() {
        assert!(full_match(&FRONT_MATTER_OPEN, "---"));
        assert!(!full_match(&FRONT_MATTER_OPEN, "----"));
        assert!(!full_match(&FRONT_MATTER_OPEN, "..."));
        assert!(full_match(&FRONT_MATTER_CLOSE, "---"));
        assert!(full_match(&FRONT_MATTER_CLOSE, "..."));
    }

    #[test]
    fn test_date_literal_pattern() {
        for date in ["July 4", "March 3rd, 2023", "September 22nd 1999", "May 1,"] {
            assert!(full_match(&DATE_LITERAL, date), "rejected {}", date);
        }
        assert!(!DATE_LITERAL.is_match("Mar 3"));
        assert!(!DATE_LITERAL.is_match("2023-03-03"));
    }

    #[test]
    fn test_entry_order_in_start() {
        let g = rules().unwrap();
        let start = g.state(START_STATE).unwrap();
        let nexts: Vec<Option<&str>> = start.iter().take(3).map(|r| r.next()).collect();
        assert_eq!(
            nexts,
            vec![Some("yaml-start"), Some("r-cpp-start"), Some("r-start")]
        );
        assert_eq!(start[0].classification(), &Classification::one(ENTRY_TOKEN));
    }

    #[test]
    fn test_body_state_has_chunk_entries_but_no_yaml() {
        let g = rules().unwrap();
        let body = g.state(BODY_START_STATE).unwrap();
        assert_eq!(body[0].next(), Some("r-cpp-start"));
        assert_eq!(body[1].next(), Some("r-start"));
        assert!(body.iter().all(|r| r.next() != Some("yaml-start")));
    }

    #[test]
    fn test_every_chunk_target_has_both_entries() {
        let g = rules().unwrap();
        assert_eq!(g.state("listblock").unwrap()[0].next(), Some("r-cpp@listblock-start"));
        assert_eq!(g.state("listblock").unwrap()[1].next(), Some("r@listblock-start"));
        assert_eq!(g.state("allowBlock").unwrap()[0].next(), Some("r-cpp@allowBlock-start"));
        assert_eq!(g.state("allowBlock").unwrap()[1].next(), Some("r@allowBlock-start"));
    }

    #[test]
    fn test_exits_return_to_their_entry_state() {
        let g = rules().unwrap();
        // Chunks opened at the top of the document close into the body state.
        assert_eq!(g.state("r-start").unwrap()[0].next(), Some(BODY_START_STATE));
        assert_eq!(g.state("r-cpp-start").unwrap()[0].next(), Some(BODY_START_STATE));
        // Chunks opened elsewhere close back to where they opened.
        assert_eq!(g.state("r@listblock-start").unwrap()[0].next(), Some("listblock"));
        assert_eq!(g.state("r-cpp@allowBlock-start").unwrap()[0].next(), Some("allowBlock"));
        // The escape is present even in guest continuation states.
        assert_eq!(g.state("r-qqstring").unwrap()[0].next(), Some(BODY_START_STATE));
        assert_eq!(
            g.state("r-qqstring").unwrap()[0].classification(),
            &Classification::one(EXIT_TOKEN)
        );
    }

    #[test]
    fn test_front_matter_closes_into_body() {
        let g = rules().unwrap();
        let yaml_start = g.state("yaml-start").unwrap();
        // Date literal first, then the exit, then the yaml rules proper.
        assert_eq!(yaml_start[0].classification(), &Classification::one("string"));
        assert!(yaml_start[0].pattern().source().starts_with("(?:January"));
        assert_eq!(yaml_start[1].classification(), &Classification::one(EXIT_TOKEN));
        assert_eq!(yaml_start[1].next(), Some(BODY_START_STATE));
    }

    #[test]
    fn test_entry_state_funnels_into_body() {
        let g = rules().unwrap();
        let last = g.state(START_STATE).unwrap().last().unwrap();
        assert_eq!(last.pattern().source(), "");
        assert_eq!(last.next(), Some(BODY_START_STATE));
        // The body clone was taken before the funnel went in.
        let body_last = g.state(BODY_START_STATE).unwrap().last().unwrap();
        assert_eq!(body_last.pattern().source(), "^$");
    }

    #[test]
    fn test_construction_is_idempotent_and_independent() {
        let a = rules().unwrap();
        let b = rules().unwrap();
        assert_eq!(a, b);

        let mut mutated = a;
        mutated.redirect_transitions(BODY_START_STATE, "somewhere");
        assert_ne!(mutated, b);
        assert_eq!(rules().unwrap(), b);
    }

    #[test]
    fn test_shared_grammar_is_one_instance() {
        assert!(std::ptr::eq(grammar(), grammar()));
        assert_eq!(grammar(), &rules().unwrap());
    }
}
