//! Front matter: recognized only on the first line of a document, closed by
//! `---` or `...`, with long-form dates kept as a single literal.

use rstest::rstest;

use rmd_highlight::rmd::grammar::{ENTRY_TOKEN, EXIT_TOKEN};
use rmd_highlight::rmd::grammars::rmarkdown::{self, BODY_START_STATE};
use rmd_highlight::rmd::testing::{final_state, render_document};
use rmd_highlight::Tokenizer;

fn tokenizer() -> Tokenizer<'static> {
    Tokenizer::new(rmarkdown::grammar())
}

#[test]
fn test_header_opens_only_on_the_first_line() {
    let doc = "---\ntitle: x\n---";
    let lines = tokenizer().tokenize(doc).unwrap();
    assert_eq!(lines[0].tokens[0].class, ENTRY_TOKEN);
    assert_eq!(lines[0].end_state, "yaml-start");
    assert_eq!(lines[1].end_state, "yaml-start");
    assert_eq!(lines[2].tokens[0].class, EXIT_TOKEN);
    assert_eq!(lines[2].end_state, BODY_START_STATE);
}

#[test]
fn test_dashes_after_content_are_a_horizontal_rule() {
    let doc = "Hello\n---\nbody";
    let lines = tokenizer().tokenize(doc).unwrap();
    // The first ordinary line retires the entry state.
    assert_eq!(lines[0].end_state, BODY_START_STATE);
    assert_eq!(lines[1].end_state, BODY_START_STATE);
    assert_eq!(lines[1].tokens[0].class, "constant");
    assert!(lines.iter().all(|line| line.end_state != "yaml-start"));
}

#[test]
fn test_dashes_after_a_heading_are_a_horizontal_rule() {
    let doc = "# Title\n---";
    let lines = tokenizer().tokenize(doc).unwrap();
    assert_eq!(lines[0].tokens[0].class, "markup.heading");
    assert_eq!(lines[1].tokens[0].class, "constant");
    assert_eq!(lines[1].end_state, BODY_START_STATE);
}

#[test]
fn test_ellipsis_closes_the_header() {
    let doc = "---\na: 1\n...\nafter";
    let lines = tokenizer().tokenize(doc).unwrap();
    assert_eq!(lines[2].tokens[0].class, EXIT_TOKEN);
    assert_eq!(lines[2].end_state, BODY_START_STATE);
    assert_eq!(lines[3].end_state, BODY_START_STATE);
}

#[test]
fn test_unterminated_header_swallows_the_rest() {
    let doc = "---\ntitle: x\nstill yaml";
    let lines = tokenizer().tokenize(doc).unwrap();
    assert!(lines.iter().all(|line| line.end_state == "yaml-start"));
    assert_eq!(final_state(&tokenizer(), doc).unwrap(), "yaml-start");
}

#[test]
fn test_closed_header_does_not_reopen() {
    let doc = "---\nt: 1\n---\nx\n---\ny";
    let lines = tokenizer().tokenize(doc).unwrap();
    let states: Vec<&str> = lines.iter().map(|line| line.end_state.as_str()).collect();
    assert_eq!(
        states,
        vec![
            "yaml-start",
            "yaml-start",
            BODY_START_STATE,
            BODY_START_STATE,
            BODY_START_STATE,
            BODY_START_STATE,
        ]
    );
    // The dashes in the body render as a rule, not a header.
    assert_eq!(lines[4].tokens[0].class, "constant");
}

#[rstest(
    date => ["July 4", "March 3rd, 2023", "September 22nd 1999", "December 25, 1990"]
)]
fn test_long_form_dates_are_one_string_token(date: &str) {
    let line = format!("date: {}", date);
    let tokenized = tokenizer().tokenize_line(&line, "yaml-start").unwrap();
    let last = tokenized.tokens.last().unwrap();
    assert_eq!(last.class, "string");
    assert_eq!(last.text(&line), date);
}

#[test]
fn test_header_rendering() {
    let doc = "---\ndate: March 3rd, 2023\n---\ndone";
    let rendered = render_document(&tokenizer(), doc).unwrap();
    insta::assert_snapshot!(rendered, @r###"
--- => support.function.codebegin:"---" [yaml-start]
date: March 3rd, 2023 => meta.tag:"date" keyword.operator:":" text:" " string:"March 3rd, 2023" [yaml-start]
--- => support.function.codeend:"---" [$start]
done => text:"done" [$start]
"###);
}
