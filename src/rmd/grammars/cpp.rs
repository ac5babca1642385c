//! C++ guest grammar
//!
//! The single-line cut of C++ used inside Rcpp chunks: comments including
//! the multi-line block form, strings and character literals, preprocessor
//! directives, keyword and type sets, and numeric literals with suffixes.

use once_cell::sync::Lazy;

use crate::rmd::grammar::rules::{RuleSet, START_STATE};
use crate::rmd::grammars::table;

const START: &[(&str, &str, Option<&str>)] = &[
    ("//.*", "comment", None),
    ("/\\*", "comment", Some("comment")),
    ("\"(?:[^\"\\\\]|\\\\.)*\"", "string", None),
    ("'(?:[^'\\\\]|\\\\.)'", "string", None),
    ("^\\s*#\\s*\\w+", "keyword", None),
    (
        "\\b(?:class|struct|enum|template|typename|namespace|using|return|if|else|for|while|do|switch|case|default|break|continue|new|delete|try|catch|throw|public|private|protected|virtual|override|operator|sizeof|this|typedef|friend|explicit|inline)\\b",
        "keyword",
        None,
    ),
    (
        "\\b(?:void|bool|char|wchar_t|int|short|long|float|double|unsigned|signed|auto|const|static|extern|volatile|size_t)\\b",
        "storage.type",
        None,
    ),
    (
        "\\b\\d+(?:\\.\\d+)?(?:[eE][+-]?\\d+)?[fFlLuU]*\\b",
        "constant.numeric",
        None,
    ),
    ("\\b(?:true|false|nullptr|NULL)\\b", "constant.language", None),
    ("[a-zA-Z_]\\w*", "identifier", None),
    ("[-+*/%!=<>&|^~?:]+", "keyword.operator", None),
    ("[(){}\\[\\],;.]", "punctuation", None),
];

const COMMENT: &[(&str, &str, Option<&str>)] = &[
    (".*?\\*/", "comment", Some(START_STATE)),
    (".+", "comment", None),
];

static TEMPLATE: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::from_states(vec![
        (START_STATE, table(START)),
        ("comment", table(COMMENT)),
    ])
    .expect("cpp states are unique")
});

/// A fresh, independent copy of the C++ rule set.
pub fn rules() -> RuleSet {
    TEMPLATE.clone()
}
