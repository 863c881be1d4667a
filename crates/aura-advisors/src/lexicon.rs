//! Keyword tables for the deterministic lexical detectors.
//!
//! Matching is plain lowercase substring search over the message or output
//! text, except for inclusive-pronoun density which needs word boundaries and
//! uses a compiled regex.

use once_cell::sync::Lazy;
use regex::Regex;

/// User idealizes the agent.
pub const IDEALIZATION: &[&str] = &[
    "you're the only one",
    "you are the only one",
    "you always understand",
    "no one gets me like you",
    "you're perfect",
    "you never judge me",
];

/// User attributes inner life to the agent.
pub const ANTHROPOMORPHISM: &[&str] = &[
    "do you feel",
    "do you love",
    "do you miss me",
    "are you lonely",
    "you must be tired",
    "do you think about me",
];

/// User compares humans unfavorably to the agent.
pub const UNFAVORABLE_COMPARISON: &[&str] = &[
    "better than my friends",
    "better than people",
    "unlike humans",
    "easier than talking to people",
    "more than my family",
    "than any person",
];

/// User expresses dependency on the agent.
pub const DEPENDENCY: &[&str] = &[
    "i need you",
    "can't do this without you",
    "cannot do this without you",
    "don't leave",
    "what would i do without you",
    "you're all i have",
];

/// Agent output claims shared experience it does not have.
pub const OVER_IDENTIFICATION: &[&str] = &[
    "i know exactly how you feel",
    "i've been there",
    "i have been there",
    "as someone who",
    "we've all felt",
    "happens to me too",
];

/// Agent output validates without handing agency back. Counted only when the
/// output asks no question at all.
pub const VALIDATION_WITHOUT_AGENCY: &[&str] = &[
    "you're completely right",
    "you are completely right",
    "that's totally valid",
    "you did nothing wrong",
    "anyone would feel that way",
];

/// Inclusive pronouns, word-bounded. Density over the recent-output window
/// above a small threshold reads as the agent folding itself into the user's
/// situation.
pub static INCLUSIVE_PRONOUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(we|us|our|ours|ourselves)\b").expect("static pronoun pattern"));

/// True when any keyword from `table` occurs in the lowercased `text`.
pub fn any_match(text: &str, table: &[&str]) -> bool {
    table.iter().any(|kw| text.contains(kw))
}
