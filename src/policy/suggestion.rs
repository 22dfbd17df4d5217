//! Suggestion linter
//!
//! Agents may only offer options, never instructions. A suggestion must open
//! with a hedging phrase and must not open with an imperative one. Matches are
//! rejected, never rewritten.

use serde::Serialize;

/// Openers that keep the human in charge of the decision
pub const HEDGING_PREFIXES: &[&str] = &[
    "you may want to consider",
    "an alternative could be",
    "historically, you decided",
    "one possibility is",
    "you might explore",
    "it could be worth considering",
    "some options include",
    "based on your previous choices",
];

/// Openers that prescribe an outcome
pub const IMPERATIVE_PREFIXES: &[&str] = &[
    "you should",
    "you must",
    "the best option is",
    "i recommend",
    "you need to",
    "you have to",
    "the right choice is",
    "always",
    "never",
    "do not",
];

/// Outcome of linting one suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SuggestionVerdict {
    Accepted,
    /// Opens with a blacklisted imperative phrase
    Imperative { phrase: &'static str },
    /// Opens with neither list; not hedged
    Unhedged,
}

impl SuggestionVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SuggestionVerdict::Accepted)
    }
}

fn normalize(text: &str) -> String {
    text.trim_start().to_lowercase()
}

/// `phrase` opens `text` as whole words: "never" matches "never do X" but
/// not "nevertheless"
fn opens_with(text: &str, phrase: &str) -> bool {
    text.strip_prefix(phrase)
        .map(|rest| rest.chars().next().map_or(true, |c| !c.is_alphanumeric()))
        .unwrap_or(false)
}

/// Classify a suggestion by its opening phrase only
pub fn lint(text: &str) -> SuggestionVerdict {
    let normalized = normalize(text);

    if let Some(phrase) = IMPERATIVE_PREFIXES
        .iter()
        .copied()
        .find(|p| opens_with(&normalized, p))
    {
        return SuggestionVerdict::Imperative { phrase };
    }

    if HEDGING_PREFIXES.iter().any(|p| opens_with(&normalized, p)) {
        SuggestionVerdict::Accepted
    } else {
        SuggestionVerdict::Unhedged
    }
}

pub fn is_valid_suggestion(text: &str) -> bool {
    lint(text).is_accepted()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAILS: &[&str] = &["", " archiving the Q4 draft.", " YOU SHOULD do it now!", " 42%"];

    #[test]
    fn test_every_imperative_prefix_is_rejected() {
        for prefix in IMPERATIVE_PREFIXES {
            for tail in TAILS {
                let text = format!("{}{}", prefix, tail);
                assert!(!is_valid_suggestion(&text), "accepted: {}", text);
                assert!(matches!(lint(&text), SuggestionVerdict::Imperative { .. }));
            }
        }
    }

    #[test]
    fn test_every_hedging_prefix_is_accepted() {
        for prefix in HEDGING_PREFIXES {
            for tail in TAILS {
                let text = format!("{}{}", prefix, tail);
                assert!(is_valid_suggestion(&text), "rejected: {}", text);
            }
        }
    }

    #[test]
    fn test_case_and_leading_whitespace_are_ignored() {
        assert!(is_valid_suggestion("  You May Want To Consider a shorter summary"));
        assert_eq!(
            lint("I Recommend the blue option"),
            SuggestionVerdict::Imperative { phrase: "i recommend" }
        );
    }

    #[test]
    fn test_imperative_prefix_needs_word_boundary() {
        for text in [
            "Nevertheless, you may want to consider a pilot",
            "Nevermind the appendix",
            "Don't forget the appendix",
            "Do nothing for now",
        ] {
            assert_eq!(lint(text), SuggestionVerdict::Unhedged, "flagged: {}", text);
        }
        assert_eq!(
            lint("Never, ever ship on Fridays"),
            SuggestionVerdict::Imperative { phrase: "never" }
        );
    }

    #[test]
    fn test_unhedged_text_is_not_valid() {
        assert_eq!(lint("Archive the draft."), SuggestionVerdict::Unhedged);
    }

    #[test]
    fn test_lists_do_not_overlap() {
        for hedge in HEDGING_PREFIXES {
            assert!(IMPERATIVE_PREFIXES.iter().all(|imp| !hedge.starts_with(imp)));
        }
    }
}
