//! Checkpoint message sanitizer
//!
//! Authorization is never framed as a financial negotiation. Any candidate
//! message that mentions money, counts, percentages, time estimates or
//! free/paid tiers is replaced wholesale by a pre-approved default.
//!
//! Pattern matching is best-effort; the gate's API never accepts numeric cost
//! fields in the first place.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenPattern {
    CurrencySymbol,
    BareNumber,
    Percentage,
    TimeEstimate,
    FinancialLanguage,
}

static CURRENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{Sc}").expect("currency pattern is valid"));

static PERCENTAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d\s*%|\bper\s?cent\b").expect("percentage pattern is valid")
});

static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d").expect("number pattern is valid"));

static TIME_ESTIMATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:will take|takes about|estimated time|eta|seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?)\b",
    )
    .expect("time pattern is valid")
});

static FINANCIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:free|paid|pay|payment|premium|upgrade|price|pricing|cost|costs|charge|charged|billing|credits?|tokens?|budget|cheap|expensive)\b",
    )
    .expect("financial pattern is valid")
});

/// Result of sanitizing one candidate message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedMessage {
    pub text: String,
    pub substituted: bool,
    pub matched: Vec<ForbiddenPattern>,
}

/// Every forbidden pattern found in `text`
pub fn scan(text: &str) -> Vec<ForbiddenPattern> {
    let checks: [(&Lazy<Regex>, ForbiddenPattern); 5] = [
        (&CURRENCY, ForbiddenPattern::CurrencySymbol),
        (&BARE_NUMBER, ForbiddenPattern::BareNumber),
        (&PERCENTAGE, ForbiddenPattern::Percentage),
        (&TIME_ESTIMATE, ForbiddenPattern::TimeEstimate),
        (&FINANCIAL, ForbiddenPattern::FinancialLanguage),
    ];

    checks
        .iter()
        .filter(|(re, _)| re.is_match(text))
        .map(|(_, pattern)| *pattern)
        .collect()
}

/// Return `candidate` if it is clean, otherwise `default`
pub fn sanitize(candidate: Option<&str>, default: &str) -> SanitizedMessage {
    let candidate = match candidate.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => c,
        None => {
            return SanitizedMessage {
                text: default.to_string(),
                substituted: false,
                matched: Vec::new(),
            }
        }
    };

    let matched = scan(candidate);
    if matched.is_empty() {
        SanitizedMessage {
            text: candidate.to_string(),
            substituted: false,
            matched,
        }
    } else {
        SanitizedMessage {
            text: default.to_string(),
            substituted: true,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "Would you like to go deeper?";

    #[test]
    fn test_cost_estimate_is_replaced() {
        let result = sanitize(Some("Estimated cost: ~3$"), DEFAULT);
        assert_eq!(result.text, DEFAULT);
        assert!(result.substituted);
        assert!(result.matched.contains(&ForbiddenPattern::CurrencySymbol));
        assert!(result.matched.contains(&ForbiddenPattern::BareNumber));
    }

    #[test]
    fn test_each_forbidden_family_is_detected() {
        let cases = [
            ("Only €5 more", ForbiddenPattern::CurrencySymbol),
            ("Uses 1200 of your allowance", ForbiddenPattern::BareNumber),
            ("You are at 80% of the limit", ForbiddenPattern::Percentage),
            ("This will take a few minutes", ForbiddenPattern::TimeEstimate),
            ("Upgrade to premium to continue", ForbiddenPattern::FinancialLanguage),
            ("This part is free", ForbiddenPattern::FinancialLanguage),
        ];
        for (text, expected) in cases {
            let result = sanitize(Some(text), DEFAULT);
            assert!(result.substituted, "not substituted: {}", text);
            assert!(result.matched.contains(&expected), "{:?} missing for {}", expected, text);
        }
    }

    #[test]
    fn test_clean_message_is_kept() {
        let result = sanitize(Some("Continue exploring the related archives?"), DEFAULT);
        assert_eq!(result.text, "Continue exploring the related archives?");
        assert!(!result.substituted);
    }

    #[test]
    fn test_missing_message_uses_default_without_warning() {
        let result = sanitize(None, DEFAULT);
        assert_eq!(result.text, DEFAULT);
        assert!(!result.substituted);

        let blank = sanitize(Some("   "), DEFAULT);
        assert_eq!(blank.text, DEFAULT);
    }

    #[test]
    fn test_any_currency_symbol_is_replaced() {
        for text in ["Only ₺ more to go deeper", "Settle in ₫ or ₴ later", "A ₪ surcharge applies"] {
            let result = sanitize(Some(text), DEFAULT);
            assert_eq!(result.text, DEFAULT, "kept: {}", text);
            assert_eq!(result.matched, vec![ForbiddenPattern::CurrencySymbol]);
        }
    }
}
