//! Filter conditions
//!
//! Conditions travel as plain strings between producers and consumers, so an
//! unknown string has to survive a round trip rather than fail to parse. The
//! engine skips any condition it does not recognize.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator a filter applies
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    /// No condition (the reset state, serialized as `""`)
    #[default]
    Unset,
    /// Field loosely equals the value
    Match,
    /// Field does not loosely equal the value
    IsNot,
    /// Case-insensitive substring test on text fields
    Includes,
    /// Any other condition string; skipped during evaluation
    Unrecognized(String),
}

impl Condition {
    /// Conditions the engine knows how to evaluate
    pub const RECOGNIZED: [Condition; 3] = [Self::Match, Self::IsNot, Self::Includes];

    /// String tag for this condition
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::Match => "match",
            Self::IsNot => "is-not",
            Self::Includes => "includes",
            Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether the engine evaluates this condition
    #[inline]
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Match | Self::IsNot | Self::Includes)
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        match raw {
            "" => Self::Unset,
            "match" => Self::Match,
            "is-not" => Self::IsNot,
            "includes" => Self::Includes,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        match Self::from(raw.as_str()) {
            Self::Unrecognized(_) => Self::Unrecognized(raw),
            known => known,
        }
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        match condition {
            Condition::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!(Condition::from("match"), Condition::Match);
        assert_eq!(Condition::from("is-not"), Condition::IsNot);
        assert_eq!(Condition::from("includes"), Condition::Includes);
        assert_eq!(Condition::from(""), Condition::Unset);
    }

    #[test]
    fn keeps_unknown_text() {
        let condition = Condition::from("starts-with");
        assert_eq!(condition, Condition::Unrecognized("starts-with".to_string()));
        assert_eq!(condition.as_str(), "starts-with");
        assert!(!condition.is_recognized());
    }

    #[test]
    fn tags_are_case_sensitive() {
        assert!(!Condition::from("MATCH").is_recognized());
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Condition::IsNot).unwrap();
        assert_eq!(json, "\"is-not\"");
        let parsed: Condition = serde_json::from_str("\"\"").unwrap();
        assert_eq!(parsed, Condition::Unset);
    }

    #[test]
    fn recognized_set() {
        assert!(Condition::RECOGNIZED.iter().all(Condition::is_recognized));
        assert!(!Condition::Unset.is_recognized());
    }
}
