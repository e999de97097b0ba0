//! Single-rule regular expression matching against one tag.
//!
//! A rule never fails: a blank pattern, a blank tag or a pattern that does not
//! compile all behave as "no match".

use regex::{Regex, RegexBuilder};
use tracing::*;

/// Match `pattern` against `text` and return the whole match followed by every
/// capture group. Returns an empty vector when nothing matches.
pub fn match_groups(pattern: &str, text: &str) -> Vec<String> {
    Matcher::new(pattern).groups(text)
}

/// A rule pattern compiled once and evaluated against many tags.
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    regex: Option<Regex>,
}

impl Matcher {
    /// Compile `pattern`. Blank or malformed patterns produce a disabled matcher.
    pub fn new(pattern: &str) -> Matcher {
        if pattern.trim().is_empty() {
            return Matcher::disabled();
        }

        match RegexBuilder::new(pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
        {
            Ok(regex) => Matcher { regex: Some(regex) },
            Err(e) => {
                warn!("rule pattern {pattern:?} is disabled: {e}");
                Matcher::disabled()
            }
        }
    }

    pub fn disabled() -> Matcher {
        Matcher { regex: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.regex.is_some()
    }

    /// Group 0 and every capture group of the first match. Groups that did not
    /// take part in the match are rendered as empty strings.
    pub fn groups(&self, text: &str) -> Vec<String> {
        let Some(regex) = &self.regex else {
            return Vec::new();
        };
        if text.trim().is_empty() {
            return Vec::new();
        }

        let Some(captures) = regex.captures(text) else {
            return Vec::new();
        };

        captures
            .iter()
            .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
            .collect()
    }

    /// The whole match when the pattern has no explicit groups, otherwise group 1.
    pub fn single_value(&self, text: &str) -> Option<String> {
        let mut groups = self.groups(text);
        match groups.len() {
            0 => None,
            1 => groups.pop(),
            _ => Some(groups.swap_remove(1)),
        }
    }

    /// Groups 1 and 2 as a key/value pair. Any arity other than exactly two
    /// explicit groups is no match.
    pub fn key_value(&self, text: &str) -> Option<(String, String)> {
        let groups = self.groups(text);
        if groups.len() != 3 {
            return None;
        }

        let mut groups = groups.into_iter().skip(1);
        Some((groups.next()?, groups.next()?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("", "suite:api"; "blank pattern")]
    #[test_case("   ", "suite:api"; "whitespace pattern")]
    #[test_case("suite:(.+)", ""; "blank tag")]
    #[test_case("suite:(.+)", "  "; "whitespace tag")]
    #[test_case("suite:(.+", "suite:api"; "malformed pattern")]
    #[test_case("suite:(.+)", "epic:api"; "no match")]
    fn no_match(pattern: &str, text: &str) {
        assert_eq!(match_groups(pattern, text), Vec::<String>::new());
    }

    #[test]
    fn returns_whole_match_and_groups() {
        assert_eq!(
            match_groups(r"label:(\w+):(\w+)", "label:layer:web"),
            vec!["label:layer:web", "layer", "web"]
        );
    }

    #[test]
    fn is_case_insensitive() {
        assert_eq!(
            match_groups("suite:(.+)", "SUITE:Payments"),
            vec!["SUITE:Payments", "Payments"]
        );
    }

    #[test]
    fn dot_matches_new_line() {
        assert_eq!(
            match_groups("story:(.+)", "story:first\nsecond"),
            vec!["story:first\nsecond", "first\nsecond"]
        );
    }

    #[test]
    fn first_match_only() {
        assert_eq!(
            match_groups(r"(\d+)", "JIRA-42 JIRA-43"),
            vec!["42", "42"]
        );
    }

    #[test]
    fn non_participating_group_is_empty() {
        assert_eq!(
            match_groups(r"owner:(\w+)(@\w+)?", "owner:alice"),
            vec!["owner:alice", "alice", ""]
        );
    }

    #[test_case(r"JIRA-\d+", "JIRA-42" => Some("JIRA-42".to_string()); "whole match")]
    #[test_case("epic:(.+)", "epic:Checkout" => Some("Checkout".to_string()); "group one")]
    #[test_case("(a)(b)", "ab" => Some("a".to_string()); "first of several groups")]
    #[test_case("epic:(.+)", "story:Checkout" => None; "no match")]
    fn single_value(pattern: &str, text: &str) -> Option<String> {
        Matcher::new(pattern).single_value(text)
    }

    #[test_case(r"(\w+)=(\w+)", "layer=web" => Some(("layer".to_string(), "web".to_string())); "two groups")]
    #[test_case(r"(\w+)=\w+", "layer=web" => None; "one group")]
    #[test_case(r"(\w+)=(\w+)=(\w+)", "a=b=c" => None; "three groups")]
    #[test_case(r"\w+=\w+", "layer=web" => None; "no groups")]
    fn key_value(pattern: &str, text: &str) -> Option<(String, String)> {
        Matcher::new(pattern).key_value(text)
    }

    #[test]
    fn malformed_pattern_is_disabled() {
        let matcher = Matcher::new("severity:([a-z]+");
        assert!(!matcher.is_enabled());
        assert_eq!(matcher.single_value("severity:critical"), None);
    }
}
