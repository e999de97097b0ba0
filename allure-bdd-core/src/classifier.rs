//! # Tag Classifier
//!
//! Turns the free-form tags of a feature and a scenario into report labels and
//! links. Every tag receives exactly one classification: the first rule in
//! [`RuleKind::PRIORITY`] that matches wins, and a tag no rule claims becomes a
//! plain `tag` label.
//!
//! ```text
//! scenario tags ++ feature tags
//!            |
//!            v
//!   case-insensitive dedup (first seen wins)
//!            |
//!            v
//!   link > issue > tms > parentSuite > suite > subSuite > epic > story
//!   > package > testClass > testMethod > owner > severity > label > tag
//! ```

use itertools::Itertools;
use tracing::*;

use crate::{
    config::PluginConfig,
    matcher::Matcher,
    model::{Label, Link, Severity},
};

/// Category of a classification rule.
#[derive(Debug, Clone, Copy, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum RuleKind {
    Link,
    Issue,
    Tms,
    ParentSuite,
    Suite,
    SubSuite,
    Epic,
    Story,
    Package,
    TestClass,
    TestMethod,
    Owner,
    Severity,
    Label,
}

impl RuleKind {
    /// Evaluation order. More specific facets come before the generic label rule.
    pub const PRIORITY: [RuleKind; 14] = [
        RuleKind::Link,
        RuleKind::Issue,
        RuleKind::Tms,
        RuleKind::ParentSuite,
        RuleKind::Suite,
        RuleKind::SubSuite,
        RuleKind::Epic,
        RuleKind::Story,
        RuleKind::Package,
        RuleKind::TestClass,
        RuleKind::TestMethod,
        RuleKind::Owner,
        RuleKind::Severity,
        RuleKind::Label,
    ];

    fn pattern(self, cfg: &PluginConfig) -> Option<&str> {
        let pattern = match self {
            RuleKind::Link => &cfg.links.link,
            RuleKind::Issue => &cfg.links.issue,
            RuleKind::Tms => &cfg.links.tms,
            RuleKind::ParentSuite => &cfg.grouping.suites.parent_suite,
            RuleKind::Suite => &cfg.grouping.suites.suite,
            RuleKind::SubSuite => &cfg.grouping.suites.sub_suite,
            RuleKind::Epic => &cfg.grouping.behaviors.epic,
            RuleKind::Story => &cfg.grouping.behaviors.story,
            RuleKind::Package => &cfg.grouping.packages.package,
            RuleKind::TestClass => &cfg.grouping.packages.test_class,
            RuleKind::TestMethod => &cfg.grouping.packages.test_method,
            RuleKind::Owner => &cfg.labels.owner,
            RuleKind::Severity => &cfg.labels.severity,
            RuleKind::Label => &cfg.labels.label,
        };
        pattern.as_deref()
    }
}

/// Result of classifying one tag.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Classification {
    Label(Label),
    Link(Link),
}

#[derive(Debug, Clone)]
struct Rule {
    kind: RuleKind,
    matcher: Matcher,
}

impl Rule {
    fn apply(&self, tag: &str) -> Option<Classification> {
        use Classification as C;

        let single = || self.matcher.single_value(tag);
        match self.kind {
            RuleKind::Link => single().map(|v| C::Link(Link::new(v.clone(), v))),
            RuleKind::Issue => single().map(|v| C::Link(Link::issue(v.clone(), v))),
            RuleKind::Tms => single().map(|v| C::Link(Link::tms(v.clone(), v))),
            RuleKind::ParentSuite => single().map(|v| C::Label(Label::parent_suite(v))),
            RuleKind::Suite => single().map(|v| C::Label(Label::suite(v))),
            RuleKind::SubSuite => single().map(|v| C::Label(Label::sub_suite(v))),
            RuleKind::Epic => single().map(|v| C::Label(Label::epic(v))),
            RuleKind::Story => single().map(|v| C::Label(Label::story(v))),
            RuleKind::Package => single().map(|v| C::Label(Label::package(v))),
            RuleKind::TestClass => single().map(|v| C::Label(Label::test_class(v))),
            RuleKind::TestMethod => single().map(|v| C::Label(Label::test_method(v))),
            RuleKind::Owner => single().map(|v| C::Label(Label::owner(v))),
            // An unknown severity name falls through to the next rule.
            RuleKind::Severity => single()
                .and_then(|v| v.parse::<Severity>().ok())
                .map(|level| C::Label(Label::severity(level))),
            RuleKind::Label => self
                .matcher
                .key_value(tag)
                .map(|(name, value)| C::Label(Label::new(name, value))),
        }
    }
}

/// Labels and links produced for one scenario, in tag order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Classified {
    pub labels: Vec<Label>,
    pub links: Vec<Link>,
}

/// Rule table compiled from [`PluginConfig`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn new(cfg: &PluginConfig) -> Classifier {
        let rules = RuleKind::PRIORITY
            .iter()
            .map(|&kind| Rule {
                kind,
                matcher: kind.pattern(cfg).map(Matcher::new).unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        debug!(
            "classification rules enabled: [{}]",
            rules
                .iter()
                .filter(|rule| rule.matcher.is_enabled())
                .map(|rule| rule.kind)
                .join(", ")
        );

        Classifier { rules }
    }

    /// Classify a single tag. Never fails; unclaimed tags become plain tag labels.
    pub fn classify_tag(&self, tag: &str) -> Classification {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(tag))
            .unwrap_or_else(|| Classification::Label(Label::tag(tag)))
    }

    /// Classify the union of scenario and feature tags.
    pub fn classify<F, S>(&self, feature_tags: F, scenario_tags: S) -> Classified
    where
        F: IntoIterator,
        F::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let mut classified = Classified::default();

        for tag in dedup_tags(feature_tags, scenario_tags) {
            match self.classify_tag(&tag) {
                Classification::Label(label) => classified.labels.push(label),
                Classification::Link(link) => classified.links.push(link),
            }
        }

        classified
    }
}

/// Scenario tags followed by feature tags, deduplicated case-insensitively.
/// The first spelling seen is kept.
pub fn dedup_tags<F, S>(feature_tags: F, scenario_tags: S) -> Vec<String>
where
    F: IntoIterator,
    F::Item: AsRef<str>,
    S: IntoIterator,
    S::Item: AsRef<str>,
{
    scenario_tags
        .into_iter()
        .map(|tag| tag.as_ref().to_string())
        .chain(feature_tags.into_iter().map(|tag| tag.as_ref().to_string()))
        .unique_by(|tag| tag.to_lowercase())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use test_case::test_case;

    fn classifier(json: &str) -> Classifier {
        Classifier::new(&Config::from_json(json).unwrap().bdd)
    }

    fn full() -> Classifier {
        classifier(
            r#"{"bdd": {
                "links": { "link": "^link:(.+)", "issue": "JIRA-\\d+", "tms": "^tms:(.+)" },
                "grouping": {
                    "suites": { "parentSuite": "^parentSuite:(.+)", "suite": "^suite:(.+)", "subSuite": "^subSuite:(.+)" },
                    "behaviors": { "epic": "^epic:(.+)", "story": "^story:(.+)" },
                    "packages": { "package": "^package:(.+)", "testClass": "^class:(.+)", "testMethod": "^method:(.+)" }
                },
                "labels": { "owner": "^owner:(.+)", "severity": "^severity:(.+)", "label": "^(\\w+):(.+)" }
            }}"#,
        )
    }

    #[test_case("link:https://example.com" => Classification::Link(Link::new("https://example.com", "https://example.com")))]
    #[test_case("JIRA-42" => Classification::Link(Link::issue("JIRA-42", "JIRA-42")))]
    #[test_case("tms:TC-7" => Classification::Link(Link::tms("TC-7", "TC-7")))]
    #[test_case("parentSuite:Web" => Classification::Label(Label::parent_suite("Web")))]
    #[test_case("suite:Payments" => Classification::Label(Label::suite("Payments")))]
    #[test_case("subSuite:Cards" => Classification::Label(Label::sub_suite("Cards")))]
    #[test_case("epic:Checkout" => Classification::Label(Label::epic("Checkout")))]
    #[test_case("story:Pay by card" => Classification::Label(Label::story("Pay by card")))]
    #[test_case("package:shop.web" => Classification::Label(Label::package("shop.web")))]
    #[test_case("class:CheckoutSteps" => Classification::Label(Label::test_class("CheckoutSteps")))]
    #[test_case("method:pay" => Classification::Label(Label::test_method("pay")))]
    #[test_case("owner:alice" => Classification::Label(Label::owner("alice")))]
    #[test_case("severity:critical" => Classification::Label(Label::severity(Severity::Critical)))]
    #[test_case("layer:web" => Classification::Label(Label::new("layer", "web")))]
    #[test_case("smoke" => Classification::Label(Label::tag("smoke")))]
    fn each_rule_kind(tag: &str) -> Classification {
        full().classify_tag(tag)
    }

    #[test]
    fn suite_wins_over_generic_label() {
        // "suite:Payments" also matches the generic "(\w+):(.+)" label rule.
        assert_eq!(
            full().classify_tag("suite:Payments"),
            Classification::Label(Label::suite("Payments"))
        );
    }

    #[test]
    fn invalid_severity_falls_through_to_label() {
        assert_eq!(
            full().classify_tag("severity:urgent"),
            Classification::Label(Label::new("severity", "urgent"))
        );
    }

    #[test]
    fn invalid_severity_falls_through_to_tag() {
        let classifier = classifier(r#"{"bdd": {"labels": {"severity": "severity:(.+)"}}}"#);
        assert_eq!(
            classifier.classify_tag("severity:urgent"),
            Classification::Label(Label::tag("severity:urgent"))
        );
    }

    #[test]
    fn label_rule_needs_two_captures() {
        let classifier = classifier(r#"{"bdd": {"labels": {"label": "^layer:(.+)"}}}"#);
        assert_eq!(
            classifier.classify_tag("layer:web"),
            Classification::Label(Label::tag("layer:web"))
        );
    }

    #[test]
    fn severity_is_case_sensitive() {
        let classifier = classifier(r#"{"bdd": {"labels": {"severity": "severity:(.+)"}}}"#);
        assert_eq!(
            classifier.classify_tag("severity:Critical"),
            Classification::Label(Label::tag("severity:Critical"))
        );
    }

    #[test]
    fn malformed_rule_is_skipped() {
        let classifier = classifier(
            r#"{"bdd": {
                "grouping": { "suites": { "suite": "suite:(.+" } },
                "labels": { "label": "(\\w+):(.+)" }
            }}"#,
        );
        assert_eq!(
            classifier.classify_tag("suite:Payments"),
            Classification::Label(Label::new("suite", "Payments"))
        );
        assert_eq!(
            classifier.classify_tag("smoke"),
            Classification::Label(Label::tag("smoke"))
        );
    }

    #[test]
    fn no_rules_yields_plain_tags() {
        let classified = classifier("{}").classify(["Feature"], ["smoke", "JIRA-1"]);
        assert_eq!(
            classified,
            Classified {
                labels: vec![Label::tag("smoke"), Label::tag("JIRA-1"), Label::tag("Feature")],
                links: vec![],
            }
        );
    }

    #[test]
    fn dedup_is_case_insensitive_and_keeps_first_seen() {
        assert_eq!(
            dedup_tags(["Smoke", "epic:Checkout"], ["smoke", "owner:alice", "SMOKE"]),
            vec!["smoke", "owner:alice", "epic:Checkout"]
        );
    }

    #[test]
    fn every_tag_has_exactly_one_outcome() {
        let classified = full().classify(
            ["epic:Checkout", "smoke"],
            ["JIRA-1", "suite:Web", "severity:urgent", "smoke"],
        );
        assert_eq!(classified.labels.len() + classified.links.len(), 5);
    }

    #[test]
    fn end_to_end_checkout_scenario() {
        let classifier = classifier(
            r#"{"bdd": {
                "links": { "issue": "JIRA-\\d+" },
                "grouping": { "behaviors": { "epic": "epic:(.+)" } },
                "labels": { "owner": "owner:(.+)", "severity": "severity:(.+)" }
            }}"#,
        );

        let classified = classifier.classify(
            ["epic:Checkout"],
            ["severity:critical", "owner:alice", "JIRA-42"],
        );

        assert_eq!(
            classified.labels,
            vec![
                Label::severity(Severity::Critical),
                Label::owner("alice"),
                Label::epic("Checkout"),
            ]
        );
        assert_eq!(classified.links, vec![Link::issue("JIRA-42", "JIRA-42")]);
    }
}
