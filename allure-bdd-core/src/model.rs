//! # Report Model
//!
//! The Allure 2 result model produced by the lifecycle tracker. Every type
//! serializes into the camelCase JSON the Allure report generator reads from
//! the results directory.

use serde::Serialize;

/// Milliseconds since the unix epoch, the time unit of every Allure timestamp.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Allure severity levels.
///
/// Parsing is case-sensitive and only accepts the lowercase names, so
/// `"critical".parse::<Severity>()` succeeds while `"Critical"` does not.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocker,
    Critical,
    Normal,
    Minor,
    Trivial,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Broken,
    #[default]
    Skipped,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Scheduled,
    Running,
    Finished,
    Pending,
    Interrupted,
}

/// One report facet attached to a test result.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Label {
        Label {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Identifies the process and thread that executed the scenario.
    pub fn thread() -> Label {
        let current = std::thread::current();
        let value = match current.name() {
            Some(name) => format!("{}.{:?}({name})", std::process::id(), current.id()),
            None => format!("{}.{:?}", std::process::id(), current.id()),
        };
        Label::new("thread", value)
    }

    /// Host label carrying the machine name.
    pub fn host() -> Label {
        Label::new("host", machine_name())
    }

    /// Host label carrying an explicit value, e.g. the configured report title.
    pub fn host_named(name: impl Into<String>) -> Label {
        Label::new("host", name)
    }

    pub fn feature(value: impl Into<String>) -> Label {
        Label::new("feature", value)
    }

    pub fn parent_suite(value: impl Into<String>) -> Label {
        Label::new("parentSuite", value)
    }

    pub fn suite(value: impl Into<String>) -> Label {
        Label::new("suite", value)
    }

    pub fn sub_suite(value: impl Into<String>) -> Label {
        Label::new("subSuite", value)
    }

    pub fn epic(value: impl Into<String>) -> Label {
        Label::new("epic", value)
    }

    pub fn story(value: impl Into<String>) -> Label {
        Label::new("story", value)
    }

    pub fn package(value: impl Into<String>) -> Label {
        Label::new("package", value)
    }

    pub fn test_class(value: impl Into<String>) -> Label {
        Label::new("testClass", value)
    }

    pub fn test_method(value: impl Into<String>) -> Label {
        Label::new("testMethod", value)
    }

    pub fn owner(value: impl Into<String>) -> Label {
        Label::new("owner", value)
    }

    pub fn severity(level: Severity) -> Label {
        Label::new("severity", level.to_string())
    }

    pub fn tag(value: impl Into<String>) -> Label {
        Label::new("tag", value)
    }
}

fn machine_name() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string())
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Issue,
    Tms,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct Link {
    pub name: String,
    pub url: String,
    /// `None` is a generic link.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
}

impl Link {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Link {
        Link {
            name: name.into(),
            url: url.into(),
            link_type: None,
        }
    }

    pub fn issue(name: impl Into<String>, url: impl Into<String>) -> Link {
        Link {
            link_type: Some(LinkType::Issue),
            ..Link::new(name, url)
        }
    }

    pub fn tms(name: impl Into<String>, url: impl Into<String>) -> Link {
        Link {
            link_type: Some(LinkType::Tms),
            ..Link::new(name, url)
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct StatusDetails {
    pub message: String,
    pub trace: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub name: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: Stage,
    pub start: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub uuid: String,
    pub history_id: String,
    pub name: String,
    pub full_name: String,
    pub labels: Vec<Label>,
    pub links: Vec<Link>,
    pub parameters: Vec<Parameter>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: Stage,
    pub steps: Vec<StepResult>,
    pub start: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureResult {
    pub name: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_details: Option<StatusDetails>,
    pub stage: Stage,
    pub start: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultContainer {
    pub uuid: String,
    pub name: String,
    /// uuids of the test results grouped by this container.
    pub children: Vec<String>,
    pub befores: Vec<FixtureResult>,
    pub afters: Vec<FixtureResult>,
    pub start: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<i64>,
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("blocker" => Some(Severity::Blocker))]
    #[test_case("critical" => Some(Severity::Critical))]
    #[test_case("trivial" => Some(Severity::Trivial))]
    #[test_case("Critical" => None; "case sensitive")]
    #[test_case("urgent" => None)]
    fn parse_severity(s: &str) -> Option<Severity> {
        s.parse().ok()
    }

    #[test]
    fn generic_link_omits_type() -> eyre::Result<()> {
        let json = serde_json::to_value(Link::new("docs", "https://example.com"))?;
        assert_eq!(
            json,
            serde_json::json!({"name": "docs", "url": "https://example.com"})
        );

        let json = serde_json::to_value(Link::issue("JIRA-42", "JIRA-42"))?;
        assert_eq!(json["type"], "issue");
        Ok(())
    }

    #[test]
    fn test_result_serializes_in_camel_case() -> eyre::Result<()> {
        let result = TestResult {
            uuid: "abc".into(),
            history_id: "Login42".into(),
            status: Status::Failed,
            status_details: Some(StatusDetails {
                message: "boom".into(),
                trace: "trace".into(),
            }),
            stage: Stage::Finished,
            start: 1,
            stop: Some(2),
            ..Default::default()
        };

        let json = serde_json::to_value(&result)?;
        assert_eq!(json["historyId"], "Login42");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["stage"], "finished");
        assert_eq!(json["statusDetails"]["message"], "boom");
        assert_eq!(json["stop"], 2);
        Ok(())
    }

    #[test]
    fn severity_label_uses_lowercase_name() {
        assert_eq!(
            Label::severity(Severity::Critical),
            Label::new("severity", "critical")
        );
    }
}
