//! Metadata delivered by the test runner and the owned state handles the
//! lifecycle tracker keeps per feature and per scenario.
//!
//! A [`FeatureContext`] is shared by every scenario of one feature, possibly
//! across worker threads, so its container slot sits behind a lock owned by
//! that feature alone. A [`ScenarioContext`] belongs to exactly one running
//! scenario and is only ever borrowed mutably.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{identity, model::TestResultContainer};

/// Title given to scenarios the runner did not describe.
pub const UNKNOWN_SCENARIO: &str = "Unknown";

/// Split raw tag text such as `"@smoke @epic:Checkout"` into tags without the
/// leading `@`.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(|tag| tag.trim_start_matches('@'))
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct FeatureInfo {
    pub culture: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl FeatureInfo {
    pub fn new<I>(
        culture: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: I,
    ) -> FeatureInfo
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        FeatureInfo {
            culture: culture.into(),
            title: title.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Sentinel used when the runner supplies no feature.
    pub fn empty() -> FeatureInfo {
        FeatureInfo::default()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScenarioInfo {
    pub title: String,
    pub tags: Vec<String>,
    /// Bound arguments in binding order.
    pub arguments: Vec<(String, String)>,
}

impl ScenarioInfo {
    pub fn new<I>(title: impl Into<String>, tags: I) -> ScenarioInfo
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        ScenarioInfo {
            title: title.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.push((key.into(), value.into()));
        self
    }

    /// Sentinel used when the runner supplies no scenario.
    pub fn empty() -> ScenarioInfo {
        ScenarioInfo::new(UNKNOWN_SCENARIO, Vec::<String>::new())
    }
}

impl Default for ScenarioInfo {
    fn default() -> Self {
        ScenarioInfo::empty()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, strum::Display)]
pub enum HookKind {
    BeforeFeature,
    AfterFeature,
    BeforeScenario,
    AfterScenario,
    BeforeStep,
    AfterStep,
}

impl HookKind {
    pub fn is_before(self) -> bool {
        matches!(
            self,
            HookKind::BeforeFeature | HookKind::BeforeScenario | HookKind::BeforeStep
        )
    }
}

/// A before/after hook binding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HookInfo {
    pub kind: HookKind,
    /// Declared method name of the hook.
    pub method: String,
    /// Rank among hooks of the same kind.
    pub order: i32,
}

impl HookInfo {
    pub fn new(kind: HookKind, method: impl Into<String>, order: i32) -> HookInfo {
        HookInfo {
            kind,
            method: method.into(),
            order,
        }
    }

    /// `"<method> [<order>]"`
    pub fn fixture_name(&self) -> String {
        format!("{} [{}]", self.method, self.order)
    }
}

#[derive(Debug)]
pub(crate) enum ContainerSlot {
    Vacant,
    Started(TestResultContainer),
    Finished,
}

/// State shared by all scenarios of one feature.
#[derive(Debug)]
pub struct FeatureContext {
    info: FeatureInfo,
    container_id: String,
    slot: Mutex<ContainerSlot>,
}

impl FeatureContext {
    pub fn new(info: FeatureInfo) -> FeatureContext {
        FeatureContext {
            container_id: identity::feature_container_id(Some(&info)),
            info,
            slot: Mutex::new(ContainerSlot::Vacant),
        }
    }

    /// Context for scenarios that arrive without a feature.
    pub fn empty() -> FeatureContext {
        FeatureContext::new(FeatureInfo::empty())
    }

    pub fn info(&self) -> &FeatureInfo {
        &self.info
    }

    /// Content-derived id under which the feature's container is registered.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// uuid of the running container, if one has been started and not finished.
    pub fn container_uuid(&self) -> Option<String> {
        match &*self.slot() {
            ContainerSlot::Started(container) => Some(container.uuid.clone()),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(*self.slot(), ContainerSlot::Finished)
    }

    /// Poisoning is ignored; the slot holds plain data.
    pub(crate) fn slot(&self) -> MutexGuard<'_, ContainerSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FeatureContext {
    fn default() -> Self {
        FeatureContext::empty()
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, strum::Display)]
pub enum ScenarioState {
    #[default]
    NoContainer,
    ContainerStarted,
    TestStarted,
    TestFinished,
}

/// State owned by one running scenario.
#[derive(Debug, Default)]
pub struct ScenarioContext {
    pub(crate) info: ScenarioInfo,
    pub(crate) state: ScenarioState,
    pub(crate) container_uuid: Option<String>,
    pub(crate) result: Option<crate::model::TestResult>,
}

impl ScenarioContext {
    pub fn new(info: ScenarioInfo) -> ScenarioContext {
        ScenarioContext {
            info,
            ..Default::default()
        }
    }

    pub fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// The running test result. `None` before the scenario starts and after it
    /// has been handed to the backend.
    pub fn test_result(&self) -> Option<&crate::model::TestResult> {
        self.result.as_ref()
    }
}
