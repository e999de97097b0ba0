//! # Lifecycle Tracker
//!
//! Reacts to the runner's notifications and keeps exactly one running test
//! result per scenario and one container per feature.
//!
//! ```text
//!   ScenarioContext:  NoContainer --> ContainerStarted --> TestStarted --> TestFinished
//!                          |                ^
//!                          v                |
//!   FeatureContext:     Vacant ------> Started(container) -----> Finished
//!                      (per-feature lock, created once)   exit_feature
//! ```
//!
//! Nothing here fails the scenario being reported: backend errors are logged
//! and notifications arriving out of order are ignored with a warning.

use itertools::Itertools;
use tracing::*;

use crate::{
    backend::Backend,
    classifier::Classifier,
    config::Config,
    context::{ContainerSlot, FeatureContext, HookInfo, ScenarioContext, ScenarioState},
    digest::digest,
    failure::Outcome,
    identity,
    model::{
        now_millis, FixtureResult, Label, Stage, StepResult, TestResult, TestResultContainer,
    },
};

pub struct Tracker<B> {
    classifier: Classifier,
    host: Label,
    backend: B,
    /// Container shared by scenarios reported without a feature.
    orphans: FeatureContext,
}

impl<B: Backend> Tracker<B> {
    pub fn new(cfg: &Config, backend: B) -> Tracker<B> {
        let host = match cfg.allure.title() {
            Some(title) => Label::host_named(title),
            None => Label::host(),
        };

        Tracker {
            classifier: Classifier::new(&cfg.bdd),
            host,
            backend,
            orphans: FeatureContext::empty(),
        }
    }

    /// Tracker using the process-wide configuration.
    pub fn from_config(backend: B) -> Tracker<B> {
        Tracker::new(crate::get_config(), backend)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    fn feature_or_orphans<'a>(&'a self, feature: Option<&'a FeatureContext>) -> &'a FeatureContext {
        feature.unwrap_or(&self.orphans)
    }

    /// Start the feature's container unless it already runs. Returns the
    /// container uuid, or `None` once the feature has been exited.
    pub fn enter_feature(&self, feature: &FeatureContext) -> Option<String> {
        let mut slot = feature.slot();
        match &*slot {
            ContainerSlot::Started(container) => Some(container.uuid.clone()),
            ContainerSlot::Finished => {
                warn!(
                    "feature \"{}\" has already finished; no container is started",
                    feature.info().title
                );
                None
            }
            ContainerSlot::Vacant => {
                let container = TestResultContainer {
                    uuid: identity::new_id(),
                    name: feature.info().title.clone(),
                    start: now_millis(),
                    ..Default::default()
                };
                debug!(
                    "container {} started for feature \"{}\" ({})",
                    container.uuid,
                    feature.info().title,
                    feature.container_id()
                );

                if let Err(e) = self
                    .backend
                    .start_test_container(feature.container_id(), &container)
                {
                    error!("failed to start test container: {e:#}");
                }

                let uuid = container.uuid.clone();
                *slot = ContainerSlot::Started(container);
                Some(uuid)
            }
        }
    }

    /// Create the scenario's test result and register it with the backend.
    pub fn start_scenario<'s>(
        &self,
        feature: Option<&FeatureContext>,
        scenario: &'s mut ScenarioContext,
    ) -> Option<&'s TestResult> {
        if scenario.state != ScenarioState::NoContainer {
            warn!(
                "scenario \"{}\" has already been started ({})",
                scenario.info.title, scenario.state
            );
            return scenario.result.as_ref();
        }

        let feature = self.feature_or_orphans(feature);
        let container_uuid = self.enter_feature(feature);
        scenario.container_uuid = container_uuid.clone();
        scenario.state = ScenarioState::ContainerStarted;

        let result = self.build_test_result(feature, scenario);
        debug!(
            "test case {} started for scenario \"{}\"",
            result.uuid, result.name
        );

        let container_key = container_uuid.as_deref().unwrap_or(feature.container_id());
        if let Err(e) = self.backend.start_test_case(container_key, &result) {
            error!("failed to start test case: {e:#}");
        }

        if let ContainerSlot::Started(container) = &mut *feature.slot() {
            container.children.push(result.uuid.clone());
        }

        scenario.state = ScenarioState::TestStarted;
        scenario.result = Some(result);
        scenario.result.as_ref()
    }

    fn build_test_result(&self, feature: &FeatureContext, scenario: &ScenarioContext) -> TestResult {
        let feature_info = feature.info();
        let scenario_info = &scenario.info;

        let classified = self
            .classifier
            .classify(&feature_info.tags, &scenario_info.tags);
        let digest = digest(scenario_info.arguments.iter().map(|(k, v)| (k, v)));

        let labels = [
            Label::thread(),
            self.host.clone(),
            Label::feature(feature_info.title.clone()),
        ]
        .into_iter()
        .chain(classified.labels)
        .unique()
        .collect();

        TestResult {
            uuid: identity::new_id(),
            history_id: identity::history_id(&scenario_info.title, &digest.hash),
            name: scenario_info.title.clone(),
            full_name: scenario_info.title.clone(),
            labels,
            links: classified.links,
            parameters: digest.parameters,
            stage: Stage::Running,
            start: now_millis(),
            ..Default::default()
        }
    }

    /// Announce a hook invocation. The returned fixture is handed back to
    /// [`Tracker::finish_fixture`] once the hook returns.
    pub fn start_fixture(&self, feature: Option<&FeatureContext>, hook: &HookInfo) -> FixtureResult {
        let feature = self.feature_or_orphans(feature);
        let fixture = FixtureResult {
            name: hook.fixture_name(),
            stage: Stage::Running,
            start: now_millis(),
            ..Default::default()
        };

        let container_uuid = self.enter_feature(feature);
        let container_key = container_uuid.as_deref().unwrap_or(feature.container_id());
        if let Err(e) = self.backend.start_fixture(container_key, &fixture) {
            error!("failed to start fixture: {e:#}");
        }

        fixture
    }

    /// Record the hook's result under the feature's container.
    pub fn finish_fixture(
        &self,
        feature: Option<&FeatureContext>,
        hook: &HookInfo,
        mut fixture: FixtureResult,
        outcome: &Outcome,
    ) {
        let feature = self.feature_or_orphans(feature);
        fixture.status = outcome.status();
        fixture.status_details = outcome.status_details();
        fixture.stage = Stage::Finished;
        fixture.stop = Some(now_millis());

        match &mut *feature.slot() {
            ContainerSlot::Started(container) if hook.kind.is_before() => {
                container.befores.push(fixture)
            }
            ContainerSlot::Started(container) => container.afters.push(fixture),
            _ => warn!(
                "fixture \"{}\" finished without a running container",
                fixture.name
            ),
        }
    }

    /// Append a running step to the scenario's test result.
    pub fn start_step(&self, scenario: &mut ScenarioContext, keyword: &str, text: &str) {
        let Some(result) = scenario.result.as_mut() else {
            warn!("step \"{text}\" started outside of a running scenario");
            return;
        };

        result.steps.push(StepResult {
            name: format!("{} {}", keyword.trim(), text.trim()).trim().to_string(),
            stage: Stage::Running,
            start: now_millis(),
            ..Default::default()
        });
    }

    /// Complete the most recently started step.
    pub fn finish_step(&self, scenario: &mut ScenarioContext, outcome: &Outcome) {
        let step = scenario
            .result
            .as_mut()
            .and_then(|result| result.steps.iter_mut().rev().find(|s| s.stage == Stage::Running));
        let Some(step) = step else {
            warn!("no running step to finish in scenario \"{}\"", scenario.info.title);
            return;
        };

        step.status = outcome.status();
        step.status_details = outcome.status_details();
        step.stage = Stage::Finished;
        step.stop = Some(now_millis());
    }

    /// Close the scenario's test result and hand it to the backend. The result
    /// is not reachable through the context afterwards.
    pub fn finish_scenario(&self, scenario: &mut ScenarioContext, outcome: &Outcome) {
        if scenario.state != ScenarioState::TestStarted {
            warn!(
                "scenario \"{}\" cannot finish in state {}",
                scenario.info.title, scenario.state
            );
            return;
        }
        let Some(mut result) = scenario.result.take() else {
            return;
        };

        let stop = now_millis();
        for step in result.steps.iter_mut().filter(|s| s.stage == Stage::Running) {
            step.stage = Stage::Interrupted;
            step.stop = Some(stop);
        }
        result.status = outcome.status();
        result.status_details = outcome.status_details();
        result.stage = Stage::Finished;
        result.stop = Some(stop);
        scenario.state = ScenarioState::TestFinished;

        debug!(
            "test case {} finished as {}: \"{}\"",
            result.uuid, result.status, result.name
        );
        if let Err(e) = self.backend.write_test_case(result) {
            error!("failed to write test case: {e:#}");
        }
    }

    /// Close the feature's container and hand it to the backend.
    pub fn exit_feature(&self, feature: &FeatureContext) {
        let previous = std::mem::replace(&mut *feature.slot(), ContainerSlot::Finished);
        let ContainerSlot::Started(mut container) = previous else {
            debug!("feature \"{}\" exited without a container", feature.info().title);
            return;
        };

        container.stop = Some(now_millis());
        debug!("container {} finished", container.uuid);
        if let Err(e) = self.backend.write_container(container) {
            error!("failed to write test container: {e:#}");
        }
    }

    /// Close the container of scenarios reported without a feature.
    pub fn close(&self) {
        self.exit_feature(&self.orphans);
    }
}
