//! # Allure BDD - Allure reporting for behavior-driven test runners
//!
//! allure-bdd translates the lifecycle of a behavior-driven test run (features,
//! scenarios, hooks, steps) into Allure results. Tags on features and scenarios
//! become labels and links through configurable regular-expression rules, and
//! every scenario receives a history id that stays stable across runs.
//!
//! ## Quick Start
//!
//! Describe the tag rules in `allureConfig.json`:
//!
//! ```json
//! {
//!   "allure": { "directory": "allure-results" },
//!   "bdd": {
//!     "links": { "issue": "JIRA-\\d+" },
//!     "grouping": { "behaviors": { "epic": "epic:(.+)", "story": "story:(.+)" } },
//!     "labels": { "owner": "owner:(.+)", "severity": "severity:(.+)" }
//!   }
//! }
//! ```
//!
//! Then forward the runner's notifications to a [`Tracker`]:
//!
//! ```rust,no_run
//! use allure_bdd::{
//!     FeatureContext, FeatureInfo, Outcome, ResultsDirBackend, ScenarioContext, ScenarioInfo,
//!     Tracker,
//! };
//!
//! fn main() -> allure_bdd::eyre::Result<()> {
//!     let tracker = Tracker::from_config(ResultsDirBackend::from_config()?);
//!
//!     let feature = FeatureContext::new(FeatureInfo::new(
//!         "en-US",
//!         "Checkout",
//!         "Paying for a cart",
//!         ["epic:Checkout"],
//!     ));
//!
//!     let mut scenario = ScenarioContext::new(
//!         ScenarioInfo::new("Pay by card", ["severity:critical", "JIRA-42"])
//!             .with_argument("card", "visa"),
//!     );
//!     tracker.start_scenario(Some(&feature), &mut scenario);
//!     tracker.start_step(&mut scenario, "Given", "a cart with 2 items");
//!     tracker.finish_step(&mut scenario, &Outcome::Passed);
//!     tracker.finish_scenario(&mut scenario, &Outcome::Passed);
//!
//!     tracker.exit_feature(&feature);
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Ordered tag rules**: links, issues, TMS ids, suites, epics, stories,
//!   packages, owners, severities and free key/value labels
//! - **Stable identities**: history ids derived from the scenario title and
//!   its arguments, container ids derived from feature metadata
//! - **Never fails the test**: malformed rules are disabled, missing context
//!   falls back to sentinels, backend errors are logged
//! - **Concurrent runners**: one lock per feature, lock-free id allocation

mod app;

// Re-export error handling crates for user convenience
pub use allure_bdd_core::{anyhow, eyre};

// Re-export main application struct
pub use app::App;

// Re-export core functionality
pub use allure_bdd_core::{
    backend::{self, Backend, ConsoleBackend, MemoryBackend, NullBackend, ResultsDirBackend},
    classifier::{self, Classification, Classified, Classifier, RuleKind},
    config::{self, get_config, Config},
    context::{
        self, parse_tags, FeatureContext, FeatureInfo, HookInfo, HookKind, ScenarioContext,
        ScenarioInfo, ScenarioState,
    },
    digest::{digest, Digest},
    failure::{self, Outcome},
    identity,
    lifecycle::Tracker,
    matcher,
    model::{
        self, FixtureResult, Label, Link, LinkType, Parameter, Severity, Stage, Status,
        StatusDetails, StepResult, TestResult, TestResultContainer,
    },
    Error, Result,
};
