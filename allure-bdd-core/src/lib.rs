//! # Allure BDD Core
//!
//! Core functionality for reporting behavior-driven test runs to Allure.
//!
//! This crate provides the tag classification and test identity engine:
//! - Rule matching and tag classification into labels and links
//! - Parameter digests and history ids that stay stable across runs
//! - Feature container ids derived from feature metadata
//! - A lifecycle tracker turning runner notifications into report objects
//! - Backends receiving the finished objects
//!
//! ## Architecture (block diagram)
//!
//! ```text
//! +---------------------+      +---------------------+      +---------------------+
//! | runner notification | ---> | lifecycle tracker   | ---> | backend (output)    |
//! | feature / scenario  |      | per-feature lock    |      | ResultsDir/Console  |
//! +---------------------+      +---------------------+      +---------------------+
//!                                   |           |
//!                                   v           v
//!                    +---------------------+  +---------------------+
//!                    | tag classifier      |  | parameter digest    |
//!                    | ordered rule table  |  | + identity          |
//!                    +---------------------+  +---------------------+
//!                                   ^
//!                                   |
//!                    +---------------------+
//!                    | allureConfig.json   |
//!                    +---------------------+
//! ```
//!
//! Most users should use the main `allure-bdd` crate rather than importing
//! `allure-bdd-core` directly.

pub mod backend;
pub mod classifier;
pub mod config;
pub mod context;
pub mod digest;
pub mod error;
pub mod failure;
pub mod identity;
pub mod lifecycle;
pub mod matcher;
pub mod model;

// Re-export error handling crates
pub use anyhow;
pub use eyre;

// Re-export key functionality
pub use backend::{Backend, ConsoleBackend, MemoryBackend, NullBackend, ResultsDirBackend};
pub use classifier::{Classification, Classified, Classifier, RuleKind};
pub use config::{get_config, Config};
pub use context::{
    parse_tags, FeatureContext, FeatureInfo, HookInfo, HookKind, ScenarioContext, ScenarioInfo,
    ScenarioState,
};
pub use digest::{digest, Digest};
pub use error::{Error, Result};
pub use failure::Outcome;
pub use lifecycle::Tracker;
pub use model::{
    FixtureResult, Label, Link, LinkType, Parameter, Severity, Stage, Status, StatusDetails,
    StepResult, TestResult, TestResultContainer,
};
