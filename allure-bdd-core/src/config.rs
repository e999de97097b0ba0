//! # Configuration Module
//!
//! Handles loading the reporting configuration from `allureConfig.json`.
//! The configuration is read once per process and never changes afterwards;
//! tag classification is a pure read of it.
//!
//! ## Configuration Loading Flow (block diagram)
//!
//! ```text
//! +-------------------+     +-------------------+     +-------------------+
//! | ALLURE_CONFIG env | --> | Path resolution   | --> | allureConfig.json |
//! | (optional)        |     | or default ./     |     |                   |
//! +-------------------+     +-------------------+     +-------------------+
//!                                                              |
//!                                                              v
//!                           +-------------------+     +-------------------+
//!                           | Lazy static       | <-- | JSON parser       |
//!                           | get_config()      |     | (deserialization) |
//!                           +-------------------+     +-------------------+
//! ```
//!
//! ## Config File Location
//!
//! 1. If `ALLURE_CONFIG` environment variable is set, load from that path
//! 2. Otherwise, load from `allureConfig.json` in the current directory
//!
//! A missing default file is not an error; every rule is simply disabled.
//!
//! ## Configuration Structure
//!
//! ```json
//! {
//!   "allure": { "directory": "allure-results", "title": "Nightly" },
//!   "bdd": {
//!     "links": { "issue": "JIRA-\\d+", "tms": "TMS-\\d+" },
//!     "grouping": {
//!       "suites": { "suite": "suite:(.+)" },
//!       "behaviors": { "epic": "epic:(.+)", "story": "story:(.+)" }
//!     },
//!     "labels": { "owner": "owner:(.+)", "severity": "severity:(.+)", "label": "label:(.+):(.+)" }
//!   }
//! }
//! ```
//!
//! Every leaf is optional. An absent or empty pattern disables that rule.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{io::Read, path::Path};
use tracing::*;

use crate::{Error, Result};

/// Environment variable name for specifying the config file path.
const ALLURE_CONFIG_ENV: &str = "ALLURE_CONFIG";

/// Config file loaded when `ALLURE_CONFIG` is not set.
const DEFAULT_CONFIG_FILE: &str = "allureConfig.json";

/// Results directory used when the configuration does not name one.
pub const DEFAULT_RESULTS_DIRECTORY: &str = "allure-results";

static CONFIG: Lazy<Config> = Lazy::new(|| {
    let _ = dotenv::dotenv();
    Config::load().unwrap_or_else(|e| {
        error!("{e}");
        Config::default()
    })
});

/// Get the process-wide configuration. It is loaded on first access.
pub fn get_config() -> &'static Config {
    &CONFIG
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Settings shared with the report writer.
    pub allure: AllureConfig,
    /// Tag classification rules. Files written for SpecFlow name this section
    /// `specflow`.
    #[serde(alias = "specflow")]
    pub bdd: PluginConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AllureConfig {
    /// Directory the results backend writes into.
    pub directory: Option<String>,
    /// Report title. When set it replaces the machine name in the host label.
    pub title: Option<String>,
}

impl AllureConfig {
    pub fn results_directory(&self) -> &str {
        self.directory
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .unwrap_or(DEFAULT_RESULTS_DIRECTORY)
    }

    /// The title, if it carries anything other than whitespace.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginConfig {
    pub links: LinksConfig,
    pub grouping: GroupingConfig,
    pub labels: LabelsConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LinksConfig {
    pub link: Option<String>,
    pub issue: Option<String>,
    pub tms: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub suites: SuitesConfig,
    pub behaviors: BehaviorsConfig,
    pub packages: PackagesConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuitesConfig {
    pub parent_suite: Option<String>,
    pub suite: Option<String>,
    pub sub_suite: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorsConfig {
    pub epic: Option<String>,
    pub story: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackagesConfig {
    pub package: Option<String>,
    pub test_class: Option<String>,
    pub test_method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub owner: Option<String>,
    pub severity: Option<String>,
    /// Key/value rule with exactly two capture groups.
    pub label: Option<String>,
}

impl Config {
    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Config> {
        serde_json::from_str(json).map_err(|e| {
            Error::LoadError(format!(
                "failed to deserialize allureConfig.json into allure_bdd::Config: {e}"
            ))
        })
    }

    /// Load configuration from path. A missing file yields the default configuration.
    pub fn load_from(path: &Path) -> Result<Config> {
        let Ok(mut file) = std::fs::File::open(path) else {
            debug!("{path:?} not found, classification rules are disabled");
            return Ok(Config::default());
        };

        let mut buf = String::new();
        file.read_to_string(&mut buf)
            .map_err(|e| Error::LoadError(e.to_string()))?;

        let cfg = Config::from_json(&buf)?;

        debug!("{path:?} was successfully loaded: {cfg:#?}");

        Ok(cfg)
    }

    /// Load configuration.
    ///
    /// Loading order:
    /// 1. If `ALLURE_CONFIG` env var is set, load from that path
    /// 2. Otherwise, load from `allureConfig.json` in the current directory
    pub fn load() -> Result<Config> {
        match std::env::var(ALLURE_CONFIG_ENV) {
            Ok(path) => {
                let path = Path::new(&path);

                // Detect misuse: if it doesn't look like a file path, error out
                if path.extension().is_none_or(|ext| ext != "json")
                    && !path.to_string_lossy().contains(std::path::MAIN_SEPARATOR)
                    && !path.to_string_lossy().contains('/')
                {
                    return Err(Error::LoadError(format!(
                        "{ALLURE_CONFIG_ENV} should be a path to a JSON config file. Got: {path:?}"
                    )));
                }

                if !path.exists() {
                    return Err(Error::LoadError(format!(
                        "Config file specified by {ALLURE_CONFIG_ENV} not found: {path:?}"
                    )));
                }

                debug!("Loading config from {ALLURE_CONFIG_ENV}={path:?}");
                Config::load_from(path)
            }
            Err(_) => Config::load_from(Path::new(DEFAULT_CONFIG_FILE)),
        }
    }
}
