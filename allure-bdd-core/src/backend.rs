use console::{style, Term};
use eyre::WrapErr;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::*;

use crate::{
    model::{FixtureResult, Status, TestResult, TestResultContainer},
    Error,
};

/// Backend trait. Receives fully populated report objects from the lifecycle
/// tracker. The start methods are notifications and default to doing nothing;
/// the write methods hand over final, immutable objects.
///
/// Backends are shared by every worker executing scenarios, hence `&self`.
pub trait Backend: Send + Sync {
    /// Called once per feature when its container is created.
    fn start_test_container(
        &self,
        _feature_container_id: &str,
        _container: &TestResultContainer,
    ) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a scenario starts.
    fn start_test_case(&self, _container_uuid: &str, _result: &TestResult) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a hook starts executing.
    fn start_fixture(&self, _container_uuid: &str, _fixture: &FixtureResult) -> eyre::Result<()> {
        Ok(())
    }

    /// Called when a scenario ends.
    fn write_test_case(&self, result: TestResult) -> eyre::Result<()>;

    /// Called when a feature ends.
    fn write_container(&self, container: TestResultContainer) -> eyre::Result<()>;
}

pub struct NullBackend;

impl Backend for NullBackend {
    fn write_test_case(&self, _result: TestResult) -> eyre::Result<()> {
        Ok(())
    }

    fn write_container(&self, _container: TestResultContainer) -> eyre::Result<()> {
        Ok(())
    }
}

/// Prints one line per finished scenario.
pub struct ConsoleBackend {
    terminal: Term,
}

impl ConsoleBackend {
    pub fn new() -> ConsoleBackend {
        ConsoleBackend {
            terminal: Term::stdout(),
        }
    }
}

impl Default for ConsoleBackend {
    fn default() -> Self {
        ConsoleBackend::new()
    }
}

impl Backend for ConsoleBackend {
    fn write_test_case(&self, result: TestResult) -> eyre::Result<()> {
        self.terminal
            .write_line(&test_case_line(&result))
            .wrap_err("failed to write character on terminal")
    }

    fn write_container(&self, container: TestResultContainer) -> eyre::Result<()> {
        self.terminal
            .write_line(&container_line(&container))
            .wrap_err("failed to write character on terminal")
    }
}

/// `<mark> [<feature>] <scenario>`, followed by the status message for
/// failed and broken scenarios.
fn test_case_line(result: &TestResult) -> String {
    let feature = result
        .labels
        .iter()
        .find(|label| label.name == "feature")
        .map(|label| label.value.as_str())
        .unwrap_or_default();

    match result.status {
        Status::Passed => format!("{} [{feature}] {}", style("✓").green(), result.name),
        Status::Skipped => format!("{} [{feature}] {}", style("-").yellow(), result.name),
        Status::Failed | Status::Broken => {
            let message = result
                .status_details
                .as_ref()
                .map(|details| details.message.as_str())
                .unwrap_or_default();
            format!(
                "{} [{feature}] {}: {message}",
                style("✘").red(),
                result.name
            )
        }
    }
}

fn container_line(container: &TestResultContainer) -> String {
    let summary = format!(
        "{} ({} scenarios)",
        container.name,
        container.children.len()
    );
    style(summary).dim().to_string()
}

/// Writes Allure 2 result files into a results directory.
pub struct ResultsDirBackend {
    directory: PathBuf,
}

impl ResultsDirBackend {
    /// Creates the directory if it does not exist yet.
    pub fn new(directory: impl AsRef<Path>) -> crate::Result<ResultsDirBackend> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;
        debug!("writing allure results into {directory:?}");
        Ok(ResultsDirBackend { directory })
    }

    /// Backend writing into the directory named by the process configuration.
    pub fn from_config() -> crate::Result<ResultsDirBackend> {
        ResultsDirBackend::new(crate::get_config().allure.results_directory())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn write_json(&self, file_name: String, value: &impl serde::Serialize) -> crate::Result<()> {
        let path = self.directory.join(file_name);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, value).map_err(Error::from)?;
        writer.flush()?;
        trace!("wrote {path:?}");
        Ok(())
    }
}

impl Backend for ResultsDirBackend {
    fn write_test_case(&self, result: TestResult) -> eyre::Result<()> {
        self.write_json(format!("{}-result.json", result.uuid), &result)
            .wrap_err_with(|| format!("failed to write test result \"{}\"", result.name))
    }

    fn write_container(&self, container: TestResultContainer) -> eyre::Result<()> {
        self.write_json(format!("{}-container.json", container.uuid), &container)
            .wrap_err_with(|| format!("failed to write container \"{}\"", container.name))
    }
}

/// One recorded backend call.
#[derive(Debug, Clone)]
pub enum Event {
    ContainerStarted {
        feature_container_id: String,
        container: TestResultContainer,
    },
    TestCaseStarted {
        container_uuid: String,
        result: TestResult,
    },
    FixtureStarted {
        container_uuid: String,
        fixture: FixtureResult,
    },
    TestCaseWritten(TestResult),
    ContainerWritten(TestResultContainer),
}

/// Keeps every call in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    events: Mutex<Vec<Event>>,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    fn push(&self, event: Event) -> eyre::Result<()> {
        let Ok(mut events) = self.events.lock() else {
            eyre::bail!("failed to acquire memory backend lock");
        };
        events.push(event);
        Ok(())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Test results handed over at scenario end.
    pub fn test_cases(&self) -> Vec<TestResult> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::TestCaseWritten(result) => Some(result),
                _ => None,
            })
            .collect()
    }

    /// Containers handed over at feature end.
    pub fn containers(&self) -> Vec<TestResultContainer> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::ContainerWritten(container) => Some(container),
                _ => None,
            })
            .collect()
    }

    /// Number of containers started so far.
    pub fn started_containers(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Event::ContainerStarted { .. }))
            .count()
    }
}

impl Backend for MemoryBackend {
    fn start_test_container(
        &self,
        feature_container_id: &str,
        container: &TestResultContainer,
    ) -> eyre::Result<()> {
        self.push(Event::ContainerStarted {
            feature_container_id: feature_container_id.to_string(),
            container: container.clone(),
        })
    }

    fn start_test_case(&self, container_uuid: &str, result: &TestResult) -> eyre::Result<()> {
        self.push(Event::TestCaseStarted {
            container_uuid: container_uuid.to_string(),
            result: result.clone(),
        })
    }

    fn start_fixture(&self, container_uuid: &str, fixture: &FixtureResult) -> eyre::Result<()> {
        self.push(Event::FixtureStarted {
            container_uuid: container_uuid.to_string(),
            fixture: fixture.clone(),
        })
    }

    fn write_test_case(&self, result: TestResult) -> eyre::Result<()> {
        self.push(Event::TestCaseWritten(result))
    }

    fn write_container(&self, container: TestResultContainer) -> eyre::Result<()> {
        self.push(Event::ContainerWritten(container))
    }
}

impl<B: Backend + ?Sized> Backend for std::sync::Arc<B> {
    fn start_test_container(
        &self,
        feature_container_id: &str,
        container: &TestResultContainer,
    ) -> eyre::Result<()> {
        (**self).start_test_container(feature_container_id, container)
    }

    fn start_test_case(&self, container_uuid: &str, result: &TestResult) -> eyre::Result<()> {
        (**self).start_test_case(container_uuid, result)
    }

    fn start_fixture(&self, container_uuid: &str, fixture: &FixtureResult) -> eyre::Result<()> {
        (**self).start_fixture(container_uuid, fixture)
    }

    fn write_test_case(&self, result: TestResult) -> eyre::Result<()> {
        (**self).write_test_case(result)
    }

    fn write_container(&self, container: TestResultContainer) -> eyre::Result<()> {
        (**self).write_container(container)
    }
}
