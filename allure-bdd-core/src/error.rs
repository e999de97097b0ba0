pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Occurs when `allureConfig.json` fails to load.
    #[error("failed to load allureConfig.json: {0}")]
    LoadError(String),
    /// Occurs when a backend fails to write into the results directory.
    #[error("failed to write allure results: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize allure results: {0}")]
    Serialize(#[from] serde_json::Error),
}
