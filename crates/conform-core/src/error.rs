use conform_types::ResultField;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing required config: {0}")]
    ConfigMissing(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Result row {index} has {}", .field.problem())]
    InvalidResult { index: usize, field: ResultField },

    #[error("Download of {link} failed: {reason}")]
    DownloadFailed { link: String, reason: String },

    #[error("Expected no results, got {0}")]
    UnexpectedResults(usize),

    #[error("Ratio failed: {0}")]
    RatioFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Process error: {0}")]
    Process(String),
}

impl Error {
    pub(crate) fn download(link: &str, reason: impl ToString) -> Self {
        Self::DownloadFailed {
            link: link.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
