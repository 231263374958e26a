use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Debug, Error)]
#[error("Failed to fetch {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unreadable response: {0}")]
    Parse(String),

    #[error("Message not acknowledged: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        NotifyError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures that end a run before it completes.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No posts found on site")]
    EmptyExtraction,

    #[error(transparent)]
    StateWrite(#[from] StateError),
}
