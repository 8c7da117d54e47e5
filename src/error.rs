use thiserror::Error;

/// Failures surfaced to callers of the stats pipeline
#[derive(Debug, Error)]
pub enum StatsError {
    /// Unknown player, or a season with no games
    #[error("{0}")]
    NotFound(String),

    #[error("Failed to fetch data after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Failed to fetch player stats: {0}")]
    Upstream(String),

    #[error("{0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Raw failure of a single provider call, before retry policy is applied
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("read timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Failed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::Failed(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Failed(format!("Failed to parse provider response: {}", e))
    }
}
