use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScenarioError>;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("navigation failed: {url}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("timeout after {ms}ms waiting for: {action}")]
    Timeout { ms: u64, action: String },

    /// The terminal visibility assertion failed. The message carries the
    /// business-level expectation that was not met.
    #[error("assertion failed: {expectation}")]
    Assertion { expectation: String },

    #[error("session not open: {0}")]
    SessionClosed(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl ScenarioError {
    /// Whether the run failed on the scenario's terminal assertion rather
    /// than on plumbing (navigation, lookups, timeouts).
    pub fn is_assertion(&self) -> bool {
        matches!(self, ScenarioError::Assertion { .. })
    }
}
