//! Structured run-report envelope.
//!
//! The binary prints exactly one envelope on stdout per run:
//!
//! ```json
//! {
//!   "ok": false,
//!   "scenario": "agency-owner-sign-up",
//!   "durationMs": 41230,
//!   "error": { "kind": "ASSERTION_FAILED", "message": "..." }
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ScenarioError;

pub const SCENARIO_NAME: &str = "agency-owner-sign-up";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub ok: bool,
    pub scenario: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportError>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportError {
    pub kind: String,
    pub message: String,
}

impl RunReport {
    pub fn success(duration: Duration) -> Self {
        Self {
            ok: true,
            scenario: SCENARIO_NAME.to_string(),
            duration_ms: duration.as_millis() as u64,
            error: None,
        }
    }

    pub fn failure(duration: Duration, err: &ScenarioError) -> Self {
        Self {
            ok: false,
            scenario: SCENARIO_NAME.to_string(),
            duration_ms: duration.as_millis() as u64,
            error: Some(ReportError {
                kind: error_kind(err).to_string(),
                message: err.to_string(),
            }),
        }
    }
}

fn error_kind(err: &ScenarioError) -> &'static str {
    match err {
        ScenarioError::BrowserLaunch(_) => "BROWSER_LAUNCH_FAILED",
        ScenarioError::Navigation { .. } => "NAVIGATION_FAILED",
        ScenarioError::ElementNotFound { .. } => "ELEMENT_NOT_FOUND",
        ScenarioError::Timeout { .. } => "TIMEOUT",
        ScenarioError::Assertion { .. } => "ASSERTION_FAILED",
        ScenarioError::SessionClosed(_) => "SESSION_CLOSED",
        ScenarioError::Io(_) => "IO_ERROR",
        ScenarioError::Json(_) => "INTERNAL_ERROR",
        ScenarioError::Anyhow(_) => "INTERNAL_ERROR",
    }
}
