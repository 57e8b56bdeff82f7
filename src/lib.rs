//! End-to-end sign-up scenario for the AgencyFlow web app.
//!
//! Drives a headless Chromium against a locally running AgencyFlow
//! instance: agency-owner login (attempted twice), account creation, and a
//! terminal check that the invitation-token banner appears. The browser
//! stack sits behind a trait seam so the scenario can also run against the
//! doubles in [`testing`].

pub mod driver;
pub mod error;
pub mod locator;
pub mod logging;
pub mod report;
pub mod scenario;
pub mod session;
pub mod testing;

pub use error::{Result, ScenarioError};
pub use scenario::{ScenarioConfig, run};
