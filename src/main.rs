use std::time::Instant;

use agencyflow_e2e::driver::chromium::ChromiumEngine;
use agencyflow_e2e::logging;
use agencyflow_e2e::report::RunReport;
use agencyflow_e2e::scenario::{self, ScenarioConfig};
use tracing::error;

#[tokio::main]
async fn main() {
    logging::init_logging();

    let config = ScenarioConfig::default();
    let engine = Box::new(ChromiumEngine::new());
    let started = Instant::now();

    let report = match scenario::run(engine, &config).await {
        Ok(()) => RunReport::success(started.elapsed()),
        Err(err) => {
            error!(target = "scenario", error = %err, "scenario failed");
            RunReport::failure(started.elapsed(), &err)
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => error!(target = "scenario", error = %err, "report serialization failed"),
    }

    if !report.ok {
        std::process::exit(1);
    }
}
