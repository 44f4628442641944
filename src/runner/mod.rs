pub mod error;
pub mod executor;
pub mod fixtures;
pub mod session;
pub mod state;

use anyhow::Result;

use crate::report;
use crate::utils::config::Config;

pub use executor::ApiTester;
pub use state::*;

/// Run the full check sequence once against `config.base_url`.
///
/// Check failures are part of the returned summary, never an `Err`; errors
/// come only from setup (building the client) or from writing reports.
pub fn run_tests(config: &Config) -> Result<TestSummary> {
    let mut tester = ApiTester::new(config)?;
    let summary = tester.run_all();

    if config.report {
        report::write_reports(&tester.log().to_report().into(), &config.output_dir)?;
    }

    Ok(summary)
}
