use crate::runner::state::{TestResult, TestSessionReport, TestSummary};
use serde::{Deserialize, Serialize};

/// Test results for report generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub session_id: String,
    pub results: Vec<TestResult>,
    pub summary: TestSummary,
    pub generated_at: String,
}

impl From<TestSessionReport> for TestResults {
    fn from(report: TestSessionReport) -> Self {
        Self {
            session_id: report.session_id,
            results: report.results,
            summary: report.summary,
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
