use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::error::CheckOutcome;

/// Verdict of one executed check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test: String,
    pub success: bool,
    pub details: String,
    pub timestamp: String,
    #[serde(default)]
    pub duration_ms: u64,
    /// Failure category, absent for passed checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<String>,
}

impl TestResult {
    pub fn from_outcome(test: &str, outcome: &CheckOutcome, duration_ms: u64) -> Self {
        let (success, details, failure_kind) = match outcome {
            Ok(details) => (true, details.clone(), None),
            Err(failure) => (false, failure.to_string(), Some(failure.kind().to_string())),
        };

        Self {
            test: test.to_string(),
            success,
            details,
            timestamp: chrono::Local::now().to_rfc3339(),
            duration_ms,
            failure_kind,
        }
    }
}

/// Append-only log of results for one run
#[derive(Debug, Clone)]
pub struct ResultLog {
    session_id: String,
    results: Vec<TestResult>,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl ResultLog {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            results: Vec::new(),
            started_at: Instant::now(),
            finished_at: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn record(&mut self, result: TestResult) -> &TestResult {
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn passed(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let duration = self
            .finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
            .as_millis() as u64;

        TestSummary::from_results(&self.session_id, &self.results, Some(duration))
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> TestSessionReport {
        TestSessionReport {
            session_id: self.session_id.clone(),
            results: self.results.clone(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    /// Percentage of passed checks, one decimal place
    pub success_rate: f64,
    pub total_duration_ms: Option<u64>,
}

impl TestSummary {
    /// Fold the result list into totals
    pub fn from_results(
        session_id: &str,
        results: &[TestResult],
        total_duration_ms: Option<u64>,
    ) -> Self {
        let (passed, failed) = results.iter().fold((0u32, 0u32), |(p, f), r| {
            if r.success {
                (p + 1, f)
            } else {
                (p, f + 1)
            }
        });

        Self {
            session_id: session_id.to_string(),
            total: passed + failed,
            passed,
            failed,
            success_rate: success_rate(passed, passed + failed),
            total_duration_ms,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// `passed / total * 100` rounded to one decimal; `0.0` when nothing ran
pub fn success_rate(passed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(passed) / f64::from(total) * 1000.0).round() / 10.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSessionReport {
    pub session_id: String,
    pub results: Vec<TestResult>,
    pub summary: TestSummary,
}
