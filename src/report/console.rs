//! Console output: live status lines while checks run, summary at the end.

use colored::Colorize;

use crate::runner::state::{TestResult, TestSummary};

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner(base_url: &str, user_email: &str) {
    println!("{} Starting API smoke tests", "▶".green().bold());
    println!("  Base URL: {}", base_url.cyan());
    println!("  Test user: {}", user_email.cyan());
    println!("{}", rule());
}

/// Status line for one result, plus a details line when there are details
pub fn format_result(result: &TestResult, response: Option<&str>) -> String {
    let status = if result.success {
        format!("{} PASS", "✓".green())
    } else {
        format!("{} FAIL", "✗".red())
    };

    let mut out = format!("{} {}", status, result.test.bold());
    if !result.details.is_empty() {
        out.push_str(&format!("\n    {}", result.details.dimmed()));
    }
    if let (false, Some(response)) = (result.success, response) {
        out.push_str(&format!("\n    Response: {}", response));
    }
    out
}

pub fn print_result(result: &TestResult, response: Option<&str>) {
    println!("{}\n", format_result(result, response));
}

/// Final block: totals, rate, failed checks with details, passed check names
pub fn format_summary(summary: &TestSummary, results: &[TestResult]) -> String {
    let mut lines = vec![
        rule(),
        format!("{} TEST RESULTS SUMMARY", "■".blue().bold()),
        rule(),
        format!("  Passed: {}", summary.passed.to_string().green()),
        format!("  Failed: {}", summary.failed.to_string().red()),
        format!("  Success Rate: {:.1}%", summary.success_rate),
    ];
    if let Some(duration) = summary.total_duration_ms {
        lines.push(format!("  Duration: {}ms", duration));
    }

    if summary.failed > 0 {
        lines.push(String::new());
        lines.push(format!("{}", "FAILED TESTS:".red().bold()));
        for result in results.iter().filter(|r| !r.success) {
            lines.push(format!("  • {}: {}", result.test, result.details));
        }
    }

    lines.push(String::new());
    lines.push(format!("{}", "PASSED TESTS:".green().bold()));
    for result in results.iter().filter(|r| r.success) {
        lines.push(format!("  • {}", result.test));
    }

    lines.push(String::new());
    lines.push(rule());
    lines.push(format!(
        "Testing completed at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    lines.push(rule());
    lines.join("\n")
}

pub fn print_summary(summary: &TestSummary, results: &[TestResult]) {
    println!("{}", format_summary(summary, results));
}
