use super::types::TestResults;
use crate::runner::state::TestResult;
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;
use std::path::Path;

const SUITE_NAME: &str = "you-api-smoke";

fn seconds(ms: u64) -> String {
    (ms as f64 / 1000.0).to_string()
}

/// Generate JUnit XML report string from TestResults
pub fn generate_junit_xml(results: &TestResults) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let total_tests = results.results.len().to_string();
    let failures = results
        .results
        .iter()
        .filter(|r| !r.success)
        .count()
        .to_string();
    let total_duration = seconds(
        results
            .summary
            .total_duration_ms
            .unwrap_or_else(|| results.results.iter().map(|r| r.duration_ms).sum()),
    );

    let mut suites_start = BytesStart::new("testsuites");
    suites_start.push_attribute(("name", SUITE_NAME));
    suites_start.push_attribute(("tests", total_tests.as_str()));
    suites_start.push_attribute(("failures", failures.as_str()));
    suites_start.push_attribute(("time", total_duration.as_str()));
    writer.write_event(Event::Start(suites_start))?;

    // One suite per run; checks run in a fixed order
    let mut suite_start = BytesStart::new("testsuite");
    suite_start.push_attribute(("name", SUITE_NAME));
    suite_start.push_attribute(("tests", total_tests.as_str()));
    suite_start.push_attribute(("failures", failures.as_str()));
    suite_start.push_attribute(("skipped", "0"));
    suite_start.push_attribute(("id", results.session_id.as_str()));
    suite_start.push_attribute(("time", total_duration.as_str()));
    suite_start.push_attribute(("timestamp", results.generated_at.as_str()));
    writer.write_event(Event::Start(suite_start))?;

    for result in &results.results {
        write_test_case(&mut writer, result)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.write_event(Event::End(BytesEnd::new("testsuites")))?;

    let xml = String::from_utf8(writer.into_inner().into_inner())?;
    Ok(xml)
}

fn write_test_case<W: std::io::Write>(writer: &mut Writer<W>, result: &TestResult) -> Result<()> {
    let mut case_start = BytesStart::new("testcase");
    let time = seconds(result.duration_ms);
    case_start.push_attribute(("name", result.test.as_str()));
    case_start.push_attribute(("classname", SUITE_NAME));
    case_start.push_attribute(("time", time.as_str()));

    if result.success {
        writer.write_event(Event::Empty(case_start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(case_start))?;

    let mut fail_start = BytesStart::new("failure");
    fail_start.push_attribute(("message", result.details.as_str()));
    fail_start.push_attribute(("type", result.failure_kind.as_deref().unwrap_or("failure")));
    writer.write_event(Event::Start(fail_start))?;
    writer.write_event(Event::Text(BytesText::new(&result.details)))?;
    writer.write_event(Event::End(BytesEnd::new("failure")))?;

    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

/// Write report to file
pub fn write_report(results: &TestResults, output_dir: &Path) -> Result<()> {
    let xml = generate_junit_xml(results)?;
    let path = output_dir.join("junit.xml");
    std::fs::write(&path, xml)
        .with_context(|| format!("Failed to write JUnit report: {}", path.display()))?;
    println!("    Generated JUnit report: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::error::CheckFailure;
    use crate::runner::state::TestSummary;

    #[test]
    fn test_generate_junit_xml() {
        let checks = vec![
            TestResult::from_outcome("User Login", &Ok("Token received: true".to_string()), 120),
            TestResult::from_outcome(
                "Create Goal",
                &Err(CheckFailure::Status {
                    status: 500,
                    response: String::new(),
                }),
                80,
            ),
        ];
        let results = TestResults {
            session_id: "test-session".to_string(),
            summary: TestSummary::from_results("test-session", &checks, Some(200)),
            results: checks,
            generated_at: "2023-01-01 12:00:00".to_string(),
        };

        let xml = generate_junit_xml(&results).expect("Failed to generate XML");

        assert!(xml.contains(r#"<testsuites name="you-api-smoke""#));
        assert!(xml.contains(r#"tests="2""#));
        assert!(xml.contains(r#"failures="1""#));
        assert!(xml.contains(r#"<testcase name="User Login""#));
        assert!(xml.contains(r#"message="Status: 500""#));
        assert!(xml.contains(r#"type="status""#));
        assert!(xml.contains(r#"time="0.2""#));
    }
}
