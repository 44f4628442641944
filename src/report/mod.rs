pub mod console;
pub mod json;
pub mod junit;
pub mod types;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Regenerate a report from a saved `test-results.json`
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let results = std::fs::read_to_string(results_path)
        .with_context(|| format!("Failed to read results: {}", results_path.display()))?;
    let test_results: types::TestResults = serde_json::from_str(&results)
        .with_context(|| format!("Invalid results file: {}", results_path.display()))?;

    match format {
        "json" => json::generate(&test_results, output),
        "junit" => {
            let xml = junit::generate_junit_xml(&test_results)?;
            match output {
                Some(path) => {
                    std::fs::write(path, xml)?;
                    println!("JUnit report saved to: {}", path.display());
                }
                None => println!("{}", xml),
            }
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}

/// Write `test-results.json` and `junit.xml` into `output_dir`
pub fn write_reports(results: &types::TestResults, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    let report_path = output_dir.join("test-results.json");
    json::generate(results, Some(&report_path))?;
    junit::write_report(results, output_dir)?;

    println!(
        "\n{} Reports saved to: {}",
        "📄".to_string().blue(),
        output_dir.display().to_string().cyan()
    );
    Ok(())
}
