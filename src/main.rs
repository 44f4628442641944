use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use you_api_tester::utils::config::{Config, ConfigOverrides};
use you_api_tester::{report, runner};

#[derive(Parser)]
#[command(name = "you-api-tester")]
#[command(author = "NL Team")]
#[command(version = "0.1.0")]
#[command(about = "Smoke tests for the YOU API", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full check sequence (the default)
    Run(RunArgs),

    /// Generate report from test results
    Report {
        /// Path to test-results.json
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// API base URL, including the /api prefix
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write JSON and JUnit reports
    #[arg(long, default_value = "false")]
    report: bool,

    /// Output directory for reports
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RunArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        let config = Config::load(self.config.as_deref())?;
        Ok(config.merge(ConfigOverrides {
            base_url: self.base_url,
            timeout_ms: self.timeout_ms,
            output_dir: self.output,
            report: self.report,
        }))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run(args)) => run(args)?,
        None => run(cli.run)?,

        Some(Commands::Report {
            results,
            format,
            output,
        }) => {
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
        }
    }

    Ok(())
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = args.into_config()?;
    if config.report {
        println!("  Reports: {}", config.output_dir.display().to_string().cyan());
    }

    let summary = runner::run_tests(&config)?;
    log::info!(
        "Run {} finished: {}/{} passed",
        summary.session_id,
        summary.passed,
        summary.total
    );
    Ok(())
}
