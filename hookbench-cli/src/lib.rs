#![warn(missing_docs)]
//! hookbench CLI Library
//!
//! Harness for test binaries that carry `#[hookbench::case]` tests.
//! Call `hookbench::run()` (or `hookbench_cli::run()`) from `main` to run
//! every registered test, benchmarking marked ones when `--bench` is given.
//!
//! # Example
//!
//! ```ignore
//! use hookbench::prelude::*;
//!
//! #[hookbench::case(bench = "calc.add", iterations = 50, scope = calc_scope)]
//! fn test_add(scope: &Scope) -> anyhow::Result<()> {
//!     scope.call("calc.add", &Args::from_values([json!(1), json!(2)]))?;
//!     Ok(())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     hookbench_cli::run()
//! }
//! ```

mod config;
mod planner;
mod runner;

pub use config::*;
pub use planner::{ExecutionPlan, build_plan};
pub use runner::{CaseOutcome, CaseStatus, Runner, SessionReport, case_id};

use clap::Parser;
use hookbench_core::{BenchmarkResult, RunFlags, TestDef};
use hookbench_report::{
    ColorMode, OutputFormat, TerminalSink, generate_json_report, render_summary, separator_line,
    terminal_width,
};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::io::Write;
use std::path::PathBuf;

/// hookbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "hookbench")]
#[command(author, version, about = "hookbench - benchmark one callable from inside your tests")]
pub struct Cli {
    /// Filter tests by regex on `Suite.name`
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Benchmark tests that carry a benchmark marker
    #[arg(long)]
    pub bench: bool,

    /// With --bench, skip tests that carry no benchmark marker
    #[arg(long)]
    pub bench_only: bool,

    /// With --bench, suppress collection around each measured call
    #[arg(long)]
    pub bench_disable_gc: bool,

    /// Iterations for markers that do not set their own
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub iterations: Option<u64>,

    /// Summary format: human, json
    #[arg(long)]
    pub format: Option<String>,

    /// Write the summary to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Table width in columns (default: terminal width)
    #[arg(long)]
    pub columns: Option<usize>,

    /// ANSI styling: auto, always, never
    #[arg(long)]
    pub color: Option<String>,

    /// Dry run - list tests without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Print a default hookbench.toml and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings after merging the config file with command-line flags
#[derive(Debug, Clone)]
pub struct Settings {
    /// Run modes
    pub flags: RunFlags,
    /// Iterations for markers without their own count
    pub default_iterations: u64,
    /// Summary format
    pub format: OutputFormat,
    /// ANSI styling
    pub color: ColorMode,
    /// Fixed table width
    pub columns: Option<usize>,
}

impl Settings {
    /// Merge `config` with `cli`. Boolean flags can only switch modes on;
    /// valued flags replace the file's value.
    pub fn resolve(cli: &Cli, config: &HookbenchConfig) -> anyhow::Result<Self> {
        let format = cli.format.as_deref().unwrap_or(&config.output.format);
        let color = cli.color.as_deref().unwrap_or(&config.output.color);

        Ok(Self {
            flags: RunFlags {
                bench_enabled: cli.bench || config.bench.enabled,
                bench_only: cli.bench_only || config.bench.only,
                disable_gc: cli.bench_disable_gc || config.bench.disable_gc,
            },
            default_iterations: cli.iterations.unwrap_or(config.bench.default_iterations),
            format: format.parse().map_err(anyhow::Error::msg)?,
            color: color.parse().map_err(anyhow::Error::msg)?,
            columns: cli.columns.or(config.output.columns),
        })
    }
}

/// Run the hookbench CLI with the process arguments.
/// This is the main entry point for test binaries.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
/// Exits the process with status 1 when a test fails.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the hookbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let filter = if cli.verbose {
        "hookbench=debug"
    } else {
        "hookbench=info"
    };
    // A host may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if cli.print_config {
        print!("{}", HookbenchConfig::default_toml());
        return Ok(());
    }

    let config = HookbenchConfig::discover().unwrap_or_default();
    let settings = Settings::resolve(&cli, &config)?;

    let filter = Regex::new(&cli.filter)
        .map_err(|e| anyhow::anyhow!("invalid filter '{}': {}", cli.filter, e))?;
    let plan = build_plan(inventory::iter::<TestDef>, Some(&filter));

    if cli.dry_run {
        list_cases(&plan, &settings);
        return Ok(());
    }

    let report = run_cases(&plan, &settings);

    if settings.flags.bench_enabled {
        write_summary(&report.results, &settings, cli.output.as_ref())?;
    }

    let width = terminal_width(settings.columns);
    println!("{}", separator_line('=', &report.summary_line(), width));

    if report.exit_code() != 0 {
        std::process::exit(report.exit_code());
    }
    Ok(())
}

/// Print the plan without running anything
fn list_cases(plan: &ExecutionPlan, settings: &Settings) {
    println!("hookbench Plan:");
    for def in &plan.cases {
        let marker = match def.spec(settings.default_iterations) {
            Some(Ok(spec)) => format!(" [bench: {} x{}]", spec.target(), spec.iterations()),
            Some(Err(e)) => format!(" [invalid bench: {}]", e),
            None => String::new(),
        };
        println!("├── {}{} (line {})", case_id(def), marker, def.line);
    }
    println!(
        "{} tests found, {} with a benchmark marker.",
        plan.cases.len(),
        plan.benchmarked()
    );
}

fn run_cases(plan: &ExecutionPlan, settings: &Settings) -> SessionReport {
    let mode = match (settings.flags.bench_enabled, settings.flags.bench_only) {
        (false, _) => "",
        (true, false) => " (benchmarks enabled)",
        (true, true) => " (benchmarks only)",
    };
    println!("collected {} items{}\n", plan.cases.len(), mode);

    let pb = ProgressBar::new(plan.cases.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut failures = Vec::new();
    let runner = Runner::new(settings.flags, settings.default_iterations);
    let report = runner.run(&plan.cases, |outcome| {
        pb.set_message(outcome.id.clone());
        pb.println(format!("{} {}", outcome.id, outcome.status.label()));
        if let CaseStatus::Failed(message) = &outcome.status {
            failures.push((outcome.id.clone(), message.clone()));
        }
        pb.inc(1);
    });
    pb.finish_and_clear();

    let width = terminal_width(settings.columns);
    if !failures.is_empty() {
        println!("\n{}", separator_line('=', "FAILURES", width));
        for (id, message) in &failures {
            println!("{}", separator_line('_', id, width));
            println!("{}\n", message);
        }
    }
    if let Some(reason) = &report.aborted {
        eprintln!("\nSession aborted: {}", reason);
    }
    report
}

/// Render benchmark results in the configured format
fn write_summary(
    results: &[BenchmarkResult],
    settings: &Settings,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    match (settings.format, output) {
        (OutputFormat::Json, None) => {
            println!("{}", generate_json_report(results)?);
        }
        (OutputFormat::Json, Some(path)) => {
            let mut file = std::fs::File::create(path)?;
            file.write_all(generate_json_report(results)?.as_bytes())?;
            println!("Report written to: {}", path.display());
        }
        (OutputFormat::Human, None) => {
            let width = terminal_width(settings.columns);
            let mut sink = TerminalSink::stdout(width, settings.color.enabled());
            render_summary(results, &mut sink)?;
            sink.into_inner()?;
        }
        (OutputFormat::Human, Some(path)) => {
            let width = terminal_width(settings.columns);
            let mut sink = TerminalSink::new(std::fs::File::create(path)?, width, false);
            render_summary(results, &mut sink)?;
            sink.into_inner()?;
            println!("Report written to: {}", path.display());
        }
    }
    Ok(())
}
