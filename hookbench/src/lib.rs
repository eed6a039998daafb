#![warn(missing_docs)]
//! # hookbench
//!
//! Benchmark one callable from inside an ordinary test.
//!
//! A test marked with a benchmark target is run repeatedly. Each time the
//! body calls the target, the call is timed; setup and teardown between
//! iterations are not. After the test, the original callable is put back.
//! - **Interception**: the target is swapped for a timing wrapper in the
//!   test's [`Scope`] and restored afterwards, even when the test fails
//! - **Fixture-aware iterations**: every iteration runs setup, body, teardown
//! - **Fail-fast**: the first failing iteration ends the benchmark, keeping
//!   the samples of the iterations that completed
//! - **Summary table**: min / mean / median / stddev in microseconds, or JSON
//!
//! ## Quick Start
//!
//! ```ignore
//! use hookbench::prelude::*;
//!
//! fn calc_scope() -> Scope {
//!     let calculator = Object::class("Calculator")
//!         .with_fn("add", |args| Ok(json!(args.f64(0)? + args.f64(1)?)));
//!     Scope::new().with_local("calc", Object::instance_of(&calculator))
//! }
//!
//! #[hookbench::case(bench = "calc.add", iterations = 200, scope = calc_scope)]
//! fn test_add(scope: &Scope) -> anyhow::Result<()> {
//!     let sum = scope.call("calc.add", &Args::from_values([json!(2), json!(3)]))?;
//!     anyhow::ensure!(sum == json!(5.0));
//!     Ok(())
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     hookbench::run()
//! }
//! ```
//!
//! Run with `--bench` to benchmark; without it, marked tests run once like
//! any other test.

// Re-export core types
pub use hookbench_core::{
    Args, BenchError, BenchMarker, BenchmarkController, BenchmarkResult, BenchmarkSpec, Callable,
    Collector, DEFAULT_ITERATIONS, Disposition, HeapCollector, Member, Object, RegisteredCase,
    RunFlags, RunStatus, Scope, TestCase, TestDef, TestIdentity, run_iterations,
};

// Re-export the registration attribute
pub use hookbench_macros::case;

// Re-export reporting
pub use hookbench_report::{
    BufferSink, ColorMode, Emphasis, JsonReport, OutputFormat, Sink, TerminalSink,
    generate_json_report, render_summary,
};

// Re-export stats
pub use hookbench_stats::{SampleStore, Summary, compute_summary};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use anyhow;
    pub use inventory;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Args, Callable, Member, Object, Scope, case};
    pub use serde_json::json;
}

/// Run the hookbench CLI harness.
///
/// Call this from your test binary's `main()`:
/// ```ignore
/// fn main() {
///     hookbench::run().unwrap();
/// }
/// ```
pub use hookbench_cli::run;
