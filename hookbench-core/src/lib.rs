#![warn(missing_docs)]
//! hookbench Core - Benchmark Controller
//!
//! This crate measures one designated callable from inside a test:
//! - `Scope`/`Object` registry through which test bodies reach their callables
//! - `Interceptor` swapping a registry entry for a timing wrapper and back
//! - `run_iterations` repeating the body with per-iteration setup/teardown
//! - `BenchmarkController` arming, running and disarming per test case
//! - Optional collector suppression around each measured call

mod case;
mod collector;
mod controller;
mod driver;
mod error;
mod intercept;
mod measure;
pub mod scope;

pub use case::{RegisteredCase, TestCase, TestIdentity};
pub use collector::{Collector, CollectorGuard, HeapCollector, collection_suppressed};
pub use controller::{BenchmarkController, BenchmarkResult, Disposition, RunStatus};
pub use driver::{panic_message, run_iterations};
pub use error::BenchError;
pub use intercept::{Installation, Interceptor, Recorder};
pub use measure::Timer;
pub use scope::{Args, Callable, Member, Object, Scope};

// Re-export for the registration macro
pub use inventory;

/// Iteration count used when a benchmark marker does not set one
pub const DEFAULT_ITERATIONS: u64 = 100;

/// Which callable to measure and how many times to run the test body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSpec {
    target: String,
    iterations: u64,
}

impl BenchmarkSpec {
    /// Validate a benchmark request
    pub fn new(target: impl Into<String>, iterations: u64) -> Result<Self, BenchError> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(BenchError::InvalidSpec(
                "benchmark target must not be empty".to_string(),
            ));
        }
        if iterations == 0 {
            return Err(BenchError::InvalidSpec(format!(
                "'{}' requests 0 iterations; at least 1 is required",
                target
            )));
        }
        Ok(Self { target, iterations })
    }

    /// Benchmark request using [`DEFAULT_ITERATIONS`]
    pub fn with_default_iterations(target: impl Into<String>) -> Result<Self, BenchError> {
        Self::new(target, DEFAULT_ITERATIONS)
    }

    /// Dotted path of the measured callable
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Number of iterations
    pub fn iterations(&self) -> u64 {
        self.iterations
    }
}

/// Run-mode switches owned by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunFlags {
    /// Benchmark marked tests
    pub bench_enabled: bool,
    /// Skip tests that carry no benchmark marker
    pub bench_only: bool,
    /// Suppress collection around each measured call
    pub disable_gc: bool,
}

/// Benchmark marker attached by `#[hookbench::case(bench = ...)]`
#[derive(Debug, Clone, Copy)]
pub struct BenchMarker {
    /// Dotted path of the callable to measure
    pub target: &'static str,
    /// Requested iterations; `None` uses the session default
    pub iterations: Option<u64>,
}

/// Test definition registered via `#[hookbench::case]`
#[derive(Debug, Clone)]
pub struct TestDef {
    /// Test function name
    pub name: &'static str,
    /// Enclosing suite name
    pub suite: Option<&'static str>,
    /// Source file path
    pub file: &'static str,
    /// Source line number
    pub line: u32,
    /// Module path
    pub module_path: &'static str,
    /// Benchmark marker, absent for plain tests
    pub bench: Option<BenchMarker>,
    /// Builds a fresh scope for one run of the test
    pub scope_fn: fn() -> Scope,
    /// Per-iteration setup fixture
    pub setup_fn: Option<fn(&Scope) -> anyhow::Result<()>>,
    /// Per-iteration teardown fixture
    pub teardown_fn: Option<fn(&Scope) -> anyhow::Result<()>>,
    /// The test body
    pub body_fn: fn(&Scope, &Args) -> anyhow::Result<()>,
}

impl TestDef {
    /// `Suite.name`, or just `name` without a suite
    pub fn qualified_name(&self) -> String {
        match self.suite {
            Some(suite) => format!("{}.{}", suite, self.name),
            None => self.name.to_string(),
        }
    }

    /// Benchmark request of this test, if it carries a marker
    pub fn spec(&self, default_iterations: u64) -> Option<Result<BenchmarkSpec, BenchError>> {
        self.bench.map(|marker| {
            BenchmarkSpec::new(
                marker.target,
                marker.iterations.unwrap_or(default_iterations),
            )
        })
    }
}

inventory::collect!(TestDef);

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_scope() -> Scope {
        Scope::new()
    }

    fn noop(_: &Scope, _: &Args) -> anyhow::Result<()> {
        Ok(())
    }

    fn def(bench: Option<BenchMarker>) -> TestDef {
        TestDef {
            name: "test_add",
            suite: None,
            file: "tests/calc.rs",
            line: 1,
            module_path: "calc",
            bench,
            scope_fn: empty_scope,
            setup_fn: None,
            teardown_fn: None,
            body_fn: noop,
        }
    }

    #[test]
    fn test_spec_validation() {
        assert!(BenchmarkSpec::new("calc.add", 1).is_ok());
        assert!(matches!(
            BenchmarkSpec::new("calc.add", 0),
            Err(BenchError::InvalidSpec(_))
        ));
        assert!(matches!(
            BenchmarkSpec::new("  ", 5),
            Err(BenchError::InvalidSpec(_))
        ));
        assert_eq!(
            BenchmarkSpec::with_default_iterations("f").unwrap().iterations(),
            DEFAULT_ITERATIONS
        );
    }

    #[test]
    fn test_def_spec_uses_default_iterations() {
        let marker = BenchMarker {
            target: "calc.add",
            iterations: None,
        };
        let spec = def(Some(marker)).spec(42).unwrap().unwrap();
        assert_eq!(spec.iterations(), 42);

        assert!(def(None).spec(42).is_none());
    }

    #[test]
    fn test_def_qualified_name() {
        let mut d = def(None);
        assert_eq!(d.qualified_name(), "test_add");
        d.suite = Some("CalcTests");
        assert_eq!(d.qualified_name(), "CalcTests.test_add");
    }

    #[test]
    fn test_flags_default_off() {
        let flags = RunFlags::default();
        assert!(!flags.bench_enabled && !flags.bench_only && !flags.disable_gc);
    }
}
