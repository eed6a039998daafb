//! Test Runner
//!
//! Host side of the benchmark controller: runs each planned test the way a
//! test framework would and lets the controller take over marked ones.
//!
//! ```text
//! skip? ──yes──▶ SKIPPED
//!   │no
//! set_up ─ before_test ─┬─ Run         → body(args)
//!                       ├─ Benchmarked → (body already ran N times)
//!                       └─ Err         → FAILED
//!        ─ tear_down ─ after_test
//! ```
//!
//! A restoration failure aborts the session; remaining tests are not run.

use hookbench_core::{
    BenchError, BenchmarkController, BenchmarkResult, Disposition, RegisteredCase, RunFlags,
    TestCase, TestDef, panic_message,
};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseStatus {
    /// Ran (or was benchmarked) without error
    Passed,
    /// Failed with the given message
    Failed(String),
    /// Not run, with the skip reason
    Skipped(String),
}

impl CaseStatus {
    /// Upper-case label printed next to the test name
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "PASSED",
            CaseStatus::Failed(_) => "FAILED",
            CaseStatus::Skipped(_) => "SKIPPED",
        }
    }
}

/// One finished test case
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    /// `file::Suite::name` identifier
    pub id: String,
    /// What happened
    pub status: CaseStatus,
    /// Whether the body ran under benchmark instrumentation
    pub benchmarked: bool,
    /// Wall time spent on the test
    pub duration: Duration,
}

/// Everything a session produced
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Per-test outcomes in execution order
    pub outcomes: Vec<CaseOutcome>,
    /// Benchmark results in execution order
    pub results: Vec<BenchmarkResult>,
    /// Set when a restoration failure stopped the session
    pub aborted: Option<String>,
    /// Total wall time
    pub duration: Duration,
}

impl SessionReport {
    /// Number of passed tests
    pub fn passed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Passed))
    }

    /// Number of failed tests
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Failed(_)))
    }

    /// Number of skipped tests
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, CaseStatus::Skipped(_)))
    }

    /// Process exit code: 1 if anything failed or the session aborted
    pub fn exit_code(&self) -> i32 {
        if self.failed() > 0 || self.aborted.is_some() {
            1
        } else {
            0
        }
    }

    /// One-line summary, e.g. `3 passed, 1 skipped in 0.12s`
    pub fn summary_line(&self) -> String {
        let mut parts = Vec::new();
        for (count, label) in [
            (self.failed(), "failed"),
            (self.passed(), "passed"),
            (self.skipped(), "skipped"),
        ] {
            if count > 0 {
                parts.push(format!("{} {}", count, label));
            }
        }
        if self.aborted.is_some() {
            parts.push("session aborted".to_string());
        }
        if parts.is_empty() {
            parts.push("no tests ran".to_string());
        }
        format!("{} in {:.2}s", parts.join(", "), self.duration.as_secs_f64())
    }

    fn count(&self, pred: impl Fn(&CaseStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// Runs planned test cases through a benchmark controller
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    flags: RunFlags,
    default_iterations: u64,
}

impl Runner {
    /// Runner with the given run modes and default iteration count
    pub fn new(flags: RunFlags, default_iterations: u64) -> Self {
        Self {
            flags,
            default_iterations,
        }
    }

    /// Run every case in order, reporting each outcome to `observe`
    pub fn run<F>(&self, cases: &[&'static TestDef], mut observe: F) -> SessionReport
    where
        F: FnMut(&CaseOutcome),
    {
        let session_start = Instant::now();
        let mut controller = BenchmarkController::new(self.flags);
        let mut report = SessionReport::default();

        for &def in cases {
            let start = Instant::now();
            let (status, benchmarked) = self.run_case(&mut controller, def);

            if let Err(e) = controller.after_test() {
                report.aborted.get_or_insert_with(|| e.to_string());
            }

            let outcome = CaseOutcome {
                id: case_id(def),
                status,
                benchmarked,
                duration: start.elapsed(),
            };
            debug!(id = %outcome.id, status = outcome.status.label(), "case finished");
            observe(&outcome);
            report.outcomes.push(outcome);

            if controller.is_poisoned() {
                let reason = report
                    .aborted
                    .get_or_insert_with(|| BenchError::SessionAborted.to_string());
                error!(%reason, "benchmark session aborted");
                break;
            }
        }

        report.results = controller.finalize();
        report.duration = session_start.elapsed();
        report
    }

    fn run_case(
        &self,
        controller: &mut BenchmarkController,
        def: &'static TestDef,
    ) -> (CaseStatus, bool) {
        let spec = match def.spec(self.default_iterations).transpose() {
            Ok(spec) => spec,
            Err(e) => return (CaseStatus::Failed(e.to_string()), false),
        };

        if let Some(reason) = controller.skip_reason(spec.as_ref()) {
            return (CaseStatus::Skipped(reason), false);
        }

        let mut case = RegisteredCase::new(def);

        if let Err(e) = guarded(|| case.set_up()) {
            return (CaseStatus::Failed(format!("setup failed: {:#}", e)), false);
        }

        let (mut status, benchmarked) = match controller.before_test(&mut case, spec.as_ref()) {
            Ok(Disposition::Run) => {
                let args = case.args().clone();
                match guarded(|| case.call(&args)) {
                    Ok(()) => (CaseStatus::Passed, false),
                    Err(e) => (CaseStatus::Failed(format!("{:#}", e)), false),
                }
            }
            Ok(Disposition::Benchmarked) => (CaseStatus::Passed, true),
            Ok(Disposition::Skip { reason }) => (CaseStatus::Skipped(reason), false),
            Err(e) => {
                let ran = matches!(e, BenchError::Iteration { .. });
                (CaseStatus::Failed(e.to_string()), ran)
            }
        };

        if let Err(e) = guarded(|| case.tear_down()) {
            if status == CaseStatus::Passed {
                status = CaseStatus::Failed(format!("teardown failed: {:#}", e));
            }
        }

        (status, benchmarked)
    }
}

/// `file::Suite::name`, the identifier printed per test
pub fn case_id(def: &TestDef) -> String {
    match def.suite {
        Some(suite) => format!("{}::{}::{}", def.file, suite, def.name),
        None => format!("{}::{}", def.file, def.name),
    }
}

fn guarded<F>(f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|panic| Err(anyhow::anyhow!("panicked: {}", panic_message(&*panic))))
}
