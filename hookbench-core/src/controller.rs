//! Benchmark Controller
//!
//! Per-test state machine tying the pieces together:
//!
//! ```text
//!            arm (install)                 disarm (uninstall + record)
//!   Idle ──────────────────▶ Armed ──────────────────────────────▶ Idle
//!                              │ run_armed (iteration driver)
//!                              ▼
//!                        samples accumulate
//! ```
//!
//! `before_test` performs the whole cycle. `after_test` disarms whatever is
//! still armed and is safe to call any number of times. A failed restoration
//! poisons the controller: every later call returns
//! [`BenchError::SessionAborted`].

use crate::case::{TestCase, TestIdentity};
use crate::collector::{Collector, HeapCollector};
use crate::driver::run_iterations;
use crate::error::BenchError;
use crate::intercept::{Installation, Interceptor, Recorder};
use crate::{BenchmarkSpec, RunFlags};
use hookbench_stats::{SampleStore, Summary};
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// What the host should do with the test after `before_test`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Not benchmarked; run the body normally
    Run,
    /// Skip the test without running it
    Skip {
        /// Human-readable skip reason
        reason: String,
    },
    /// The body already ran under instrumentation; do not run it again
    Benchmarked,
}

/// How far the iterations of a benchmark got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every requested iteration succeeded
    Completed,
    /// Stopped at `iteration` (0 = the teardown before the first iteration)
    Failed {
        /// Failing iteration number
        iteration: u64,
    },
    /// Armed, then disarmed before the iterations ran
    NotRun,
}

/// Finished benchmark of one test case
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    identity: TestIdentity,
    target: String,
    iterations: u64,
    status: RunStatus,
    store: SampleStore,
}

impl BenchmarkResult {
    /// Assemble a result; the controller does this on disarm
    pub fn new(
        identity: TestIdentity,
        target: impl Into<String>,
        iterations: u64,
        status: RunStatus,
        store: SampleStore,
    ) -> Self {
        Self {
            identity,
            target: target.into(),
            iterations,
            status,
            store,
        }
    }

    /// Test that was benchmarked
    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    /// Instrumented target path
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Requested iteration count
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Outcome of the iterations
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Collected samples
    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    /// Statistics over the collected samples
    pub fn summary(&self) -> Summary {
        self.store.summary()
    }
}

struct Armed {
    identity: TestIdentity,
    target: String,
    iterations: u64,
    installation: Installation,
    recorder: Recorder,
    store: SampleStore,
    status: RunStatus,
}

/// Owns the interceptor, the armed test and the session's results
pub struct BenchmarkController {
    flags: RunFlags,
    interceptor: Interceptor,
    armed: Option<Armed>,
    results: Vec<BenchmarkResult>,
    poisoned: bool,
}

impl BenchmarkController {
    /// Controller suppressing the heap collector when `flags.disable_gc` is set
    pub fn new(flags: RunFlags) -> Self {
        Self::with_collector(flags, Rc::new(HeapCollector))
    }

    /// Controller suppressing `collector` when `flags.disable_gc` is set
    pub fn with_collector(flags: RunFlags, collector: Rc<dyn Collector>) -> Self {
        let interceptor = if flags.disable_gc {
            Interceptor::with_collector(collector)
        } else {
            Interceptor::new()
        };

        Self {
            flags,
            interceptor,
            armed: None,
            results: Vec::new(),
            poisoned: false,
        }
    }

    /// Run-mode flags in effect
    pub fn flags(&self) -> RunFlags {
        self.flags
    }

    /// Why a test with this marker should be skipped, if it should
    pub fn skip_reason(&self, spec: Option<&BenchmarkSpec>) -> Option<String> {
        (self.flags.bench_enabled && self.flags.bench_only && spec.is_none())
            .then(|| "no associated benchmark".to_string())
    }

    /// Decide what happens to `test`, benchmarking it when it carries a spec.
    ///
    /// For a benchmarked test this arms, runs every iteration and disarms.
    /// The result is recorded even when an iteration fails; that failure is
    /// then returned so the host can report the test as failed.
    pub fn before_test(
        &mut self,
        test: &mut dyn TestCase,
        spec: Option<&BenchmarkSpec>,
    ) -> Result<Disposition, BenchError> {
        self.ensure_live()?;

        if !self.flags.bench_enabled {
            return Ok(Disposition::Run);
        }

        let Some(spec) = spec else {
            return Ok(match self.skip_reason(None) {
                Some(reason) => {
                    debug!(test = %test.identity().qualified_name(), %reason, "skipping");
                    Disposition::Skip { reason }
                }
                None => Disposition::Run,
            });
        };

        self.arm(&*test, spec)?;
        let run = self.run_armed(test);
        self.after_test()?;
        run.map(|()| Disposition::Benchmarked)
    }

    /// Install instrumentation for `test`. Nothing is recorded on failure.
    pub fn arm(&mut self, test: &dyn TestCase, spec: &BenchmarkSpec) -> Result<(), BenchError> {
        self.ensure_live()?;

        if self.armed.is_some() {
            warn!("previous benchmark was still armed; disarming it first");
            self.after_test()?;
        }

        let recorder = Recorder::new();
        let installation = self
            .interceptor
            .install(test.scope(), spec.target(), &recorder)?;

        debug!(
            test = %test.identity().qualified_name(),
            path = spec.target(),
            iterations = spec.iterations(),
            "armed"
        );

        self.armed = Some(Armed {
            identity: test.identity().clone(),
            target: spec.target().to_string(),
            iterations: spec.iterations(),
            installation,
            recorder,
            store: SampleStore::with_capacity(spec.iterations().min(1 << 16) as usize),
            status: RunStatus::NotRun,
        });
        Ok(())
    }

    /// Drive the armed benchmark's iterations
    pub fn run_armed(&mut self, test: &mut dyn TestCase) -> Result<(), BenchError> {
        self.ensure_live()?;
        let armed = self.armed.as_mut().ok_or(BenchError::NotArmed)?;

        let outcome = run_iterations(test, armed.iterations, &armed.recorder, &mut armed.store);
        armed.status = match &outcome {
            Ok(()) => RunStatus::Completed,
            Err(BenchError::Iteration { iteration, .. }) => RunStatus::Failed {
                iteration: *iteration,
            },
            Err(_) => RunStatus::NotRun,
        };
        outcome
    }

    /// Restore the target and record the result if a benchmark is armed.
    ///
    /// Idempotent. A restoration failure poisons the controller.
    pub fn after_test(&mut self) -> Result<(), BenchError> {
        let Some(armed) = self.armed.take() else {
            return Ok(());
        };

        let Armed {
            identity,
            target,
            iterations,
            installation,
            recorder,
            store,
            status,
        } = armed;
        recorder.discard();

        let restored = installation.uninstall();

        let result = BenchmarkResult::new(identity, target, iterations, status, store);
        info!(
            test = %result.identity.qualified_name(),
            samples = result.store.count(),
            status = ?result.status,
            "benchmark recorded"
        );
        self.results.push(result);

        if let Err(e) = restored {
            error!(error = %e, "restoration failed; aborting benchmark session");
            self.poisoned = true;
            return Err(e);
        }
        Ok(())
    }

    /// Whether a benchmark is currently armed
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Whether a restoration failure ended the session
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Results recorded so far, in execution order
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Disarm anything left armed and hand over every result
    pub fn finalize(mut self) -> Vec<BenchmarkResult> {
        if let Err(e) = self.after_test() {
            warn!(error = %e, "final disarm failed");
        }
        std::mem::take(&mut self.results)
    }

    fn ensure_live(&self) -> Result<(), BenchError> {
        if self.poisoned {
            Err(BenchError::SessionAborted)
        } else {
            Ok(())
        }
    }
}

impl Drop for BenchmarkController {
    fn drop(&mut self) {
        if self.armed.is_some() && !std::thread::panicking() {
            if let Err(e) = self.after_test() {
                warn!(error = %e, "disarm on drop failed");
            }
        }
    }
}
