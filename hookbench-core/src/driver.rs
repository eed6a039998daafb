//! Iteration Driver
//!
//! Runs an instrumented test body a fixed number of times with the test's
//! own setup and teardown around every iteration:
//!
//! ```text
//! tear_down()                        undo the host's setup (iteration 0)
//! for i in 1..=N:
//!     set_up() ─ call(args) ─ tear_down()
//!     ok  → commit staged samples to the store
//!     err → discard staged samples, stop
//! ```
//!
//! Only calls that go through the installed wrapper produce samples, so
//! fixture cost never reaches the store.

use crate::case::TestCase;
use crate::error::BenchError;
use crate::intercept::Recorder;
use hookbench_stats::SampleStore;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, trace};

/// Run `iterations` instrumented iterations of `test`.
///
/// Fail-fast: the first failing iteration stops the loop and is returned as
/// [`BenchError::Iteration`]. Samples from earlier iterations stay in `store`.
pub fn run_iterations(
    test: &mut dyn TestCase,
    iterations: u64,
    recorder: &Recorder,
    store: &mut SampleStore,
) -> Result<(), BenchError> {
    let args = test.args().clone();
    recorder.discard();

    guarded(|| test.tear_down()).map_err(|source| BenchError::Iteration {
        iteration: 0,
        source,
    })?;

    for iteration in 1..=iterations {
        let outcome = guarded(|| {
            test.set_up()?;
            test.call(&args)?;
            test.tear_down()
        });

        match outcome {
            Ok(()) => {
                let samples = recorder.take();
                trace!(iteration, samples = samples.len(), "iteration complete");
                store.extend(samples);
            }
            Err(source) => {
                recorder.discard();
                debug!(iteration, error = %source, "iteration failed; stopping");
                return Err(BenchError::Iteration { iteration, source });
            }
        }
    }

    Ok(())
}

/// Run `f`, turning a panic into an error
fn guarded<F>(f: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|panic| Err(anyhow::anyhow!(panic_message(&*panic))))
}

/// Best-effort text of a panic payload
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
