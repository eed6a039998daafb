//! Interception Engine
//!
//! Redirects one scope attribute to an instrumented wrapper for the duration
//! of a test case, then writes the original back.
//!
//! ```text
//! install("calc.add")
//!   locate ─▶ Slot { owner: Calculator (type), attribute: "add", member: original }
//!   owner["add"] = wrapper(original)
//!
//! wrapper(args):
//!   [collector guard] ─ start ─ original(args) ─ stop ─ [release]
//!   Ok  → stage (stop − start) seconds in the Recorder
//!   Err → propagate unchanged, stage nothing
//!
//! uninstall():
//!   owner["add"] = original
//! ```
//!
//! Resolution completes before the first write, so a failed install leaves
//! the scope untouched.

use crate::collector::{Collector, CollectorGuard};
use crate::error::BenchError;
use crate::measure::Timer;
use crate::scope::{Callable, Member, Object, Scope, Target};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// Staging area for samples produced by the wrapper.
///
/// The iteration driver decides whether staged samples are committed to the
/// sample store (iteration succeeded) or discarded (iteration failed).
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pending: Rc<RefCell<Vec<f64>>>,
}

impl Recorder {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one elapsed time in seconds
    pub fn stage(&self, seconds: f64) {
        self.pending.borrow_mut().push(seconds);
    }

    /// Number of staged samples
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Remove and return staged samples in order
    pub fn take(&self) -> Vec<f64> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    /// Drop staged samples
    pub fn discard(&self) {
        self.pending.borrow_mut().clear();
    }
}

/// Installs instrumentation into scopes
#[derive(Clone, Default)]
pub struct Interceptor {
    collector: Option<Rc<dyn Collector>>,
}

impl Interceptor {
    /// Interceptor without collector suppression
    pub fn new() -> Self {
        Self::default()
    }

    /// Interceptor that suppresses `collector` around every measured call
    pub fn with_collector(collector: Rc<dyn Collector>) -> Self {
        Self {
            collector: Some(collector),
        }
    }

    /// Whether measured calls run under collector suppression
    pub fn suppresses_collection(&self) -> bool {
        self.collector.is_some()
    }

    /// Replace the callable at `target` with a timing wrapper feeding `recorder`
    pub fn install(
        &self,
        scope: &Scope,
        target: &str,
        recorder: &Recorder,
    ) -> Result<Installation, BenchError> {
        let target = Target::parse(target)?;
        let slot = scope.locate(&target)?;

        let original = match slot.member {
            Member::Callable(callable) => callable,
            other => {
                return Err(BenchError::Resolution {
                    target: target.to_string(),
                    reason: format!("'{}' is a {}, not a callable", target, other.kind_name()),
                });
            }
        };

        let wrapper = instrument(original.clone(), recorder.clone(), self.collector.clone());

        slot.owner
            .set_member(slot.attribute.clone(), wrapper.clone())
            .map_err(|e| BenchError::Resolution {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            path = %target,
            owner = %slot.owner.name(),
            "installed benchmark wrapper"
        );

        Ok(Installation {
            target: target.to_string(),
            owner: slot.owner,
            attribute: slot.attribute,
            original,
            wrapper,
            settled: false,
        })
    }
}

fn instrument(
    original: Callable,
    recorder: Recorder,
    collector: Option<Rc<dyn Collector>>,
) -> Callable {
    Callable::new(move |args| {
        let guard = collector.as_deref().map(|c| CollectorGuard::acquire(c));
        let timer = Timer::start();
        let result = original.call(args);
        let elapsed = timer.stop_secs();
        drop(guard);

        if result.is_ok() {
            recorder.stage(elapsed);
        }
        result
    })
}

/// A live substitution; owes exactly one restoration
#[derive(Debug)]
pub struct Installation {
    target: String,
    owner: Object,
    attribute: String,
    original: Callable,
    wrapper: Callable,
    settled: bool,
}

impl Installation {
    /// Dotted path that was instrumented
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The callable that was replaced
    pub fn original(&self) -> &Callable {
        &self.original
    }

    /// The wrapper currently installed
    pub fn wrapper(&self) -> &Callable {
        &self.wrapper
    }

    /// Object whose attribute was replaced
    pub fn owner(&self) -> &Object {
        &self.owner
    }

    /// Write the original callable back into its slot
    pub fn uninstall(mut self) -> Result<(), BenchError> {
        self.settled = true;
        self.restore()
    }

    fn restore(&self) -> Result<(), BenchError> {
        let restoration = |reason: String| BenchError::Restoration {
            target: self.target.clone(),
            reason,
        };

        match self.owner.own_member(&self.attribute) {
            Some(Member::Callable(current)) if current.ptr_eq(&self.wrapper) => {}
            Some(Member::Callable(_)) => {
                warn!(path = %self.target, "benchmark target was replaced during the run; restoring original");
            }
            Some(other) => {
                return Err(restoration(format!(
                    "'{}' now holds a {}, refusing to overwrite it",
                    self.attribute,
                    other.kind_name()
                )));
            }
            None => {
                warn!(path = %self.target, "benchmark target was removed during the run; restoring original");
            }
        }

        self.owner
            .set_member(self.attribute.clone(), self.original.clone())
            .map_err(|e| restoration(e.to_string()))?;

        debug!(path = %self.target, "restored original callable");
        Ok(())
    }
}

impl Drop for Installation {
    fn drop(&mut self) {
        if !self.settled {
            self.settled = true;
            if let Err(e) = self.restore() {
                warn!(error = %e, "restoration on drop failed");
            }
        }
    }
}
