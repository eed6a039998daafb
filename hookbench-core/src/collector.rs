//! Collector Suppression
//!
//! Optional exclusion of memory-reclamation pauses from measurements. Before
//! the measured call a [`CollectorGuard`] runs one collection pass and turns
//! automatic collection off; dropping the guard turns it back on. The guard
//! is dropped on every exit path, including unwinding out of a panicking
//! callable, so suppression can never leak past one invocation.

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide collection control
pub trait Collector {
    /// Reclaim what can be reclaimed now
    fn collect(&self);
    /// Stop automatic collection
    fn disable(&self);
    /// Resume automatic collection
    fn enable(&self);
}

/// Scoped suppression: collect + disable on acquire, enable on drop
#[must_use = "collection is re-enabled as soon as the guard is dropped"]
pub struct CollectorGuard<'a> {
    collector: &'a dyn Collector,
}

impl<'a> CollectorGuard<'a> {
    /// Collect, then disable automatic collection until the guard drops
    pub fn acquire(collector: &'a dyn Collector) -> Self {
        collector.collect();
        collector.disable();
        Self { collector }
    }
}

impl Drop for CollectorGuard<'_> {
    fn drop(&mut self) {
        self.collector.enable();
    }
}

static SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Whether automatic collection is currently suppressed.
///
/// Deferred-reclamation code (arenas, caches, epoch collectors) can consult
/// this to postpone work while a measured call is in flight.
pub fn collection_suppressed() -> bool {
    SUPPRESSED.load(Ordering::Acquire)
}

/// Collector backed by the process heap.
///
/// `collect` returns free heap pages to the OS where the allocator supports
/// it (glibc `malloc_trim`). `disable`/`enable` only flip the process-wide
/// [`collection_suppressed`] flag: Rust has no automatic collector to pause,
/// so suppression is advisory and affects only code that checks the flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapCollector;

impl Collector for HeapCollector {
    fn collect(&self) {
        #[cfg(all(target_os = "linux", target_env = "gnu"))]
        // SAFETY: malloc_trim only releases memory the allocator already owns
        // as free; it has no preconditions beyond a live glibc heap.
        unsafe {
            libc::malloc_trim(0);
        }
    }

    fn disable(&self) {
        SUPPRESSED.store(true, Ordering::Release);
    }

    fn enable(&self) {
        SUPPRESSED.store(false, Ordering::Release);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingCollector;
    use super::*;

    #[test]
    fn test_guard_order() {
        let collector = RecordingCollector::default();
        {
            let _guard = CollectorGuard::acquire(&collector);
            assert_eq!(collector.events(), vec!["collect", "disable"]);
        }
        assert_eq!(collector.events(), vec!["collect", "disable", "enable"]);
    }

    #[test]
    fn test_guard_reenables_on_panic() {
        let collector = RecordingCollector::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = CollectorGuard::acquire(&collector);
            panic!("measured call blew up");
        }));

        assert!(result.is_err());
        assert_eq!(collector.events().last(), Some(&"enable"));
    }

    #[test]
    fn test_heap_collector_flag() {
        let collector = HeapCollector;
        // collect alone never suppresses anything
        collector.collect();
        assert!(!collection_suppressed());
        {
            let _guard = CollectorGuard::acquire(&collector);
            assert!(collection_suppressed());
        }
        assert!(!collection_suppressed());
    }
}
