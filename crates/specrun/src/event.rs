//! Lifecycle events and the collaborator traits they flow through.
//!
//! The executor constructs [`ReportEvent`]s and hands them to a [`Reporter`];
//! rendering, serialization, and transport are all the reporter's problem.
//! Ordinals come from a process-wide counter so events from suites running
//! on different threads still have a total order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Position of an event in the process-wide total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(pub u64);

impl Ordinal {
    pub(crate) fn next() -> Ordinal {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Ordinal(NEXT.fetch_add(1, Ordering::SeqCst))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    TestStarting {
        test_name: String,
    },
    TestSucceeded {
        test_name: String,
        duration: Duration,
    },
    TestFailed {
        test_name: String,
        /// Derived from the failure's own message when it has one, else its
        /// debug rendering.
        message: String,
        duration: Duration,
    },
    /// The body signalled "intentionally not yet implemented". No duration
    /// is recorded for pending tests.
    TestPending {
        test_name: String,
    },
    /// The test was selected but marked ignored; its body never ran.
    TestIgnored {
        test_name: String,
    },
    InfoProvided {
        message: String,
        /// The test this message was recorded under, or `None` for messages
        /// recorded during suite construction.
        test_name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEvent {
    pub ordinal: Ordinal,
    pub detail: EventDetail,
}

impl ReportEvent {
    pub(crate) fn new(detail: EventDetail) -> Self {
        ReportEvent {
            ordinal: Ordinal::next(),
            detail,
        }
    }

    /// The test name the event is about, when there is one.
    pub fn test_name(&self) -> Option<&str> {
        match &self.detail {
            EventDetail::TestStarting { test_name }
            | EventDetail::TestSucceeded { test_name, .. }
            | EventDetail::TestFailed { test_name, .. }
            | EventDetail::TestPending { test_name }
            | EventDetail::TestIgnored { test_name } => Some(test_name),
            EventDetail::InfoProvided { test_name, .. } => test_name.as_deref(),
        }
    }
}

/// Receives every event the executor emits. Invoked synchronously, possibly
/// many times; delivery is best effort and there is no error contract.
pub trait Reporter {
    fn apply(&self, event: &ReportEvent);
}

/// A reporter that drops everything.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn apply(&self, _event: &ReportEvent) {}
}

/// A reporter that records events in arrival order. Useful for assertions
/// in tests and for tools that post-process a whole run.
#[derive(Default)]
pub struct CollectingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        CollectingReporter::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().expect("reporter poisoned").clone()
    }

    /// Just the event details, in arrival order.
    pub fn details(&self) -> Vec<EventDetail> {
        self.events().into_iter().map(|e| e.detail).collect()
    }
}

impl Reporter for CollectingReporter {
    fn apply(&self, event: &ReportEvent) {
        self.events.lock().expect("reporter poisoned").push(event.clone());
    }
}

/// Cooperative cancellation: polled between tests, never blocking, never
/// interrupting a test already in progress.
pub trait Stopper {
    fn stop_requested(&self) -> bool;
}

/// A stopper that never requests a stop.
pub struct Never;

impl Stopper for Never {
    fn stop_requested(&self) -> bool {
        false
    }
}

/// A shareable stop flag; clones observe the same request.
#[derive(Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        StopFlag::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl Stopper for StopFlag {
    fn stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Dispatches whole-suite run tasks. Concurrency across suites is layered
/// on top of the engine through this trait; within one suite tests always
/// run sequentially.
pub trait Distributor {
    fn apply(&self, task: Box<dyn FnOnce() + Send>);
}

/// Runs every task inline, on the calling thread, in submission order.
pub struct SerialDistributor;

impl Distributor for SerialDistributor {
    fn apply(&self, task: Box<dyn FnOnce() + Send>) {
        task();
    }
}
