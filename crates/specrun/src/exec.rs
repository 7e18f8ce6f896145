//! Drives execution of selected tests and emits lifecycle events.
//!
//! Each test runs exactly once, wrapped in `catch_unwind`, with events
//! emitted in a fixed order: `TestStarting`, the terminal event, then any
//! info messages recorded during the body. Test N+1 never starts before
//! test N's terminal event. Execution within a suite is strictly
//! sequential, in declaration order.

use std::panic::{catch_unwind, panic_any, resume_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::event::{EventDetail, ReportEvent, Reporter, Stopper};
use crate::informer::InformerScope;
use crate::select::Selected;
use crate::state::RegistryState;
use crate::tree::{ScopeNode, TestEntry, TreeNode};

/// Panic payload reserved for the pending signal. Not an error: it means
/// "intentionally not yet implemented" and is reported as its own status.
pub struct PendingSignal;

/// Mark the current test as pending.
///
/// ```no_run
/// specrun::pending();
/// ```
pub fn pending() -> ! {
    panic_any(PendingSignal)
}

/// Panic payload for conditions severe enough that running further tests
/// would be unreliable. The executor re-raises it instead of attributing
/// it to the test that raised it.
pub struct FatalError {
    pub message: String,
}

/// Abort the entire run from inside a test body.
pub fn abort_run(message: &str) -> ! {
    panic_any(FatalError {
        message: message.to_string(),
    })
}

/// Terminal state of a single test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(Duration),
    Failed { message: String, duration: Duration },
    Pending,
    Ignored,
}

/// Aggregate results of one run, in the shape a console summary wants.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub ignored: usize,
    /// True when a stop request ended the run before all selected tests ran.
    pub stopped: bool,
    /// `"name: message"` per failure, in occurrence order.
    pub failures: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, entry: &TestEntry, outcome: &Outcome) {
        match outcome {
            Outcome::Succeeded(_) => self.passed += 1,
            Outcome::Failed { message, .. } => {
                self.failed += 1;
                self.failures
                    .push(format!("{}: {}", entry.resolved_name, message));
            }
            Outcome::Pending => self.pending += 1,
            Outcome::Ignored => self.ignored += 1,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run a single test and emit its lifecycle events.
///
/// With `will_ignore` set, the body is never invoked and exactly one
/// `TestIgnored` event is emitted. A [`FatalError`] payload is re-raised
/// after the informer context is restored, aborting the run.
pub fn run_one(entry: &TestEntry, will_ignore: bool, reporter: &dyn Reporter) -> Outcome {
    let name = entry.resolved_name.clone();

    if will_ignore {
        reporter.apply(&ReportEvent::new(EventDetail::TestIgnored { test_name: name }));
        return Outcome::Ignored;
    }

    reporter.apply(&ReportEvent::new(EventDetail::TestStarting {
        test_name: name.clone(),
    }));

    let scope = InformerScope::enter(&name);
    let start = Instant::now();
    let result = catch_unwind(AssertUnwindSafe(|| (entry.body)()));
    let duration = start.elapsed();
    // Restores the prior informer context on every path, including the
    // fatal re-raise below.
    let messages = scope.finish();

    let outcome = match result {
        Ok(()) => Outcome::Succeeded(duration),
        Err(payload) if payload.is::<PendingSignal>() => Outcome::Pending,
        Err(payload) if payload.is::<FatalError>() => resume_unwind(payload),
        Err(payload) => Outcome::Failed {
            message: panic_message(payload.as_ref()),
            duration,
        },
    };

    let terminal = match &outcome {
        Outcome::Succeeded(duration) => EventDetail::TestSucceeded {
            test_name: name.clone(),
            duration: *duration,
        },
        Outcome::Failed { message, duration } => EventDetail::TestFailed {
            test_name: name.clone(),
            message: message.clone(),
            duration: *duration,
        },
        Outcome::Pending => EventDetail::TestPending {
            test_name: name.clone(),
        },
        Outcome::Ignored => unreachable!("ignored outcome handled above"),
    };
    reporter.apply(&ReportEvent::new(terminal));

    // Info recorded during the body flushes after the terminal event so a
    // renderer can indent it under the final status line.
    for message in messages {
        reporter.apply(&ReportEvent::new(EventDetail::InfoProvided {
            message,
            test_name: Some(name.clone()),
        }));
    }

    outcome
}

/// Run the selected tests of a registration snapshot.
///
/// Walks the test tree depth-first so construction-time info leaves are
/// emitted in declaration position between tests. The stopper is polled
/// before each test; a test already in progress always completes.
pub fn run_suite(
    state: &RegistryState,
    selection: &[Selected],
    reporter: &dyn Reporter,
    stopper: &dyn Stopper,
) -> RunSummary {
    let mut will_ignore = vec![None; state.entries.len()];
    for selected in selection {
        will_ignore[selected.index] = Some(selected.will_ignore);
    }

    let mut summary = RunSummary::default();
    let finished = walk_scope(&state.trunk, state, &will_ignore, reporter, stopper, &mut summary);
    summary.stopped = !finished;
    summary
}

/// Returns false when a stop request cut the walk short.
fn walk_scope(
    scope: &ScopeNode,
    state: &RegistryState,
    will_ignore: &[Option<bool>],
    reporter: &dyn Reporter,
    stopper: &dyn Stopper,
    summary: &mut RunSummary,
) -> bool {
    for child in &scope.children {
        match child {
            TreeNode::Scope(inner) => {
                if !walk_scope(inner, state, will_ignore, reporter, stopper, summary) {
                    return false;
                }
            }
            TreeNode::Info(info) => {
                reporter.apply(&ReportEvent::new(EventDetail::InfoProvided {
                    message: info.message.clone(),
                    test_name: None,
                }));
            }
            TreeNode::Test(index) => {
                let Some(ignore) = will_ignore[*index] else {
                    continue;
                };
                if stopper.stop_requested() {
                    return false;
                }
                let entry = &state.entries[*index];
                let outcome = run_one(entry, ignore, reporter);
                summary.record(entry, &outcome);
            }
        }
    }
    true
}
