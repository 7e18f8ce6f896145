//! # specrun — a spec-style test registration and execution engine
//!
//! Declare tests with `describe`/`it` nesting, tag them, select a subset by
//! tag or exact name, and run them with lifecycle events delivered to a
//! pluggable [`Reporter`].
//!
//! ## Quick example
//!
//! ```rust,no_run
//! fn main() {
//!     specrun::run(|ctx| {
//!         ctx.describe("Stack", |ctx| {
//!             ctx.it("pop removes top", || {
//!                 let mut stack = vec![1, 2, 3];
//!                 assert_eq!(stack.pop(), Some(3));
//!             });
//!
//!             ctx.it_tagged("handles a million pushes", &["slow"], || {
//!                 // filtered out with `--exclude slow`
//!             });
//!         });
//!     });
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Tests enumerate, select, and execute in declaration order; filtering
//!   narrows the set but never reorders it.
//! - Resolved test names are unique per suite; collisions fail at
//!   registration time, before anything runs.
//! - Registration closes permanently when a suite is first run; later
//!   registration calls fail with [`EngineError::RegistrationClosed`].
//! - Each test's terminal event precedes its buffered info messages, and
//!   test N's terminal event precedes test N+1's starting event.
//!
//! ## Features
//!
//! - `googletest` — re-exports `googletest` matchers via `specrun::matchers`

mod behavior;
mod console;
mod context;
mod engine;
mod error;
mod event;
mod exec;
mod informer;
mod name;
mod select;
mod state;
mod tree;

pub use behavior::{Behavior, BehaviorTest};
pub use console::{print_summary, ConsoleReporter, RunConfig};
pub use context::Context;
pub use engine::{Engine, NestingPolicy, StylePolicy};
pub use error::{EngineError, Result};
pub use event::{
    CollectingReporter, Distributor, EventDetail, Never, NullReporter, Ordinal, ReportEvent,
    Reporter, SerialDistributor, StopFlag, Stopper,
};
pub use exec::{abort_run, pending, run_one, FatalError, Outcome, PendingSignal, RunSummary};
pub use informer::info;
pub use select::{select, Selected};
pub use state::{RegistryState, StateCell};
pub use tree::{InfoEntry, ScopeNode, TestBody, TestEntry, TreeNode, IGNORE_TAG};

/// Re-export of the [`googletest`] crate. Available with the `googletest` feature.
#[cfg(feature = "googletest")]
pub use googletest;

/// Composable matchers re-exported from [`googletest::prelude`].
#[cfg(feature = "googletest")]
pub mod matchers {
    pub use googletest::prelude::*;
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

// ============================================================================
// Run request
// ============================================================================

/// Everything a run request carries besides the collaborators.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Run exactly this test, by resolved name, bypassing tag filters.
    pub test_name: Option<String>,
    /// Tags to include; empty means "no include restriction".
    pub include: BTreeSet<String>,
    /// Tags to exclude; wins over `include` on overlap.
    pub exclude: BTreeSet<String>,
    /// Execute tests the selector marked as ignored anyway.
    pub include_ignored: bool,
    /// Opaque configuration passed through to callers; the engine does not
    /// interpret it.
    pub config: BTreeMap<String, String>,
}

// ============================================================================
// Suite
// ============================================================================

/// A named test suite: a registration engine plus the structure declared
/// into it.
///
/// Registration happens through [`Suite::define`]; the first call to
/// [`Suite::run`] closes registration permanently.
pub struct Suite {
    name: String,
    engine: Engine,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Suite::with_policy(name, StylePolicy::default())
    }

    /// A suite using style-specific naming and nesting rules.
    pub fn with_policy(name: impl Into<String>, policy: StylePolicy) -> Self {
        Suite {
            name: name.into(),
            engine: Engine::new(policy),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare the suite's structure. Registration errors panic here, at
    /// construction time — a malformed suite never reaches `run`.
    pub fn define(&self, body: impl FnOnce(Context<'_>)) -> &Self {
        body(Context::new(&self.engine));
        self
    }

    /// The engine, for registration surfaces layered on top of the closure
    /// DSL (alternative style front ends, reflective adapters).
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Number of registered tests, counted from the tree without executing.
    pub fn expected_test_count(&self) -> usize {
        self.engine.snapshot().trunk.test_count()
    }

    /// Resolved test names in declaration order.
    pub fn test_names(&self) -> Vec<String> {
        self.engine
            .snapshot()
            .entries
            .iter()
            .map(|e| e.resolved_name.clone())
            .collect()
    }

    /// Close registration, select, and execute.
    ///
    /// Test failures do not surface here — they arrive as events and in the
    /// summary. The errors this returns are request-level:
    /// [`EngineError::NoSuchTest`] for an unknown explicit name, or
    /// [`EngineError::ConcurrentModification`] from the escape detector.
    pub fn run(
        &self,
        args: &RunArgs,
        reporter: &dyn Reporter,
        stopper: &dyn Stopper,
    ) -> Result<RunSummary> {
        let state = self.engine.close()?;
        let mut selection = select(
            args.test_name.as_deref(),
            &args.include,
            &args.exclude,
            &state.entries,
        )?;
        if args.include_ignored {
            for selected in &mut selection {
                selected.will_ignore = false;
            }
        }
        Ok(exec::run_suite(&state, &selection, reporter, stopper))
    }
}

/// Run several suites sequentially with one aggregate summary, polling the
/// stopper between suites.
pub fn run_suites(
    suites: &[Suite],
    args: &RunArgs,
    reporter: &dyn Reporter,
    stopper: &dyn Stopper,
) -> Result<RunSummary> {
    let mut total = RunSummary::default();
    for suite in suites {
        if stopper.stop_requested() {
            total.stopped = true;
            break;
        }
        let summary = suite.run(args, reporter, stopper)?;
        total.passed += summary.passed;
        total.failed += summary.failed;
        total.pending += summary.pending;
        total.ignored += summary.ignored;
        total.stopped |= summary.stopped;
        total.failures.extend(summary.failures);
    }
    Ok(total)
}

/// Dispatch whole suites through a [`Distributor`].
///
/// This is where cross-suite concurrency layers on: a concurrent
/// distributor may run suites in parallel, but tests within each suite
/// still run sequentially, in declaration order. Request-level errors are
/// reported to stderr from within the task since dispatch is
/// fire-and-forget.
pub fn distribute_suites(
    suites: Vec<Arc<Suite>>,
    args: RunArgs,
    reporter: Arc<dyn Reporter + Send + Sync>,
    distributor: &dyn Distributor,
) {
    for suite in suites {
        let args = args.clone();
        let reporter = reporter.clone();
        distributor.apply(Box::new(move || {
            if let Err(err) = suite.run(&args, reporter.as_ref(), &Never) {
                eprintln!("specrun: suite \"{}\" not run: {err}", suite.name());
            }
        }));
    }
}

// ============================================================================
// run() — console entry point
// ============================================================================

/// Build and run a suite, printing results to the console.
///
/// This is the main entry point for standalone spec binaries. Call it from
/// `fn main()` in a test target with `harness = false`. Exits nonzero when
/// any test fails.
pub fn run(body: impl FnOnce(Context<'_>)) {
    let config = RunConfig::from_args();
    let suite = Suite::new("");
    suite.define(body);

    if config.list {
        let state = suite.engine.snapshot();
        for entry in &state.entries {
            if entry.ignored {
                println!("{} (ignored)", entry.resolved_name);
            } else {
                println!("{}", entry.resolved_name);
            }
        }
        return;
    }

    let reporter = ConsoleReporter::new();
    let start = Instant::now();
    println!();
    let summary = match suite.run(&config.args, &reporter, &Never) {
        Ok(summary) => summary,
        Err(err) => {
            eprintln!("specrun: {err}");
            std::process::exit(2);
        }
    };
    print_summary(&summary, start.elapsed());

    if summary.failed > 0 {
        std::process::exit(1);
    }
}
