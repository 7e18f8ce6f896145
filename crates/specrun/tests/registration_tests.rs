//! Registration and selection behavior through the public suite surface.

use std::panic::{catch_unwind, AssertUnwindSafe};

use specrun::{
    Behavior, EngineError, Never, NestingPolicy, NullReporter, RunArgs, StylePolicy, Suite,
};

fn args_with(
    test_name: Option<&str>,
    include: &[&str],
    exclude: &[&str],
) -> RunArgs {
    RunArgs {
        test_name: test_name.map(|s| s.to_string()),
        include: include.iter().map(|s| s.to_string()).collect(),
        exclude: exclude.iter().map(|s| s.to_string()).collect(),
        ..RunArgs::default()
    }
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn flat_nesting_resolves_names_in_declaration_order() {
    let suite = Suite::new("stack");
    suite.define(|ctx| {
        ctx.describe("Stack", |ctx| {
            ctx.it("pop removes top", || {});
            ctx.it("push adds to top", || {});
        });
    });

    assert_eq!(
        suite.test_names(),
        vec!["Stack pop removes top", "Stack push adds to top"]
    );
}

#[test]
fn declaration_order_survives_deep_nesting() {
    let suite = Suite::new("ordering");
    suite.define(|ctx| {
        ctx.it("t1", || {});
        ctx.describe("scope", |ctx| {
            ctx.it("t2", || {});
            ctx.describe("deeper", |ctx| {
                ctx.it("t3", || {});
            });
            ctx.it("t4", || {});
        });
        ctx.it("t5", || {});
    });

    assert_eq!(
        suite.test_names(),
        vec!["t1", "scope t2", "scope deeper t3", "scope t4", "t5"]
    );
}

#[test]
fn same_spec_text_in_sibling_scopes_is_fine() {
    let suite = Suite::new("siblings");
    suite.define(|ctx| {
        ctx.describe("Queue", |ctx| {
            ctx.it("is empty at start", || {});
        });
        ctx.describe("Stack", |ctx| {
            ctx.it("is empty at start", || {});
        });
    });
    assert_eq!(suite.expected_test_count(), 2);
}

#[test]
fn duplicate_name_panics_during_construction() {
    let suite = Suite::new("duplicates");
    let result = catch_unwind(AssertUnwindSafe(|| {
        suite.define(|ctx| {
            ctx.describe("Stack", |ctx| {
                ctx.it("pop removes top", || {});
                ctx.it("pop removes top", || {});
            });
        });
    }));
    assert!(result.is_err());
}

// ============================================================================
// Tag filtering
// ============================================================================

#[test]
fn exclude_wins_over_include() {
    let suite = Suite::new("tags");
    suite.define(|ctx| {
        ctx.it_tagged("slow and flaky", &["slow", "flaky"], || {
            panic!("must not be selected");
        });
    });

    let summary = suite
        .run(&args_with(None, &["slow"], &["flaky"]), &NullReporter, &Never)
        .unwrap();
    assert_eq!(summary.passed + summary.failed + summary.pending, 0);
}

#[test]
fn include_filter_narrows_the_run() {
    let suite = Suite::new("narrowing");
    suite.define(|ctx| {
        ctx.it_tagged("db test", &["db"], || {});
        ctx.it("untagged test", || panic!("not included"));
    });

    let summary = suite
        .run(&args_with(None, &["db"], &[]), &NullReporter, &Never)
        .unwrap();
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 0);
}

#[test]
fn explicit_name_bypasses_ignore_and_tags() {
    use std::sync::atomic::{AtomicU32, Ordering};
    static RAN: AtomicU32 = AtomicU32::new(0);

    let suite = Suite::new("explicit");
    suite.define(|ctx| {
        ctx.ignore_tagged("runs only on request", &["flaky"], || {
            RAN.fetch_add(1, Ordering::SeqCst);
        });
    });

    let summary = suite
        .run(
            &args_with(Some("runs only on request"), &[], &["flaky"]),
            &NullReporter,
            &Never,
        )
        .unwrap();
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.ignored, 0);
    assert_eq!(RAN.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_explicit_name_is_a_run_error() {
    let suite = Suite::new("missing");
    suite.define(|ctx| {
        ctx.it("exists", || {});
    });

    let err = suite
        .run(&args_with(Some("does not exist"), &[], &[]), &NullReporter, &Never)
        .unwrap_err();
    assert_eq!(err, EngineError::NoSuchTest("does not exist".into()));
}

// ============================================================================
// Post-closure rejection
// ============================================================================

#[test]
fn every_registration_call_fails_after_run() {
    let suite = Suite::new("closed");
    suite.define(|ctx| {
        ctx.it("first", || {});
    });
    suite.run(&RunArgs::default(), &NullReporter, &Never).unwrap();

    let engine = suite.engine();
    assert_eq!(
        engine.register_test("late test", &[], || {}),
        Err(EngineError::RegistrationClosed)
    );
    assert_eq!(
        engine.register_ignored_test("late ignored", &[], || {}),
        Err(EngineError::RegistrationClosed)
    );
    assert_eq!(
        engine.scope("late scope", || Ok(())),
        Err(EngineError::RegistrationClosed)
    );
    let mut behavior = Behavior::new();
    behavior.test("late shared", || {});
    assert_eq!(
        engine.include_behavior(&behavior),
        Err(EngineError::RegistrationClosed)
    );

    // The DSL surface panics for the same condition.
    let result = catch_unwind(AssertUnwindSafe(|| {
        suite.define(|ctx| {
            ctx.it("after the fact", || {});
        });
    }));
    assert!(result.is_err());
}

#[test]
fn a_suite_can_be_run_more_than_once() {
    use std::sync::atomic::{AtomicU32, Ordering};
    static RUNS: AtomicU32 = AtomicU32::new(0);

    let suite = Suite::new("rerun");
    suite.define(|ctx| {
        ctx.it("counts runs", || {
            RUNS.fetch_add(1, Ordering::SeqCst);
        });
    });

    suite.run(&RunArgs::default(), &NullReporter, &Never).unwrap();
    suite.run(&RunArgs::default(), &NullReporter, &Never).unwrap();
    assert_eq!(RUNS.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Shared behaviors
// ============================================================================

fn stack_behavior() -> Behavior {
    let mut behavior = Behavior::new().with_declared_count(2);
    behavior.test("accepts a push", || {});
    behavior.test_tagged("rejects overflow", &["slow"], || {});
    behavior
}

#[test]
fn behavior_names_resolve_against_each_inclusion_site() {
    let behavior = stack_behavior();
    let suite = Suite::new("shared");
    suite.define(|ctx| {
        ctx.describe("a full stack", |ctx| {
            ctx.include_behavior(&behavior);
        });
        ctx.describe("an empty stack", |ctx| {
            ctx.include_behavior(&behavior);
        });
    });

    assert_eq!(
        suite.test_names(),
        vec![
            "a full stack accepts a push",
            "a full stack rejects overflow",
            "an empty stack accepts a push",
            "an empty stack rejects overflow",
        ]
    );
    assert_eq!(suite.expected_test_count(), 2 * behavior.expected_count());
}

#[test]
fn behavior_included_twice_in_one_scope_panics() {
    let behavior = stack_behavior();
    let suite = Suite::new("shared-dup");
    let result = catch_unwind(AssertUnwindSafe(|| {
        suite.define(|ctx| {
            ctx.describe("a stack", |ctx| {
                ctx.include_behavior(&behavior);
                ctx.include_behavior(&behavior);
            });
        });
    }));
    assert!(result.is_err());
}

// ============================================================================
// Style policies
// ============================================================================

#[test]
fn feature_style_rejects_nested_scopes() {
    let suite = Suite::with_policy(
        "features",
        StylePolicy {
            filler: None,
            nesting: NestingPolicy::TopLevelOnly,
        },
    );
    let result = catch_unwind(AssertUnwindSafe(|| {
        suite.define(|ctx| {
            ctx.describe("Feature: payments", |ctx| {
                ctx.describe("Feature: refunds", |_ctx| {});
            });
        });
    }));
    assert!(result.is_err());
}

#[test]
fn flat_style_filler_prefixes_trunk_tests() {
    let suite = Suite::with_policy(
        "flat",
        StylePolicy {
            filler: Some("it should".to_string()),
            nesting: NestingPolicy::AnyDepth,
        },
    );
    suite.define(|ctx| {
        ctx.it("compile", || {});
    });
    assert_eq!(suite.test_names(), vec!["it should compile"]);
}
