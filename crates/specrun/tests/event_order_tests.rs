//! Event protocol ordering through a full suite run.

use specrun::{CollectingReporter, EventDetail, Never, RunArgs, StopFlag, Suite};

fn run_collecting(suite: &Suite) -> Vec<EventDetail> {
    let reporter = CollectingReporter::new();
    suite.run(&RunArgs::default(), &reporter, &Never).unwrap();
    reporter.details()
}

#[test]
fn events_follow_declaration_order_across_scopes() {
    let suite = Suite::new("ordering");
    suite.define(|ctx| {
        ctx.describe("Stack", |ctx| {
            ctx.it("pop removes top", || {});
            ctx.it("push adds to top", || {});
        });
    });

    let details = run_collecting(&suite);
    let names: Vec<String> = details
        .iter()
        .filter_map(|d| match d {
            EventDetail::TestStarting { test_name } => Some(test_name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Stack pop removes top", "Stack push adds to top"]);
}

#[test]
fn ignored_test_emits_exactly_one_event() {
    let suite = Suite::new("ignored");
    suite.define(|ctx| {
        ctx.ignore("not today", || panic!("body must not run"));
    });

    let details = run_collecting(&suite);
    assert_eq!(
        details,
        vec![EventDetail::TestIgnored {
            test_name: "not today".into()
        }]
    );
}

#[test]
fn pending_test_emits_pending_and_run_continues() {
    let suite = Suite::new("pending");
    suite.define(|ctx| {
        ctx.it("unfinished", || specrun::pending());
        ctx.it("next one still runs", || {});
    });

    let reporter = CollectingReporter::new();
    let summary = suite.run(&RunArgs::default(), &reporter, &Never).unwrap();
    assert_eq!(summary.pending, 1);
    assert_eq!(summary.passed, 1);

    let details = reporter.details();
    assert_eq!(
        details
            .iter()
            .filter(|d| matches!(d, EventDetail::TestPending { .. }))
            .count(),
        1
    );
    assert!(!details
        .iter()
        .any(|d| matches!(d, EventDetail::TestFailed { .. })));
}

#[test]
fn construction_info_appears_in_declaration_position() {
    let suite = Suite::new("info");
    suite.define(|ctx| {
        ctx.describe("Service", |ctx| {
            ctx.info("configured with a fake clock");
            ctx.it("ticks", || {});
        });
    });

    let details = run_collecting(&suite);
    assert_eq!(
        details[0],
        EventDetail::InfoProvided {
            message: "configured with a fake clock".into(),
            test_name: None,
        }
    );
    assert!(matches!(&details[1], EventDetail::TestStarting { .. }));
}

#[test]
fn runtime_info_flushes_after_the_terminal_event() {
    let suite = Suite::new("runtime-info");
    suite.define(|ctx| {
        ctx.it("narrates itself", || {
            specrun::info("halfway there");
        });
    });

    let details = run_collecting(&suite);
    assert!(matches!(&details[0], EventDetail::TestStarting { .. }));
    assert!(matches!(&details[1], EventDetail::TestSucceeded { .. }));
    assert_eq!(
        details[2],
        EventDetail::InfoProvided {
            message: "halfway there".into(),
            test_name: Some("narrates itself".into()),
        }
    );
}

#[test]
fn ordinals_increase_across_one_run() {
    let suite = Suite::new("ordinals");
    suite.define(|ctx| {
        ctx.it("a", || {});
        ctx.it("b", || {});
    });

    let reporter = CollectingReporter::new();
    suite.run(&RunArgs::default(), &reporter, &Never).unwrap();
    let events = reporter.events();
    for pair in events.windows(2) {
        assert!(pair[0].ordinal < pair[1].ordinal);
    }
}

#[test]
fn stop_request_prevents_later_tests_from_starting() {
    let flag = StopFlag::new();
    let stopping = flag.clone();

    let suite = Suite::new("stopping");
    suite.define(move |ctx| {
        let stopping = stopping.clone();
        ctx.it("requests a stop", move || stopping.request_stop());
        ctx.it("never starts", || panic!("must not run"));
    });

    let reporter = CollectingReporter::new();
    let summary = suite.run(&RunArgs::default(), &reporter, &flag).unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.passed, 1);
    assert!(!reporter
        .details()
        .iter()
        .any(|d| matches!(d, EventDetail::TestStarting { test_name } if test_name == "never starts")));
}

#[test]
fn failure_event_carries_the_panic_message() {
    let suite = Suite::new("failure-message");
    suite.define(|ctx| {
        ctx.it("fails with context", || panic!("expected 4, got 5"));
    });

    let details = run_collecting(&suite);
    assert!(details.iter().any(|d| matches!(
        d,
        EventDetail::TestFailed { message, .. } if message == "expected 4, got 5"
    )));
}
