//! Shared behaviors: pre-recorded test fragments spliced into a suite.
//!
//! A behavior records `(spec text, tags, body)` triples once and can be
//! included from several description contexts. Names are re-resolved against
//! the including scope, so the same fragment yields distinct test names per
//! inclusion site.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::tree::TestBody;

pub struct BehaviorTest {
    pub spec_text: String,
    pub tags: BTreeSet<String>,
    pub body: TestBody,
}

/// An ordered fragment of tests, reusable across scopes.
///
/// ```
/// use specrun::Behavior;
///
/// let mut behavior = Behavior::new();
/// behavior.test("pushes and pops", || { assert_eq!(1 + 1, 2); });
/// behavior.test_tagged("handles capacity", &["slow"], || {});
/// assert_eq!(behavior.expected_count(), 2);
/// ```
#[derive(Default)]
pub struct Behavior {
    tests: Vec<BehaviorTest>,
    declared: Option<usize>,
}

impl Behavior {
    pub fn new() -> Self {
        Behavior::default()
    }

    /// Declare how many tests this behavior is expected to record, so
    /// including suites can report aggregate counts without executing.
    /// Checked against the recorded tests at inclusion time.
    pub fn with_declared_count(mut self, count: usize) -> Self {
        self.declared = Some(count);
        self
    }

    pub fn test(&mut self, spec_text: &str, body: impl Fn() + Send + Sync + 'static) {
        self.test_tagged(spec_text, &[], body);
    }

    pub fn test_tagged(
        &mut self,
        spec_text: &str,
        tags: &[&str],
        body: impl Fn() + Send + Sync + 'static,
    ) {
        self.tests.push(BehaviorTest {
            spec_text: spec_text.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            body: Arc::new(body),
        });
    }

    pub fn tests(&self) -> &[BehaviorTest] {
        &self.tests
    }

    /// The declared count when one was given, otherwise the recorded count.
    pub fn expected_count(&self) -> usize {
        self.declared.unwrap_or(self.tests.len())
    }

    pub fn declared_count(&self) -> Option<usize> {
        self.declared
    }
}
