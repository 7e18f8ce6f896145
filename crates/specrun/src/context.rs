//! The closure-based registration surface handed to suite bodies.
//!
//! `Context` is a thin adapter over the engine: each method translates DSL
//! vocabulary into one engine call and panics on registration errors, so a
//! malformed suite fails loudly at construction time, before any test runs.

use crate::behavior::Behavior;
use crate::engine::Engine;
use crate::error::EngineError;

/// A lightweight handle for declaring suite structure.
///
/// `Context` is `Copy` so it can be passed into nested closures without
/// ceremony.
///
/// # Example
/// ```no_run
/// specrun::run(|ctx| {
///     ctx.describe("Stack", |ctx| {
///         ctx.it("pop removes top", || { assert_eq!(1 + 1, 2); });
///     });
/// });
/// ```
#[derive(Copy, Clone)]
pub struct Context<'a> {
    engine: &'a Engine,
}

impl<'a> Context<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Context { engine }
    }

    fn fail(err: EngineError) -> ! {
        panic!("specrun: {err}")
    }

    /// Open a description scope. Nested registrations happen synchronously
    /// inside `body`.
    pub fn describe(&self, name: &str, body: impl FnOnce(Context<'_>)) {
        self.engine
            .scope(name, || {
                body(Context::new(self.engine));
                Ok(())
            })
            .unwrap_or_else(|e| Self::fail(e));
    }

    /// Alias for [`describe`](Self::describe), reading better for
    /// condition-style scopes.
    pub fn context(&self, name: &str, body: impl FnOnce(Context<'_>)) {
        self.describe(name, body);
    }

    /// Register a test. Returns its resolved full name.
    pub fn it(&self, spec_text: &str, body: impl Fn() + Send + Sync + 'static) -> String {
        self.engine
            .register_test(spec_text, &[], body)
            .unwrap_or_else(|e| Self::fail(e))
    }

    /// Register a test carrying filterable tags.
    pub fn it_tagged(
        &self,
        spec_text: &str,
        tags: &[&str],
        body: impl Fn() + Send + Sync + 'static,
    ) -> String {
        self.engine
            .register_test(spec_text, tags, body)
            .unwrap_or_else(|e| Self::fail(e))
    }

    /// Register a test that is reported but not executed by default. The
    /// body is kept — requesting the test by exact name still runs it.
    pub fn ignore(&self, spec_text: &str, body: impl Fn() + Send + Sync + 'static) -> String {
        self.engine
            .register_ignored_test(spec_text, &[], body)
            .unwrap_or_else(|e| Self::fail(e))
    }

    pub fn ignore_tagged(
        &self,
        spec_text: &str,
        tags: &[&str],
        body: impl Fn() + Send + Sync + 'static,
    ) -> String {
        self.engine
            .register_ignored_test(spec_text, tags, body)
            .unwrap_or_else(|e| Self::fail(e))
    }

    /// Record a construction-time informational message at this position.
    pub fn info(&self, message: &str) {
        self.engine.info(message).unwrap_or_else(|e| Self::fail(e));
    }

    /// Splice a shared behavior's tests into the current scope. Returns the
    /// resolved names, in order.
    pub fn include_behavior(&self, behavior: &Behavior) -> Vec<String> {
        self.engine
            .include_behavior(behavior)
            .unwrap_or_else(|e| Self::fail(e))
    }
}
