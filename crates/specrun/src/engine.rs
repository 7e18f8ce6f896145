//! The registration engine: the mutating surface behind the DSL.
//!
//! Every operation reads the current snapshot, derives a replacement, and
//! swaps it in through the [`StateCell`]. The engine is Open until the suite
//! is first run, then Closed forever; every registration call checks the
//! flag and fails fast after closure.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::behavior::Behavior;
use crate::error::{EngineError, Result};
use crate::name;
use crate::state::{RegistryState, StateCell};
use crate::tree::{TestBody, TestEntry, IGNORE_TAG};

/// Where a style allows description scopes to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestingPolicy {
    /// Scopes nest freely (describe/context styles).
    #[default]
    AnyDepth,
    /// Scopes may only open directly under the trunk (feature-block styles,
    /// where a feature cannot nest inside another feature).
    TopLevelOnly,
}

/// Style-specific knobs the engine honors instead of hard-coding one style.
#[derive(Debug, Clone, Default)]
pub struct StylePolicy {
    /// Prefix for tests registered directly under the trunk, e.g.
    /// `"it should"` for flat styles. See [`crate::name::resolve`].
    pub filler: Option<String>,
    pub nesting: NestingPolicy,
}

/// The registration engine. One per suite instance; owns the only shared
/// mutable cell in the system.
pub struct Engine {
    cell: StateCell,
    policy: StylePolicy,
}

impl Engine {
    pub fn new(policy: StylePolicy) -> Self {
        Engine {
            cell: StateCell::default(),
            policy,
        }
    }

    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    pub fn snapshot(&self) -> Arc<RegistryState> {
        self.cell.snapshot()
    }

    /// Open a scope named `name`, run `body` (which registers nested entries
    /// through this engine, synchronously), then restore the previous scope.
    pub fn scope(&self, name: &str, body: impl FnOnce() -> Result<()>) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EngineError::EmptyName);
        }

        let base = self.cell.snapshot();
        if base.closed {
            return Err(EngineError::RegistrationClosed);
        }
        if self.policy.nesting == NestingPolicy::TopLevelOnly && !base.scope_path.is_empty() {
            return Err(EngineError::NotAllowedNesting(name.to_string()));
        }

        self.cell.swap(&base, base.with_entered_scope(name))?;
        let outcome = body();

        // The previous scope is restored even when the body errored, so the
        // caller observes a consistent registration point.
        let after = self.cell.snapshot();
        self.cell.swap(&after, after.with_left_scope())?;
        outcome
    }

    /// Register a test under the current scope. Returns the resolved name,
    /// usable for cross-referencing (e.g. rerunning by exact name).
    pub fn register_test(
        &self,
        spec_text: &str,
        tags: &[&str],
        body: impl Fn() + Send + Sync + 'static,
    ) -> Result<String> {
        self.register_impl(spec_text, tags, Arc::new(body), false)
    }

    /// Register a test that carries the implicit ignore tag. The body is
    /// retained — an explicit by-name request still runs it — but default
    /// selection reports it without execution.
    pub fn register_ignored_test(
        &self,
        spec_text: &str,
        tags: &[&str],
        body: impl Fn() + Send + Sync + 'static,
    ) -> Result<String> {
        self.register_impl(spec_text, tags, Arc::new(body), true)
    }

    fn register_impl(
        &self,
        spec_text: &str,
        tags: &[&str],
        body: TestBody,
        ignored: bool,
    ) -> Result<String> {
        let base = self.cell.snapshot();
        if base.closed {
            return Err(EngineError::RegistrationClosed);
        }

        let resolved_name =
            name::resolve(&base.ancestor_names(), spec_text, self.policy.filler.as_deref())?;

        let mut tag_set: BTreeSet<String> = tags.iter().map(|t| t.to_string()).collect();
        if ignored {
            tag_set.insert(IGNORE_TAG.to_string());
        }

        let next = base.with_test(TestEntry {
            spec_text: spec_text.to_string(),
            resolved_name: resolved_name.clone(),
            tags: tag_set,
            ignored,
            body,
        })?;
        self.cell.swap(&base, next)?;
        Ok(resolved_name)
    }

    /// Splice a shared behavior's tests into the current scope, preserving
    /// their relative order and re-resolving each name against this scope's
    /// ancestor chain. Returns the resolved names in order.
    pub fn include_behavior(&self, behavior: &Behavior) -> Result<Vec<String>> {
        if let Some(declared) = behavior.declared_count() {
            let recorded = behavior.tests().len();
            if declared != recorded {
                return Err(EngineError::BehaviorCountMismatch { declared, recorded });
            }
        }

        let mut names = Vec::with_capacity(behavior.tests().len());
        for test in behavior.tests() {
            let tags: Vec<&str> = test.tags.iter().map(String::as_str).collect();
            names.push(self.register_impl(&test.spec_text, &tags, test.body.clone(), false)?);
        }
        Ok(names)
    }

    /// Record an informational message at the current registration point.
    /// It is emitted as `InfoProvided` (with no test attribution) in
    /// declaration position when the suite runs.
    pub fn info(&self, message: &str) -> Result<()> {
        let base = self.cell.snapshot();
        if base.closed {
            return Err(EngineError::RegistrationClosed);
        }
        self.cell.swap(&base, base.with_info(message))?;
        Ok(())
    }

    /// Close registration and return the final snapshot. Idempotent; there
    /// is no transition back to Open.
    pub fn close(&self) -> Result<Arc<RegistryState>> {
        let base = self.cell.snapshot();
        if base.closed {
            return Ok(base);
        }
        self.cell.swap(&base, base.with_closed())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(StylePolicy::default())
    }
}
