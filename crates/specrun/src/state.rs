//! The registration snapshot and its atomically-replaced cell.
//!
//! Every registration call produces a whole new [`RegistryState`] and swaps
//! it in with a compare-and-swap on snapshot identity. Construction is
//! assumed single-threaded; the swap exists solely to catch the case where
//! the suite instance escapes its constructor to another thread, and it
//! fails loudly instead of losing one thread's registrations.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, Result};
use crate::tree::{InfoEntry, ScopeNode, TestEntry, TreeNode};

/// An immutable snapshot of everything registered so far.
#[derive(Debug, Clone, Default)]
pub struct RegistryState {
    /// Flat list of tests in declaration order.
    pub entries: Vec<Arc<TestEntry>>,
    /// Resolved name → tags, for tests that carry at least one tag.
    pub tags_by_name: BTreeMap<String, BTreeSet<String>>,
    /// The description tree; test leaves index into `entries`.
    pub trunk: ScopeNode,
    /// Child-index path from the trunk to the currently open scope.
    pub scope_path: Vec<usize>,
    /// Set irreversibly when the suite is first run.
    pub closed: bool,
}

impl RegistryState {
    /// Names of the scopes enclosing the current registration point,
    /// outermost first.
    pub fn ancestor_names(&self) -> Vec<String> {
        self.trunk.names_along(&self.scope_path)
    }

    pub fn contains_test(&self, resolved_name: &str) -> bool {
        self.entries.iter().any(|e| e.resolved_name == resolved_name)
    }

    /// A copy with a new scope opened under the current one and made current.
    pub fn with_entered_scope(&self, name: &str) -> RegistryState {
        let mut next = self.clone();
        let current = next.trunk.scope_at_mut(&next.scope_path);
        current.children.push(TreeNode::Scope(ScopeNode::named(name)));
        let idx = current.children.len() - 1;
        next.scope_path.push(idx);
        next
    }

    /// A copy with the current scope closed, restoring its parent.
    pub fn with_left_scope(&self) -> RegistryState {
        let mut next = self.clone();
        next.scope_path
            .pop()
            .expect("left a scope that was never entered");
        next
    }

    /// A copy with `entry` appended to the current scope and the flat list.
    ///
    /// Fails with [`EngineError::DuplicateTestName`] when a test with the
    /// same resolved name is already present.
    pub fn with_test(&self, entry: TestEntry) -> Result<RegistryState> {
        if self.contains_test(&entry.resolved_name) {
            return Err(EngineError::DuplicateTestName(entry.resolved_name));
        }

        let mut next = self.clone();
        let index = next.entries.len();
        if !entry.tags.is_empty() {
            next.tags_by_name
                .insert(entry.resolved_name.clone(), entry.tags.clone());
        }
        next.entries.push(Arc::new(entry));
        next.trunk
            .scope_at_mut(&next.scope_path)
            .children
            .push(TreeNode::Test(index));
        Ok(next)
    }

    /// A copy with an info message recorded at the current position.
    pub fn with_info(&self, message: &str) -> RegistryState {
        let mut next = self.clone();
        next.trunk
            .scope_at_mut(&next.scope_path)
            .children
            .push(TreeNode::Info(InfoEntry {
                message: message.to_string(),
            }));
        next
    }

    /// A copy with registration closed. There is no way back to open.
    pub fn with_closed(&self) -> RegistryState {
        let mut next = self.clone();
        next.closed = true;
        next
    }
}

/// The single shared handle to the current [`RegistryState`].
///
/// `swap` is a one-shot race detector, not a lock: it never blocks waiting
/// for a stale base to become current, and a failed swap is always surfaced
/// as [`EngineError::ConcurrentModification`].
#[derive(Debug)]
pub struct StateCell {
    inner: Mutex<Arc<RegistryState>>,
}

impl StateCell {
    pub fn new(state: RegistryState) -> Self {
        StateCell {
            inner: Mutex::new(Arc::new(state)),
        }
    }

    pub fn snapshot(&self) -> Arc<RegistryState> {
        self.inner.lock().expect("registry cell poisoned").clone()
    }

    /// Replace the current snapshot with `next`, provided the current
    /// snapshot is still `base`.
    pub fn swap(&self, base: &Arc<RegistryState>, next: RegistryState) -> Result<Arc<RegistryState>> {
        let mut guard = self.inner.lock().expect("registry cell poisoned");
        if !Arc::ptr_eq(&guard, base) {
            return Err(EngineError::ConcurrentModification);
        }
        let next = Arc::new(next);
        *guard = next.clone();
        Ok(next)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        StateCell::new(RegistryState::default())
    }
}
