//! The test tree: description scopes, test leaves, and info leaves.
//!
//! The tree mirrors the nesting of `describe` blocks as written. Child order
//! is declaration order and is semantically significant — tests enumerate
//! and execute exactly in the order they appear in the suite body.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// The implicit tag carried by tests registered through `ignore`.
///
/// The selector treats it as forcing non-execution unless the test is
/// requested by exact name or the run asks for ignored tests explicitly.
pub const IGNORE_TAG: &str = "specrun.Ignore";

/// A registered test's body. Failure is signalled by panicking; the pending
/// signal is a reserved panic payload (see [`crate::pending`]).
pub type TestBody = Arc<dyn Fn() + Send + Sync>;

/// A single registered test.
#[derive(Clone)]
pub struct TestEntry {
    /// The literal text passed to `it`.
    pub spec_text: String,
    /// Full name computed from the scope chain at registration time.
    pub resolved_name: String,
    pub tags: BTreeSet<String>,
    /// True when registered through `ignore` rather than `it`.
    pub ignored: bool,
    pub body: TestBody,
}

impl fmt::Debug for TestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestEntry")
            .field("resolved_name", &self.resolved_name)
            .field("tags", &self.tags)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

/// An informational message recorded during suite construction, emitted in
/// declaration position when the suite runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoEntry {
    pub message: String,
}

/// One child of a scope, in declaration order.
#[derive(Debug, Clone)]
pub enum TreeNode {
    Scope(ScopeNode),
    /// Index into the suite's flat entry list.
    Test(usize),
    Info(InfoEntry),
}

/// A description scope. The trunk is a nameless `ScopeNode` created once per
/// suite; every other node carries the text passed to `describe`.
#[derive(Debug, Clone, Default)]
pub struct ScopeNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl ScopeNode {
    pub fn named(name: impl Into<String>) -> Self {
        ScopeNode {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Navigate to the scope at `path`, where each element is an index into
    /// the previous scope's children.
    ///
    /// Panics if the path does not address a scope node; paths are produced
    /// by the registration engine and always valid by construction.
    pub fn scope_at(&self, path: &[usize]) -> &ScopeNode {
        let mut current = self;
        for &idx in path {
            match &current.children[idx] {
                TreeNode::Scope(child) => current = child,
                other => panic!("scope path addressed a non-scope node: {other:?}"),
            }
        }
        current
    }

    pub fn scope_at_mut(&mut self, path: &[usize]) -> &mut ScopeNode {
        let mut current = self;
        for &idx in path {
            match &mut current.children[idx] {
                TreeNode::Scope(child) => current = child,
                other => panic!("scope path addressed a non-scope node: {other:?}"),
            }
        }
        current
    }

    /// Scope names along `path`, outermost first. The trunk's empty name is
    /// not included.
    pub fn names_along(&self, path: &[usize]) -> Vec<String> {
        let mut names = Vec::with_capacity(path.len());
        let mut current = self;
        for &idx in path {
            match &current.children[idx] {
                TreeNode::Scope(child) => {
                    names.push(child.name.clone());
                    current = child;
                }
                other => panic!("scope path addressed a non-scope node: {other:?}"),
            }
        }
        names
    }

    /// Number of test leaves under this scope, without executing anything.
    pub fn test_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                TreeNode::Scope(scope) => scope.test_count(),
                TreeNode::Test(_) => 1,
                TreeNode::Info(_) => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(idx: usize) -> TreeNode {
        TreeNode::Test(idx)
    }

    #[test]
    fn counts_tests_across_nesting() {
        let mut trunk = ScopeNode::default();
        trunk.children.push(leaf(0));
        let mut inner = ScopeNode::named("inner");
        inner.children.push(leaf(1));
        inner.children.push(TreeNode::Info(InfoEntry {
            message: "note".into(),
        }));
        inner.children.push(leaf(2));
        trunk.children.push(TreeNode::Scope(inner));

        assert_eq!(trunk.test_count(), 3);
    }

    #[test]
    fn navigates_and_names_scope_paths() {
        let mut trunk = ScopeNode::default();
        let mut outer = ScopeNode::named("Stack");
        outer.children.push(TreeNode::Scope(ScopeNode::named("when empty")));
        trunk.children.push(TreeNode::Scope(outer));

        assert_eq!(trunk.scope_at(&[0, 0]).name, "when empty");
        assert_eq!(
            trunk.names_along(&[0, 0]),
            vec!["Stack".to_string(), "when empty".to_string()]
        );
    }
}
