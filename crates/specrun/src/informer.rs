//! The per-test informer context.
//!
//! [`crate::info`] is valid in two places: inside a test body while the
//! executor is driving it (messages buffer and flush after the test's
//! terminal event), and during suite construction via
//! [`crate::Context::info`] (messages land in the tree as info leaves).
//! Anywhere else it is an illegal state.

use std::cell::RefCell;

thread_local! {
    static ACTIVE: RefCell<Option<ActiveTest>> = const { RefCell::new(None) };
}

struct ActiveTest {
    test_name: String,
    messages: Vec<String>,
}

/// Record an informational message for the currently running test.
///
/// Messages are emitted as `InfoProvided` events after the test's terminal
/// event, in the order they were recorded, so renderers can indent them
/// under the final status line.
///
/// # Panics
///
/// Panics when called outside of a running test. Use
/// [`crate::Context::info`] for construction-time messages.
pub fn info(message: &str) {
    ACTIVE.with(|cell| {
        let mut slot = cell.borrow_mut();
        match slot.as_mut() {
            Some(active) => active.messages.push(message.to_string()),
            None => panic!(
                "specrun: info() called outside of a running test; \
                 use Context::info during suite construction"
            ),
        }
    });
}

/// RAII scope marking a test as the active informer target on this thread.
///
/// The executor enters the scope before invoking the body and must restore
/// the prior context on every exit path; `Drop` covers the paths that do
/// not go through [`InformerScope::finish`].
pub(crate) struct InformerScope {
    finished: bool,
}

impl InformerScope {
    pub(crate) fn enter(test_name: &str) -> InformerScope {
        ACTIVE.with(|cell| {
            let prior = cell.borrow_mut().replace(ActiveTest {
                test_name: test_name.to_string(),
                messages: Vec::new(),
            });
            assert!(
                prior.is_none(),
                "informer scope entered while another test was active"
            );
        });
        InformerScope { finished: false }
    }

    /// Close the scope, returning the messages recorded while it was active.
    pub(crate) fn finish(mut self) -> Vec<String> {
        self.finished = true;
        ACTIVE.with(|cell| {
            cell.borrow_mut()
                .take()
                .map(|active| active.messages)
                .unwrap_or_default()
        })
    }
}

impl Drop for InformerScope {
    fn drop(&mut self) {
        if !self.finished {
            ACTIVE.with(|cell| {
                cell.borrow_mut().take();
            });
        }
    }
}

/// Name of the test currently active on this thread, if any.
#[allow(dead_code)]
pub(crate) fn active_test_name() -> Option<String> {
    ACTIVE.with(|cell| cell.borrow().as_ref().map(|a| a.test_name.clone()))
}
