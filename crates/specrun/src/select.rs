//! Computes which registered tests a run request covers.
//!
//! Selection is a pure function of the request and the flat entry list.
//! Filtering narrows the list but never reorders it: output order is always
//! declaration order.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::tree::{TestEntry, IGNORE_TAG};

/// One selected test: its index in the flat entry list and whether the
/// executor should skip its body and report it as ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selected {
    pub index: usize,
    pub will_ignore: bool,
}

/// Select tests for a run request.
///
/// With an explicit `test_name`, exactly that test is returned and tag
/// filters do not apply at all — an explicit request always runs, even a
/// test carrying the implicit ignore tag. Otherwise a test is selected when
/// `include` is empty or intersects its tags, and `exclude` does not; on an
/// include/exclude overlap, exclude wins.
pub fn select(
    test_name: Option<&str>,
    include: &BTreeSet<String>,
    exclude: &BTreeSet<String>,
    entries: &[Arc<TestEntry>],
) -> Result<Vec<Selected>> {
    if let Some(name) = test_name {
        let index = entries
            .iter()
            .position(|e| e.resolved_name == name)
            .ok_or_else(|| EngineError::NoSuchTest(name.to_string()))?;
        return Ok(vec![Selected {
            index,
            will_ignore: false,
        }]);
    }

    let selected = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| {
            let included = include.is_empty() || entry.tags.intersection(include).next().is_some();
            let excluded = entry.tags.intersection(exclude).next().is_some();
            included && !excluded
        })
        .map(|(index, entry)| Selected {
            index,
            will_ignore: entry.tags.contains(IGNORE_TAG),
        })
        .collect();
    Ok(selected)
}
