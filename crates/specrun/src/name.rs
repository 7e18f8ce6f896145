//! Resolves the full, human-readable name of a test from its scope chain.

use crate::error::{EngineError, Result};

/// Compute a test's full name from its ancestor scope names and spec text.
///
/// Ancestor names are joined with single spaces, outermost first, then the
/// spec text is appended: `["Stack", "when empty"]` + `"reports zero size"`
/// becomes `"Stack when empty reports zero size"`.
///
/// For a test registered directly under the trunk (empty chain), `filler`
/// is prepended when present, so flat styles can render `"it should <text>"`.
/// The filler never applies once the test sits inside a scope.
///
/// Pure and deterministic: the same inputs always produce the same name.
pub fn resolve(ancestors: &[String], spec_text: &str, filler: Option<&str>) -> Result<String> {
    if spec_text.trim().is_empty() {
        return Err(EngineError::EmptyName);
    }

    if ancestors.is_empty() {
        return Ok(match filler {
            Some(filler) => format!("{filler} {spec_text}"),
            None => spec_text.to_string(),
        });
    }

    let mut name = ancestors.join(" ");
    name.push(' ');
    name.push_str(spec_text);
    Ok(name)
}
