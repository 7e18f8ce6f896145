//! Error taxonomy for registration and run entry points.
//!
//! Registration-time errors surface synchronously at the call site, before
//! any test runs. Test-body failures are never `EngineError`s — the executor
//! captures them and converts them into report events instead.

use thiserror::Error;

/// Errors produced by the registration engine, selector, and run entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A registration call arrived after the suite was already run.
    #[error("registration is closed: `run` has already been invoked on this suite")]
    RegistrationClosed,

    /// Two tests resolved to the identical full name.
    #[error("duplicate test name: \"{0}\" is already registered")]
    DuplicateTestName(String),

    /// The suite's style forbids opening a scope at this nesting depth.
    #[error("scope \"{0}\" may not be nested here under the suite's style policy")]
    NotAllowedNesting(String),

    /// An explicitly requested test name matched no registered test.
    #[error("no test named \"{0}\" is registered in this suite")]
    NoSuchTest(String),

    /// A test or scope name was empty or all whitespace.
    #[error("test and scope names must be non-empty")]
    EmptyName,

    /// The construction-escape race detector fired: a registration snapshot
    /// was replaced by another thread between read and swap.
    #[error("concurrent registration detected: the suite instance escaped during construction")]
    ConcurrentModification,

    /// A shared behavior declared an expected test count that does not match
    /// the tests it actually recorded.
    #[error("shared behavior declared {declared} tests but recorded {recorded}")]
    BehaviorCountMismatch { declared: usize, recorded: usize },
}

pub type Result<T> = std::result::Result<T, EngineError>;
