//! Console front end: process-arg parsing, a colored line-per-event
//! reporter, and the end-of-run summary block.
//!
//! ```text
//! ✓ Stack pop removes top
//! ✗ Stack push adds to top
//!     Error: assertion failed
//! - Stack handles overflow
//! ```

use std::time::Duration;

use crate::event::{EventDetail, ReportEvent, Reporter};
use crate::exec::RunSummary;
use crate::RunArgs;

// ============================================================================
// ANSI color helpers
// ============================================================================

fn use_color() -> bool {
    // Respect NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::IsTerminal::is_terminal(&std::io::stdout())
}

fn green(s: &str) -> String {
    if use_color() {
        format!("\x1b[32m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn red(s: &str) -> String {
    if use_color() {
        format!("\x1b[31m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn yellow(s: &str) -> String {
    if use_color() {
        format!("\x1b[33m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn dim(s: &str) -> String {
    if use_color() {
        format!("\x1b[2m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

// ============================================================================
// Configuration parsed from command-line args
// ============================================================================

/// Run configuration for the console entry point.
pub struct RunConfig {
    pub args: RunArgs,
    /// Only list tests, don't run them.
    pub list: bool,
}

impl RunConfig {
    /// Parse from the process args (compatible with `cargo test -- <args>`).
    pub fn from_args() -> Self {
        Self::parse(std::env::args().skip(1))
    }

    fn parse(mut args: impl Iterator<Item = String>) -> Self {
        let mut config = RunConfig {
            args: RunArgs::default(),
            list: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--list" => config.list = true,
                "--include-ignored" | "--ignored" => config.args.include_ignored = true,
                "--include" => {
                    if let Some(tag) = args.next() {
                        config.args.include.insert(tag);
                    }
                }
                "--exclude" => {
                    if let Some(tag) = args.next() {
                        config.args.exclude.insert(tag);
                    }
                }
                arg if !arg.starts_with('-') => {
                    config.args.test_name = Some(arg.to_string());
                }
                _ => {} // ignore unknown flags
            }
        }

        config
    }
}

// ============================================================================
// Reporter
// ============================================================================

/// Prints one status line per terminal event, with info messages indented
/// under the test they belong to.
#[derive(Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        ConsoleReporter
    }
}

fn time_suffix(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms > 100 {
        format!(" {}", dim(&format!("({ms}ms)")))
    } else {
        String::new()
    }
}

impl Reporter for ConsoleReporter {
    fn apply(&self, event: &ReportEvent) {
        match &event.detail {
            EventDetail::TestStarting { .. } => {}
            EventDetail::TestSucceeded { test_name, duration } => {
                println!("{} {}{}", green("✓"), test_name, time_suffix(*duration));
            }
            EventDetail::TestFailed {
                test_name,
                message,
                duration,
            } => {
                println!("{} {}{}", red("✗"), red(test_name), time_suffix(*duration));
                println!("    {}", red(&format!("Error: {message}")));
            }
            EventDetail::TestPending { test_name } => {
                println!("{} {}", yellow("-"), dim(test_name));
            }
            EventDetail::TestIgnored { test_name } => {
                println!("{} {}", dim("~"), dim(&format!("{test_name} (ignored)")));
            }
            EventDetail::InfoProvided { message, test_name } => {
                let line = dim(&format!("info: {message}"));
                if test_name.is_some() {
                    println!("    {line}");
                } else {
                    println!("{line}");
                }
            }
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

pub fn print_summary(summary: &RunSummary, elapsed: Duration) {
    let elapsed_str = format!("{:.3}s", elapsed.as_secs_f64());

    let parts: Vec<String> = [
        (summary.passed > 0).then(|| green(&format!("{} passed", summary.passed))),
        (summary.failed > 0).then(|| red(&format!("{} failed", summary.failed))),
        (summary.pending > 0).then(|| yellow(&format!("{} pending", summary.pending))),
        (summary.ignored > 0).then(|| dim(&format!("{} ignored", summary.ignored))),
    ]
    .into_iter()
    .flatten()
    .collect();

    let counts = format!("{} ({})", parts.join(", "), dim(&elapsed_str));

    println!();
    if summary.failed > 0 {
        println!("{}", red("FAIL"));
        println!("{counts}");
        println!();
        println!("Failures:");
        for (i, failure) in summary.failures.iter().enumerate() {
            println!("  {}. {}", i + 1, failure);
        }
        println!();
    } else {
        println!("{}", green("PASS"));
        println!("{counts}");
        if summary.stopped {
            println!("{}", yellow("stopped early by request"));
        }
    }
}
