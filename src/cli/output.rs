//! Output formatting
//!
//! Phase reports go to stdout, one line per phase; diagnostics and
//! advisories go to stderr so they never mix with reports.

use crate::core::phase::{PhaseResult, Reporter};
use crate::error::KboxError;

/// Output settings selected by the global flags
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub quiet: bool,
    pub json: bool,
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Default log filter directive for these settings
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Format one phase report line
pub fn format_report(result: &PhaseResult) -> String {
    format!("==> {}", result.summary())
}

/// Reporter writing to the terminal
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    output: OutputConfig,
}

impl ConsoleReporter {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }
}

impl Reporter for ConsoleReporter {
    fn phase(&self, result: &PhaseResult) {
        if self.output.json {
            println!("{}", result.to_json());
        } else if !self.output.quiet || !result.exit_status.success() {
            println!("{}", format_report(result));
        }
    }

    fn advisory(&self, warning: &KboxError) {
        if !self.output.quiet {
            eprintln!("{} {warning}", status::WARNING);
        }
    }
}

/// Print an error and its causes to stderr
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Status message prefixes
pub mod status {
    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";
}
