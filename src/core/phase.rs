//! Phase timing and reporting
//!
//! Every externally visible phase runs inside [`run_phase`], which records
//! wall-clock start and end, hands a [`PhaseResult`] to the [`Reporter`] and
//! returns the phase's own outcome untouched.

use std::future::Future;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::error::KboxError;
use crate::infra::process::ExitStatus;

/// Timing record for one phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseResult {
    pub phase_name: String,
    pub started_at: SystemTime,
    pub ended_at: SystemTime,
    pub exit_status: ExitStatus,
}

impl PhaseResult {
    /// Elapsed wall-clock time
    pub fn elapsed(&self) -> Duration {
        self.ended_at
            .duration_since(self.started_at)
            .unwrap_or_default()
    }

    /// One human-readable report line
    pub fn summary(&self) -> String {
        format!(
            "{} finished in {} ({})",
            self.phase_name,
            format_duration(self.elapsed()),
            self.exit_status
        )
    }

    /// Machine-readable report
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "phase": self.phase_name,
            "started_at": unix_seconds(self.started_at),
            "ended_at": unix_seconds(self.ended_at),
            "elapsed": format_duration(self.elapsed()),
            "elapsed_secs": self.elapsed().as_secs_f64(),
            "success": self.exit_status.success(),
            "exit_status": self.exit_status,
        })
    }
}

/// Receives phase reports and advisory diagnostics
pub trait Reporter {
    /// Called once per finished phase
    fn phase(&self, result: &PhaseResult);

    /// Called once per non-fatal diagnostic, such as a missing optional tool
    fn advisory(&self, warning: &KboxError);
}

/// Format a duration as `Xm Ys`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

fn unix_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Run `phase` under the timer and report it
pub async fn run_phase<F, T>(name: &str, reporter: &dyn Reporter, phase: F) -> Result<T, KboxError>
where
    F: Future<Output = Result<T, KboxError>>,
{
    tracing::info!("Phase '{name}' started");
    let started_at = SystemTime::now();
    let clock = Instant::now();

    let outcome = phase.await;

    let exit_status = match &outcome {
        Ok(_) => ExitStatus::SUCCESS,
        Err(e) => e.exit_status(),
    };
    let result = PhaseResult {
        phase_name: name.to_string(),
        started_at,
        ended_at: started_at + clock.elapsed(),
        exit_status,
    };
    tracing::info!("Phase {}", result.summary());
    reporter.phase(&result);

    outcome
}
