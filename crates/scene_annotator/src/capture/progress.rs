//! Sweep progress reporting

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::CaptureSummary;
use crate::foundation::time::format_duration;

/// State after one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressReport {
    /// Subframe index just processed
    pub index: usize,
    /// Configurations processed so far, this one included
    pub completed: usize,
    /// Configurations in the sweep
    pub total: usize,
    /// Time since the sweep started
    pub elapsed: Duration,
    /// Time this configuration took
    pub step: Duration,
    /// Estimated time left: the last step's duration times the steps remaining
    pub eta: Duration,
    /// Image written (or attempted) for this configuration
    pub image_path: PathBuf,
}

impl ProgressReport {
    /// Fraction of the sweep done, `0.0` to `1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Receives progress from the capture driver
pub trait ProgressObserver {
    /// Called after every configuration
    fn on_progress(&mut self, report: &ProgressReport);

    /// Called once when the sweep ends
    fn on_finish(&mut self, _summary: &CaptureSummary) {}
}

/// Writes one progress line per configuration to stdout
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, report: &ProgressReport) {
        let name = report
            .image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut stdout = std::io::stdout().lock();
        // Progress output is best effort.
        let _ = writeln!(
            stdout,
            "[{:>width$}/{}] {:5.1}% {}  elapsed {}  eta {}",
            report.completed,
            report.total,
            report.fraction() * 100.0,
            name,
            format_duration(report.elapsed),
            format_duration(report.eta),
            width = report.total.to_string().len(),
        );
    }

    fn on_finish(&mut self, summary: &CaptureSummary) {
        println!("{summary}");
    }
}

/// Sends progress through the `log` facade at info level
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, report: &ProgressReport) {
        log::info!(
            "Captured {}/{} ({}) step {:.2}s eta {}",
            report.completed,
            report.total,
            report.image_path.display(),
            report.step.as_secs_f64(),
            format_duration(report.eta)
        );
    }

    fn on_finish(&mut self, summary: &CaptureSummary) {
        log::info!("{summary}");
    }
}

/// Discards progress
#[derive(Debug, Default)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn on_progress(&mut self, _report: &ProgressReport) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let report = ProgressReport {
            index: 4,
            completed: 5,
            total: 20,
            elapsed: Duration::from_secs(5),
            step: Duration::from_secs(1),
            eta: Duration::from_secs(15),
            image_path: PathBuf::from("frame_0004.png"),
        };
        assert!((report.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
