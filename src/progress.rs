//! Progress reporting utilities using indicatif.
//!
//! The core reports through the [`ProgressCallback`] trait and never draws
//! anything itself. [`Progress`] is the terminal implementation used by the
//! binary: a spinner while scanning, then bars for fingerprinting and
//! deletion.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::actions::delete::{BatchDeleteResult, DeleteProgressCallback};

/// Progress callback for the detection phases.
///
/// Implement this trait to receive progress updates during
/// the duplicate detection pipeline.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`"scan"` or `"fingerprint"`)
    /// * `total` - Total number of items to process, 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items done so far (1-based)
    /// * `path` - Name of the item just processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    scan: Mutex<Option<ProgressBar>>,
    fingerprint: Mutex<Option<ProgressBar>>,
    delete: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// With `quiet` set nothing is drawn.
    ///
    /// ```
    /// use dupecat::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            scan: Mutex::new(None),
            fingerprint: Mutex::new(None),
            delete: Mutex::new(None),
            quiet,
        }
    }

    fn scan_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style(color: &str) -> ProgressStyle {
        let template = format!(
            "[{{elapsed_precise}}] [{{bar:40.{color}/blue}}] {{pos}}/{{len}} ({{percent}}%) {{msg}} (ETA: {{eta}})"
        );
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "scan" => Some(&self.scan),
            "fingerprint" => Some(&self.fingerprint),
            "delete" => Some(&self.delete),
            _ => None,
        }
    }

    fn store(slot: &Mutex<Option<ProgressBar>>, pb: ProgressBar) {
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(pb);
        }
    }

    /// The most recently started bar that is still running.
    fn active(&self) -> Option<ProgressBar> {
        [&self.delete, &self.fingerprint, &self.scan]
            .into_iter()
            .find_map(|slot| slot.lock().ok().and_then(|guard| guard.clone()))
    }

    fn finish(&self, phase: &str, message: &'static str) {
        if let Some(slot) = self.slot(phase) {
            if let Some(pb) = slot.lock().ok().and_then(|mut guard| guard.take()) {
                pb.finish_with_message(message);
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            "scan" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::scan_style());
                pb.set_message("Scanning");
                pb.enable_steady_tick(Duration::from_millis(100));
                Self::store(&self.scan, pb);
            }
            "fingerprint" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("cyan"));
                pb.set_message("Fingerprinting");
                Self::store(&self.fingerprint, pb);
            }
            "delete" => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::bar_style("red"));
                pb.set_message("Deleting");
                Self::store(&self.delete, pb);
            }
            other => log::debug!("No progress bar for phase {}", other),
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }
        if let Some(pb) = self.active() {
            pb.set_position(current as u64);
            pb.set_message(truncate_path(path, 30));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        match phase {
            "scan" => self.finish(phase, "Scan complete"),
            "fingerprint" => self.finish(phase, "Fingerprinting complete"),
            "delete" => self.finish(phase, "Deletion complete"),
            _ => {}
        }
    }
}

impl DeleteProgressCallback for Progress {
    fn on_before_delete(&self, path: &Path, index: usize, total: usize) {
        if index == 0 {
            self.on_phase_start("delete", total);
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.on_progress(index, &name);
    }

    fn on_delete_success(&self, _path: &Path, _size: u64) {
        if let Some(pb) = self.delete.lock().ok().and_then(|guard| guard.clone()) {
            pb.inc(1);
        }
    }

    fn on_already_absent(&self, path: &Path) {
        self.on_delete_success(path, 0);
    }

    fn on_delete_failure(&self, path: &Path, error: &str) {
        if let Some(pb) = self.delete.lock().ok().and_then(|guard| guard.clone()) {
            pb.inc(1);
            pb.println(format!("failed: {} ({})", path.display(), error));
        }
    }

    fn on_complete(&self, _result: &BatchDeleteResult) {
        self.on_phase_end("delete");
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    let count = path.chars().count();
    if count <= max_len {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (max_len - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_path_short() {
        assert_eq!(truncate_path("file.txt", 30), "file.txt");
    }

    #[test]
    fn test_truncate_path_long() {
        let long = "a".repeat(50);
        let truncated = truncate_path(&long, 30);
        assert_eq!(truncated.chars().count(), 30);
        assert!(truncated.starts_with("..."));
    }

    #[test]
    fn test_truncate_path_multibyte() {
        let long = "é".repeat(40);
        assert_eq!(truncate_path(&long, 10).chars().count(), 10);
    }

    #[test]
    fn test_quiet_progress_is_noop() {
        let progress = Progress::new(true);
        progress.on_phase_start("fingerprint", 10);
        progress.on_progress(1, "file.txt");
        progress.on_phase_end("fingerprint");
        assert!(progress.active().is_none());
    }

    #[test]
    fn test_phase_bars_are_tracked() {
        let progress = Progress::new(false);
        progress.on_phase_start("fingerprint", 3);
        progress.on_progress(2, "b.txt");
        assert_eq!(progress.active().map(|pb| pb.position()), Some(2));
        progress.on_phase_end("fingerprint");
        assert!(progress.active().is_none());
    }
}
