//! Progress bar and status output.
//!
//! Status lines go to stdout (info) or stderr (warnings, errors).
//! They are printed with the bar suspended so it never garbles them. In
//! log-only mode the bar is hidden entirely for tail-friendly output.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// When set, the sync prints plain status lines and never draws a bar.
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Elapsed run time for the closing debug line: seconds under a minute,
/// minutes above.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        return format!("{:.1}s", secs);
    }
    format!("{:.1}m", secs / 60.0)
}

/// Bar over the scanned files. Hidden under `--log-only`.
pub fn create_progress_bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if is_log_only() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    } else {
        match ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}, ETA: {eta})")
        {
            Ok(style) => pb.set_style(style.progress_chars("=> ")),
            Err(e) => log::debug!("progress template rejected: {}", e),
        }
    }
    pb.set_message(msg.to_string());
    pb
}

/// Line-oriented status output tied to one progress bar.
pub struct Reporter {
    bar: ProgressBar,
}

impl Reporter {
    pub fn new(len: u64, msg: &str) -> Self {
        Self {
            bar: create_progress_bar(len, msg),
        }
    }

    pub fn info(&self, msg: impl Display) {
        self.bar.suspend(|| println!("{}", msg));
    }

    pub fn warn(&self, msg: impl Display) {
        self.bar.suspend(|| eprintln!("Warning: {}", msg));
    }

    pub fn error(&self, msg: impl Display) {
        self.bar.suspend(|| eprintln!("{}", msg));
    }

    pub fn advance(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self, msg: impl Display) {
        self.bar.finish_and_clear();
        self.info(msg);
    }
}
