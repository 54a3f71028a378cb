//! Core data models for the image sync.
//!
//! Records come from the store, files from the images folder, and every
//! file ends the run with exactly one `FileOutcome`.

use serde::Serialize;

// ============================================================================
// Store Models
// ============================================================================

/// Movie row as seen by the sync. Only `image` is ever written back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    pub image: String,
}

// ============================================================================
// Run Models
// ============================================================================

/// What happened to a single file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// Placeholder or system file, left alone
    Skipped,
    /// Could not be turned into a JPEG; skipped for this run
    ConversionFailed,
    /// No record matched; carries the suggested titles
    Unmatched { suggestions: Vec<String> },
    /// Record image updated (or would be, in a dry run)
    Updated { movie_id: i64, image: String },
    /// Record matched but the store rejected the write
    UpdateFailed { movie_id: i64 },
}

/// Counters for one run, written out with `--stats`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub scanned: usize,
    pub skipped: usize,
    pub converted: usize,
    pub conversion_failed: usize,
    pub unmatched: usize,
    pub updated: usize,
    pub update_failed: usize,
    pub dry_run: bool,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::ConversionFailed => self.conversion_failed += 1,
            FileOutcome::Unmatched { .. } => self.unmatched += 1,
            FileOutcome::Updated { .. } => self.updated += 1,
            FileOutcome::UpdateFailed { .. } => self.update_failed += 1,
        }
    }
}
