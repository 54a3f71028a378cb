//! Command line and environment configuration.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::convert::OriginalDisposal;
use crate::store::DEFAULT_TABLE;

/// Images live under this path inside the media root, and records store
/// their image reference relative to the media root with the same prefix.
pub const IMAGES_SUBDIR: &str = "movie/images";

/// Originals are moved here (inside the images folder) with `--keep-originals`.
pub const STAGING_DIR: &str = ".originals";

#[derive(Parser, Debug)]
#[command(name = "movie-image-sync")]
#[command(about = "Update movie images in the database from the media folder")]
pub struct Args {
    /// Media root containing movie/images/
    #[arg(long, env = "MEDIA_ROOT")]
    pub media_root: PathBuf,

    /// SQLite database holding the movie records
    #[arg(long, env = "DATABASE_PATH")]
    pub database: PathBuf,

    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Move converted originals into movie/images/.originals instead of deleting them
    #[arg(long)]
    pub keep_originals: bool,

    /// Scan and match without converting files or writing records
    #[arg(long)]
    pub dry_run: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub log_only: bool,

    /// Print per-file debug diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Write run counters as JSON to this file
    #[arg(long)]
    pub stats: Option<PathBuf>,
}

/// Settings the sync pipeline needs, independent of how they were parsed.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub images_dir: PathBuf,
    pub disposal: OriginalDisposal,
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn new(media_root: &Path, keep_originals: bool, dry_run: bool) -> Self {
        let images_dir = media_root.join(IMAGES_SUBDIR);
        let disposal = if keep_originals {
            OriginalDisposal::StageIn(images_dir.join(STAGING_DIR))
        } else {
            OriginalDisposal::Delete
        };
        Self {
            images_dir,
            disposal,
            dry_run,
        }
    }
}

impl From<&Args> for SyncConfig {
    fn from(args: &Args) -> Self {
        SyncConfig::new(&args.media_root, args.keep_originals, args.dry_run)
    }
}

/// Image reference stored on the record for a file in the images folder.
pub fn image_reference(filename: &str) -> String {
    format!("{}/{}", IMAGES_SUBDIR, filename)
}
