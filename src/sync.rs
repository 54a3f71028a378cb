//! The sync pipeline: scan → convert → match → update, once per file.
//!
//! Files are independent. Only a missing images folder or an unreadable
//! record table stops the run; every per-file failure is reported and the
//! loop moves on.

use log::{debug, warn};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::{image_reference, SyncConfig};
use crate::convert::{convert_to_jpeg, jpeg_name};
use crate::error::SyncError;
use crate::matcher::{rank_suggestions, MatchKind, TitleIndex};
use crate::models::{FileOutcome, MovieRecord, SyncSummary};
use crate::normalize::{
    has_accepted_extension, normalize_title, should_skip_file, suggestion_form, suggestion_token,
    title_stem,
};
use crate::progress::Reporter;
use crate::store::MovieStore;

/// Result of a full run: counters plus the outcome of every scanned file.
#[derive(Debug, Default)]
pub struct SyncRun {
    pub summary: SyncSummary,
    pub outcomes: Vec<(String, FileOutcome)>,
}

/// List the regular files directly inside `dir`, sorted by name.
/// Unreadable entries and non-UTF-8 names are logged and left out.
pub fn scan_directory(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();

    for entry_result in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                warn!("Failed to read directory entry: {}", err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.file_name().to_str() {
            Some(name) => files.push(name.to_string()),
            None => warn!("Skipping non UTF-8 file name: {}", entry.path().display()),
        }
    }

    files
}

struct Pipeline<'a, S: MovieStore + ?Sized> {
    config: &'a SyncConfig,
    store: &'a S,
    index: TitleIndex,
    reporter: Reporter,
}

/// Run the sync over every file in the configured images folder.
pub fn run<S: MovieStore + ?Sized>(config: &SyncConfig, store: &S) -> Result<SyncRun, SyncError> {
    if !config.images_dir.is_dir() {
        return Err(SyncError::MissingDirectory(config.images_dir.clone()));
    }

    let files = scan_directory(&config.images_dir);
    let index = TitleIndex::new(store.all_movies()?);
    debug!(
        "Found {} files in {}, {} movies in store",
        files.len(),
        config.images_dir.display(),
        index.len()
    );

    let pipeline = Pipeline {
        config,
        store,
        index,
        reporter: Reporter::new(files.len() as u64, "Syncing images"),
    };

    let mut run = SyncRun {
        summary: SyncSummary {
            scanned: files.len(),
            dry_run: config.dry_run,
            ..Default::default()
        },
        outcomes: Vec::with_capacity(files.len()),
    };

    for filename in files {
        let outcome = pipeline.process_file(&filename, &mut run.summary);
        run.summary.record(&outcome);
        run.outcomes.push((filename, outcome));
        pipeline.reporter.advance();
    }

    let closing = if config.dry_run {
        format!(
            "Dry run finished: {} movie images would be updated.",
            run.summary.updated
        )
    } else {
        format!("Finished updating {} movie images.", run.summary.updated)
    };
    pipeline.reporter.finish(closing);

    Ok(run)
}

impl<'a, S: MovieStore + ?Sized> Pipeline<'a, S> {
    fn process_file(&self, name: &str, summary: &mut SyncSummary) -> FileOutcome {
        if should_skip_file(name) {
            self.reporter.warn(format!("Skipping system file: {}", name));
            return FileOutcome::Skipped;
        }

        let filename = if has_accepted_extension(name) {
            name.to_string()
        } else {
            match self.convert(name) {
                Some(new_name) => {
                    summary.converted += 1;
                    new_name
                }
                None => return FileOutcome::ConversionFailed,
            }
        };

        // "m_Matrix.bmp" now and "m_Matrix.bmp.jpg" on later runs are both
        // matched as "m_Matrix".
        let original = title_stem(name).trim();
        debug!(
            "Checking: Original='{}', Normalized='{}', No Prefix='{}'",
            original,
            normalize_title(original),
            suggestion_form(original)
        );

        let image = image_reference(&filename);
        match self.index.find(original) {
            Some((movie, kind)) => self.update(movie, kind, original, image),
            None => self.report_unmatched(original),
        }
    }

    fn convert(&self, name: &str) -> Option<String> {
        self.reporter.info(format!(
            "Found file without valid extension: {}, attempting to convert to JPG...",
            name
        ));

        if self.config.dry_run {
            let new_name = jpeg_name(name);
            self.reporter.info(format!("Would convert to {}", new_name));
            return Some(new_name);
        }

        let path = self.config.images_dir.join(name);
        match convert_to_jpeg(&path, &self.config.disposal) {
            Ok(new_name) => {
                self.reporter
                    .info(format!("Successfully converted to {}", new_name));
                Some(new_name)
            }
            Err(e) => {
                self.reporter
                    .error(format!("Error converting file {}: {}", path.display(), e));
                None
            }
        }
    }

    fn update(
        &self,
        movie: &MovieRecord,
        kind: MatchKind,
        original: &str,
        image: String,
    ) -> FileOutcome {
        let updated = MovieRecord {
            image,
            ..movie.clone()
        };

        if self.config.dry_run {
            self.reporter
                .info(format!("Would update image for: {}", updated.title));
        } else if let Err(e) = self.store.save(&updated) {
            self.reporter
                .error(format!("Failed to update {}: {}", original, e));
            return FileOutcome::UpdateFailed {
                movie_id: updated.id,
            };
        } else {
            self.reporter
                .info(format!("Updated image for: {}", updated.title));
        }

        debug!(
            "Matched file '{}' with DB title '{}' ({:?})",
            original, updated.title, kind
        );
        FileOutcome::Updated {
            movie_id: updated.id,
            image: updated.image,
        }
    }

    fn report_unmatched(&self, original: &str) -> FileOutcome {
        self.reporter.error(format!("Movie not found: {}", original));

        let suggestions = match suggestion_token(original) {
            Some(token) => match self.store.titles_containing(&token) {
                Ok(similar) => rank_suggestions(&suggestion_form(original), similar),
                Err(e) => {
                    self.reporter
                        .error(format!("Failed to look up similar titles: {}", e));
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if !suggestions.is_empty() {
            self.reporter.error("Similar titles found:");
            for title in &suggestions {
                self.reporter.error(format!("- {}", title));
            }
        }

        FileOutcome::Unmatched { suggestions }
    }
}
