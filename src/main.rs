use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use std::fs;
use std::time::Instant;

use movie_image_sync::config::{Args, SyncConfig};
use movie_image_sync::progress::{format_duration, set_log_only};
use movie_image_sync::store::SqliteStore;
use movie_image_sync::sync;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut clog = colog::default_builder();
    clog.filter(
        None,
        if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        },
    );
    clog.init();

    set_log_only(args.log_only);

    let start = Instant::now();

    debug!("Opening database: {:?}", args.database);
    let store = SqliteStore::open(&args.database, &args.table)
        .with_context(|| format!("Failed to open database {}", args.database.display()))?;

    let config = SyncConfig::from(&args);
    let run = sync::run(&config, &store)?;

    debug!(
        "Processed {} files in {}",
        run.summary.scanned,
        format_duration(start.elapsed())
    );

    if let Some(path) = &args.stats {
        let json = serde_json::to_string_pretty(&run.summary)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }

    Ok(())
}
