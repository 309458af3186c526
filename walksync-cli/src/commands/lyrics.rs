//! `walksync lyrics`: lyric files only.

use anyhow::{Context, Result};
use clap::Args;

use walksync_sync::{pipeline, SyncOptions};

use super::{print_header, print_summary, ConfigArgs, ConsoleSink};

/// Arguments for `walksync lyrics`.
#[derive(Args, Debug)]
pub struct LyricsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Delete lyric files on the device whose track left the selected playlists.
    #[arg(long)]
    pub remove_unmatched: bool,

    /// Show what would be copied or removed without touching the device.
    #[arg(long)]
    pub dry_run: bool,
}

impl LyricsArgs {
    pub fn run(self) -> Result<()> {
        let (config, library) = self.config.load()?;
        let Some(dest) = config.lyrics_device_dir() else {
            println!("No lyrics section configured; nothing to do.");
            return Ok(());
        };
        print_header("lyrics", dest, self.dry_run);

        let options = SyncOptions {
            remove_unmatched: self.remove_unmatched.then_some(true),
            dry_run: self.dry_run,
        };
        let mut sink = ConsoleSink::new(self.dry_run);
        if let Some(summary) = pipeline::sync_lyrics(&library, &config, options, &mut sink)
            .context("lyrics sync failed")?
        {
            print_summary("lyrics", &summary, self.dry_run);
        }
        Ok(())
    }
}
