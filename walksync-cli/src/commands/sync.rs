//! `walksync sync`: music, then lyrics, then playlist files.

use anyhow::{Context, Result};
use clap::Args;

use walksync_sync::{pipeline, SyncOptions};

use super::{playlist::print_writes, print_header, print_summary, ConfigArgs, ConsoleSink};

/// Arguments for `walksync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Delete device files that no longer belong to any selected playlist.
    #[arg(long)]
    pub remove_unmatched: bool,

    /// Show what would be copied or removed without touching the device.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not sync lyric files.
    #[arg(long)]
    pub skip_lyrics: bool,

    /// Do not write playlist files.
    #[arg(long)]
    pub skip_playlists: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let (config, library) = self.config.load()?;
        let options = SyncOptions {
            remove_unmatched: self.remove_unmatched.then_some(true),
            dry_run: self.dry_run,
        };
        let mut sink = ConsoleSink::new(self.dry_run);

        print_header("music", &config.device_dir, self.dry_run);
        let music = pipeline::sync_music(&library, &config, options, &mut sink)
            .context("music sync failed")?;
        print_summary("music", &music, self.dry_run);

        if !self.skip_lyrics {
            if let Some(dest) = config.lyrics_device_dir() {
                print_header("lyrics", dest, self.dry_run);
            }
            let lyrics = pipeline::sync_lyrics(&library, &config, options, &mut sink)
                .context("lyrics sync failed")?;
            if let Some(summary) = lyrics {
                print_summary("lyrics", &summary, self.dry_run);
            }
        }

        if !self.skip_playlists && config.playlist.is_some() {
            print_header("playlists", &config.device_dir, self.dry_run);
            let writes = pipeline::write_playlists(&library, &config, options)
                .context("writing playlists failed")?;
            print_writes(&writes, self.dry_run);
        }

        Ok(())
    }
}
