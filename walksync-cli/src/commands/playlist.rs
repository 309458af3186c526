//! `walksync playlist`: write, preview, or diff the generated playlist files.

use anyhow::{Context, Result};
use clap::Args;

use walksync_sync::{pipeline, playlist::diff_playlist, SyncOptions, WriteResult};

use super::ConfigArgs;

/// Arguments for `walksync playlist`.
#[derive(Args, Debug)]
pub struct PlaylistArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Show which files would be written without writing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Print a unified diff of every playlist file that would change.
    #[arg(long, conflicts_with = "dry_run")]
    pub diff: bool,
}

impl PlaylistArgs {
    pub fn run(self) -> Result<()> {
        let (config, library) = self.config.load()?;
        if config.playlist.is_none() {
            println!("No playlist section configured; nothing to do.");
            return Ok(());
        }

        if self.diff {
            let rendered =
                pipeline::render_playlists(&library, &config).context("rendering failed")?;
            let mut any = false;
            for playlist in rendered {
                let Some(diff) = diff_playlist(&playlist.path, &playlist.content)
                    .with_context(|| format!("diff failed for '{}'", playlist.name))?
                else {
                    continue;
                };
                any = true;
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
            }
            if !any {
                println!("No playlist differences.");
            }
            return Ok(());
        }

        let options = SyncOptions {
            remove_unmatched: None,
            dry_run: self.dry_run,
        };
        let writes =
            pipeline::write_playlists(&library, &config, options).context("writing failed")?;
        print_writes(&writes, self.dry_run);
        Ok(())
    }
}

pub(crate) fn print_writes(writes: &[WriteResult], dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = writes
        .iter()
        .filter(|r| !matches!(r, WriteResult::Unchanged { .. }))
        .count();

    if written == 0 {
        println!("{prefix}✓ playlists: nothing to do");
        return;
    }

    println!(
        "{prefix}✓ playlists ({} written, {} unchanged)",
        written,
        writes.len() - written
    );
    for r in writes {
        match r {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }
}
