//! walksync: mirror library playlists onto a portable player.
//!
//! # Usage
//!
//! ```text
//! walksync sync [--config PATH] [--remove-unmatched] [--dry-run] [--skip-lyrics] [--skip-playlists]
//! walksync status [--config PATH] [--json]
//! walksync lyrics [--config PATH] [--remove-unmatched] [--dry-run]
//! walksync playlist [--config PATH] [--dry-run] [--diff]
//! ```
//!
//! Without `--config`, the configuration is read from `~/.walksync/config.yaml`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{lyrics::LyricsArgs, playlist::PlaylistArgs, status::StatusArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "walksync",
    version,
    about = "Keep a portable player in step with selected library playlists",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy new and changed music, lyrics, and playlist files to the device.
    Sync(SyncArgs),

    /// Show what a sync would copy or remove, without touching the device.
    Status(StatusArgs),

    /// Sync lyric files only.
    Lyrics(LyricsArgs),

    /// Write playlist files only.
    Playlist(PlaylistArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Lyrics(args) => args.run(),
        Commands::Playlist(args) => args.run(),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
