//! Subcommands and the console output they share.

pub mod lyrics;
pub mod playlist;
pub mod status;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use walksync_core::{config, Config, LibraryManifest};
use walksync_sync::{LogSink, PhaseReport, ProgressSink, SyncEvent, SyncSummary};

/// `--config` flag shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Configuration file (default: ~/.walksync/config.yaml).
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load the configuration and the library manifest it points at.
    pub fn load(&self) -> Result<(Config, LibraryManifest)> {
        let config = match &self.config {
            Some(path) => config::load_from(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => config::load().context("failed to load ~/.walksync/config.yaml")?,
        };
        let library = LibraryManifest::load_at(&config.library)
            .with_context(|| format!("failed to load library '{}'", config.library.display()))?;
        Ok((config, library))
    }
}

/// Prints executor progress, one line per item, and forwards it to the log.
pub struct ConsoleSink {
    prefix: &'static str,
}

impl ConsoleSink {
    pub fn new(dry_run: bool) -> Self {
        Self {
            prefix: if dry_run { "[dry-run] " } else { "" },
        }
    }
}

impl ProgressSink for ConsoleSink {
    fn event(&mut self, event: &SyncEvent) {
        LogSink.event(event);
        let prefix = self.prefix;
        match event {
            SyncEvent::Copying { path } => println!("  {}  {path}", "✎".green()),
            SyncEvent::WouldCopy { path } => println!("  {}  {path}", "~".green()),
            SyncEvent::SkippedMissing { path } => {
                println!("  {}  {path} (source vanished)", "?".yellow())
            }
            SyncEvent::NothingToUpdate => println!("{prefix}✓ nothing to update"),
            SyncEvent::Removing { path } => println!("  {}  {path}", "✗".red()),
            SyncEvent::WouldRemove { path } => println!("  {}  {path} (remove)", "~".red()),
            SyncEvent::Protected { path } => {
                println!("  {}  {path} (protected)", "·".bright_black())
            }
            SyncEvent::NothingToRemove => println!("{prefix}✓ nothing to remove"),
            SyncEvent::RemovalDisabled { pending } => println!(
                "{prefix}· {pending} unmatched file(s) kept; pass --remove-unmatched to delete"
            ),
        }
    }
}

/// Section header printed before a phase pair runs.
pub fn print_header(label: &str, dest: &std::path::Path, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!("{prefix}{} → {}", label.bold(), dest.display());
}

/// One-line tally after a sync.
pub fn print_summary(label: &str, summary: &SyncSummary, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let (copied, removed) = if dry_run {
        (planned(&summary.update), planned(&summary.remove))
    } else {
        (summary.update.done().len(), summary.remove.done().len())
    };
    let skipped = summary.update.skipped().len() + summary.remove.skipped().len();
    println!("{prefix}✓ {label}: {copied} copied, {removed} removed, {skipped} skipped");
}

fn planned(report: &PhaseReport) -> usize {
    match report {
        PhaseReport::Planned { paths, .. } => paths.len(),
        _ => 0,
    }
}
