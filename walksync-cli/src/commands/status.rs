//! `walksync status`: what the next sync would do.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use walksync_sync::{pipeline, Reconciliation, SyncOptions};

use super::ConfigArgs;

/// Paths listed under the table per non-empty column.
const PREVIEW: usize = 5;

/// Arguments for `walksync status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReport {
    music: Reconciliation,
    #[serde(skip_serializing_if = "Option::is_none")]
    lyrics: Option<Reconciliation>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "kind")]
    kind: &'static str,
    #[tabled(rename = "update")]
    update: usize,
    #[tabled(rename = "remove")]
    remove: usize,
    #[tabled(rename = "current")]
    current: usize,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let (config, library) = self.config.load()?;
        let options = SyncOptions::default();

        let music = pipeline::plan_music(&library, &config, options).with_context(|| {
            format!(
                "could not inspect '{}'; is the device mounted?",
                config.device_dir.display()
            )
        })?;
        let lyrics = pipeline::plan_lyrics(&library, &config, options)
            .context("could not inspect lyric files")?;

        let report = StatusReport {
            music: music.reconciliation,
            lyrics: lyrics.map(|plan| plan.reconciliation),
        };
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&report, config.remove_unmatched);
        Ok(())
    }
}

fn print_table(report: &StatusReport, remove_unmatched: bool) {
    let mut rows = vec![row("music", &report.music)];
    if let Some(lyrics) = &report.lyrics {
        rows.push(row("lyrics", lyrics));
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let sections = std::iter::once(("music", &report.music))
        .chain(report.lyrics.as_ref().map(|r| ("lyrics", r)));
    for (kind, r) in sections {
        preview(&format!("{kind} to update"), &r.to_update);
        preview(&format!("{kind} to remove"), &r.to_remove);
    }

    let current = report.music.is_current()
        && report.lyrics.as_ref().map_or(true, Reconciliation::is_current);
    if current {
        println!("{}", "Device is up to date.".green());
        return;
    }

    let pending_removal = !report.music.to_remove.is_empty()
        || report.lyrics.as_ref().is_some_and(|r| !r.to_remove.is_empty());
    if pending_removal && !remove_unmatched {
        println!("Run 'walksync sync --remove-unmatched' to update and prune the device.");
    } else {
        println!("Run 'walksync sync' to update the device.");
    }
}

fn row(kind: &'static str, r: &Reconciliation) -> StatusTableRow {
    StatusTableRow {
        kind,
        update: r.to_update.len(),
        remove: r.to_remove.len(),
        current: r.to_ignore.len(),
    }
}

fn preview(label: &str, paths: &[String]) {
    if paths.is_empty() {
        return;
    }
    let mut sorted: Vec<&String> = paths.iter().collect();
    sorted.sort();
    println!("{}", label.bold());
    for path in sorted.iter().take(PREVIEW) {
        println!("  {path}");
    }
    if sorted.len() > PREVIEW {
        println!("  {}", format!("+{} more", sorted.len() - PREVIEW).bright_black());
    }
}
