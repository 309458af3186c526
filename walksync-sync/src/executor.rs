//! Applies a [`Reconciliation`] to the destination tree.
//!
//! ## Update phase
//!
//! 1. Sort `to_update` by canonical spelling.
//! 2. Skip entries whose source vanished since the listing.
//! 3. Create the destination directory chain.
//! 4. Copy to a `.walksync.tmp` sibling, carry over atime/mtime, rename into place.
//!
//! Leftover `.walksync.tmp` files from an interrupted run are swept first.
//!
//! ## Remove phase
//!
//! Runs only after every update, and only when removal is enabled. Entries
//! with a protected extension are reported and kept.
//!
//! An empty phase always reports a "nothing to do" event.

use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use walkdir::WalkDir;

use crate::error::{io_err, SyncError};
use crate::normalize::normalize;
use crate::reconcile::Reconciliation;
use crate::scan::ExtensionFilter;

/// Name of the in-flight copy, one per destination directory.
pub const TMP_NAME: &str = ".walksync.tmp";

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// A single progress notification emitted while applying a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// About to copy `path` (canonical spelling).
    Copying { path: String },
    /// The source file disappeared between listing and copy.
    SkippedMissing { path: String },
    /// Dry run: `path` would be copied.
    WouldCopy { path: String },
    NothingToUpdate,
    /// About to delete `path` from the destination.
    Removing { path: String },
    /// Unmatched but kept because its extension is protected.
    Protected { path: String },
    /// Dry run: `path` would be deleted.
    WouldRemove { path: String },
    NothingToRemove,
    /// Removal is switched off; `pending` unmatched files were left alone.
    RemovalDisabled { pending: usize },
}

/// Receives [`SyncEvent`]s as the executor works.
pub trait ProgressSink {
    fn event(&mut self, event: &SyncEvent);
}

impl<F: FnMut(&SyncEvent)> ProgressSink for F {
    fn event(&mut self, event: &SyncEvent) {
        self(event)
    }
}

/// Sink that forwards every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn event(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Copying { path } => tracing::info!("copying: {path}"),
            SyncEvent::SkippedMissing { path } => tracing::warn!("source vanished, skipped: {path}"),
            SyncEvent::WouldCopy { path } => tracing::info!("[dry-run] would copy: {path}"),
            SyncEvent::NothingToUpdate => tracing::info!("nothing to update"),
            SyncEvent::Removing { path } => tracing::info!("removing: {path}"),
            SyncEvent::Protected { path } => tracing::info!("protected, kept: {path}"),
            SyncEvent::WouldRemove { path } => tracing::info!("[dry-run] would remove: {path}"),
            SyncEvent::NothingToRemove => tracing::info!("nothing to remove"),
            SyncEvent::RemovalDisabled { pending } => {
                tracing::info!("removal disabled, {pending} unmatched file(s) kept")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Outcome of one executor phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseReport {
    /// The phase had an empty input list.
    NothingToDo,
    /// Removal was switched off while unmatched files existed.
    Disabled { pending: usize },
    /// Dry run: what the phase would have touched.
    Planned { paths: Vec<String>, skipped: Vec<String> },
    /// The phase ran. `skipped` lists vanished sources or protected files.
    Done { done: Vec<String>, skipped: Vec<String> },
}

impl PhaseReport {
    /// Files actually copied or removed.
    pub fn done(&self) -> &[String] {
        match self {
            PhaseReport::Done { done, .. } => done,
            _ => &[],
        }
    }

    pub fn skipped(&self) -> &[String] {
        match self {
            PhaseReport::Done { skipped, .. } | PhaseReport::Planned { skipped, .. } => skipped,
            _ => &[],
        }
    }
}

/// Outcome of applying a [`SyncPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub update: PhaseReport,
    pub remove: PhaseReport,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A reconciliation bound to its roots and removal policy.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub reconciliation: Reconciliation,
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    pub remove_unmatched: bool,
    /// Extensions never deleted, even when unmatched.
    pub protected: ExtensionFilter,
    /// Report what would happen without touching the destination.
    pub dry_run: bool,
}

impl SyncPlan {
    pub fn new(
        reconciliation: Reconciliation,
        source_root: impl Into<PathBuf>,
        dest_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reconciliation,
            source_root: source_root.into(),
            dest_root: dest_root.into(),
            remove_unmatched: false,
            protected: ExtensionFilter::any(),
            dry_run: false,
        }
    }

    pub fn remove_unmatched(mut self, enabled: bool) -> Self {
        self.remove_unmatched = enabled;
        self
    }

    pub fn protect(mut self, protected: ExtensionFilter) -> Self {
        self.protected = protected;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run the update phase, then the remove phase.
    pub fn apply(self, sink: &mut impl ProgressSink) -> Result<SyncSummary, SyncError> {
        if !self.dry_run {
            sweep_stale_tmp(&self.dest_root);
        }
        let update = update_phase(
            &self.reconciliation.to_update,
            &self.source_root,
            &self.dest_root,
            self.dry_run,
            sink,
        )?;
        let remove = remove_phase(&self, sink)?;
        Ok(SyncSummary { update, remove })
    }
}

/// Copy `to_update` from `source_dir` to `dest_dir`, then delete `to_remove`
/// from `dest_dir` when `remove_unmatched` is set.
pub fn apply(
    to_update: &[String],
    to_remove: &[String],
    source_dir: &Path,
    dest_dir: &Path,
    remove_unmatched: bool,
    sink: &mut impl ProgressSink,
) -> Result<SyncSummary, SyncError> {
    let reconciliation = Reconciliation {
        to_update: to_update.to_vec(),
        to_remove: to_remove.to_vec(),
        to_ignore: Vec::new(),
    };
    SyncPlan::new(reconciliation, source_dir, dest_dir)
        .remove_unmatched(remove_unmatched)
        .apply(sink)
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

fn update_phase(
    to_update: &[String],
    source_dir: &Path,
    dest_dir: &Path,
    dry_run: bool,
    sink: &mut impl ProgressSink,
) -> Result<PhaseReport, SyncError> {
    if to_update.is_empty() {
        sink.event(&SyncEvent::NothingToUpdate);
        return Ok(PhaseReport::NothingToDo);
    }

    let mut done = Vec::new();
    let mut skipped = Vec::new();
    for (canonical, path) in sorted_by_canonical(to_update) {
        let source = source_dir.join(path);
        let meta = match fs::metadata(&source) {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                sink.event(&SyncEvent::SkippedMissing {
                    path: canonical.clone(),
                });
                skipped.push(canonical);
                continue;
            }
            Err(err) => return Err(io_err(&source, err)),
        };

        if dry_run {
            sink.event(&SyncEvent::WouldCopy {
                path: canonical.clone(),
            });
            done.push(canonical);
            continue;
        }

        sink.event(&SyncEvent::Copying {
            path: canonical.clone(),
        });
        copy_preserving_times(&source, &dest_dir.join(&canonical), &meta)?;
        done.push(canonical);
    }

    Ok(if dry_run {
        PhaseReport::Planned {
            paths: done,
            skipped,
        }
    } else {
        PhaseReport::Done { done, skipped }
    })
}

fn remove_phase(plan: &SyncPlan, sink: &mut impl ProgressSink) -> Result<PhaseReport, SyncError> {
    let to_remove = &plan.reconciliation.to_remove;
    if to_remove.is_empty() {
        sink.event(&SyncEvent::NothingToRemove);
        return Ok(PhaseReport::NothingToDo);
    }
    if !plan.remove_unmatched {
        sink.event(&SyncEvent::RemovalDisabled {
            pending: to_remove.len(),
        });
        return Ok(PhaseReport::Disabled {
            pending: to_remove.len(),
        });
    }

    let mut done = Vec::new();
    let mut skipped = Vec::new();
    for (_, path) in sorted_by_canonical(to_remove) {
        let path = path.clone();
        if plan.protected.contains(Path::new(&path)) {
            sink.event(&SyncEvent::Protected { path: path.clone() });
            skipped.push(path);
            continue;
        }
        if plan.dry_run {
            sink.event(&SyncEvent::WouldRemove { path: path.clone() });
            done.push(path);
            continue;
        }

        sink.event(&SyncEvent::Removing { path: path.clone() });
        let target = plan.dest_root.join(&path);
        fs::remove_file(&target).map_err(|e| io_err(&target, e))?;
        done.push(path);
    }

    Ok(if plan.dry_run {
        PhaseReport::Planned {
            paths: done,
            skipped,
        }
    } else {
        PhaseReport::Done { done, skipped }
    })
}

fn sorted_by_canonical(paths: &[String]) -> Vec<(String, &String)> {
    let mut items: Vec<(String, &String)> = paths.iter().map(|p| (normalize(p), p)).collect();
    items.sort();
    items
}

/// Delete [`TMP_NAME`] files left under `dest_dir` by an interrupted copy.
/// Failures are logged; the copy that follows overwrites the file anyway.
fn sweep_stale_tmp(dest_dir: &Path) {
    let stale = WalkDir::new(dest_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == TMP_NAME);
    for entry in stale {
        match fs::remove_file(entry.path()) {
            Ok(()) => tracing::info!("removed stale {}", entry.path().display()),
            Err(err) => tracing::warn!("could not remove {}: {err}", entry.path().display()),
        }
    }
}

/// Copy `source` to `dest` through a [`TMP_NAME`] sibling; a partial copy
/// never appears under the final name.
fn copy_preserving_times(source: &Path, dest: &Path, meta: &Metadata) -> Result<(), SyncError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = dest.with_file_name(TMP_NAME);
    let result = fs::copy(source, &tmp)
        .map_err(|e| io_err(source, e))
        .and_then(|_| {
            filetime::set_file_times(
                &tmp,
                FileTime::from_last_access_time(meta),
                FileTime::from_last_modification_time(meta),
            )
            .map_err(|e| io_err(&tmp, e))
        })
        .and_then(|_| fs::rename(&tmp, dest).map_err(|e| io_err(dest, e)));

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
