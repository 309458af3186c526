//! File-list reconciliation.
//!
//! Classification rules, applied under normalized-path equality:
//! 1. source only → `to_update`
//! 2. destination only → `to_remove`
//! 3. both, source newer than destination beyond the rule's tolerance → `to_update`
//! 4. both, otherwise → `to_ignore`
//!
//! A path listed twice in one list (for instance once composed, once
//! decomposed) counts once, at its first occurrence.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::{Duration, SystemTime};

use serde::Serialize;

use walksync_core::config::DEFAULT_MTIME_EPSILON_MS;

use crate::error::{io_err, SyncError};
use crate::normalize::normalize;

/// How files present on both sides are judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessRule {
    /// Update when the source mtime exceeds the destination mtime by more than `epsilon`.
    SourceNewer { epsilon: Duration },
    /// Never update a file that already exists on the destination.
    PresenceOnly,
}

impl Default for StalenessRule {
    fn default() -> Self {
        StalenessRule::SourceNewer {
            epsilon: Duration::from_millis(DEFAULT_MTIME_EPSILON_MS),
        }
    }
}

/// Outcome of comparing a source list with a destination list.
///
/// `to_update` and `to_ignore` hold source spellings, `to_remove` holds
/// destination spellings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub to_update: Vec<String>,
    pub to_remove: Vec<String>,
    pub to_ignore: Vec<String>,
}

impl Reconciliation {
    /// Nothing to copy and nothing unmatched on the destination.
    pub fn is_current(&self) -> bool {
        self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

/// Partitions two file lists into update / remove / ignore sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler {
    rule: StalenessRule,
}

impl Reconciler {
    pub fn new(rule: StalenessRule) -> Self {
        Self { rule }
    }

    pub fn with_epsilon(epsilon: Duration) -> Self {
        Self::new(StalenessRule::SourceNewer { epsilon })
    }

    pub fn rule(&self) -> StalenessRule {
        self.rule
    }

    /// Classify `source` (relative to `source_root`) against `dest`
    /// (relative to `dest_root`).
    ///
    /// Modification times are read from `source_root/<source spelling>` and
    /// `dest_root/<canonical spelling>`, or the destination's own spelling when
    /// no file exists under the canonical one. A missing file on either side
    /// is a [`SyncError::NotFound`].
    pub fn reconcile(
        &self,
        source: &[String],
        dest: &[String],
        source_root: &Path,
        dest_root: &Path,
    ) -> Result<Reconciliation, SyncError> {
        let mut dest_keys: HashMap<String, &String> = HashMap::new();
        for path in dest {
            dest_keys.entry(normalize(path)).or_insert(path);
        }

        let mut result = Reconciliation::default();
        let mut source_keys = HashSet::new();
        let mut on_both_sides = Vec::new();
        for path in source {
            let key = normalize(path);
            if !source_keys.insert(key.clone()) {
                tracing::debug!("duplicate source entry: {path}");
                continue;
            }
            if let Some(&dest_path) = dest_keys.get(&key) {
                on_both_sides.push((path, key, dest_path));
            } else {
                result.to_update.push(path.clone());
            }
        }

        let mut seen = HashSet::new();
        for path in dest {
            let key = normalize(path);
            if seen.insert(key.clone()) && !source_keys.contains(&key) {
                result.to_remove.push(path.clone());
            }
        }

        for (path, key, dest_path) in on_both_sides {
            if self.is_stale(&source_root.join(path), dest_root, &key, dest_path)? {
                tracing::debug!("stale: {path}");
                result.to_update.push(path.clone());
            } else {
                result.to_ignore.push(path.clone());
            }
        }

        Ok(result)
    }

    fn is_stale(
        &self,
        source: &Path,
        dest_root: &Path,
        key: &str,
        dest_path: &str,
    ) -> Result<bool, SyncError> {
        match self.rule {
            StalenessRule::PresenceOnly => Ok(false),
            StalenessRule::SourceNewer { epsilon } => {
                let source_mtime = mtime(source)?;
                let dest_mtime = dest_mtime(dest_root, key, dest_path)?;
                Ok(dest_mtime
                    .checked_add(epsilon)
                    .is_some_and(|limit| source_mtime > limit))
            }
        }
    }
}

/// [`Reconciler::reconcile`] with the default rule (source newer by more than 0.01 s).
pub fn reconcile(
    source: &[String],
    dest: &[String],
    source_root: &Path,
    dest_root: &Path,
) -> Result<Reconciliation, SyncError> {
    Reconciler::default().reconcile(source, dest, source_root, dest_root)
}

/// Destination mtime at the canonical spelling, falling back to the spelling
/// the device listing reported (a device that already stores decomposed names).
fn dest_mtime(dest_root: &Path, key: &str, dest_path: &str) -> Result<SystemTime, SyncError> {
    match mtime(&dest_root.join(key)) {
        Err(SyncError::NotFound { .. }) if dest_path != key => mtime(&dest_root.join(dest_path)),
        other => other,
    }
}

fn mtime(path: &Path) -> Result<SystemTime, SyncError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| io_err(path, e))
}
