//! # walksync-sync
//!
//! Incremental, name + mtime based file synchronization onto a device tree.
//!
//! The pieces, leaves first:
//! - [`normalize`]: composed / decomposed Unicode spellings of relative paths
//! - [`scan`]: extension-filtered recursive listing
//! - [`prefix`]: common-root stripping for absolute library paths
//! - [`reconcile`]: update / remove / ignore partition
//! - [`executor`]: applies a [`SyncPlan`]
//! - [`playlist`]: generated `.m3u` files
//! - [`pipeline`]: wires a [`walksync_core::TrackProvider`] through all of the above

pub mod error;
pub mod executor;
pub mod normalize;
pub mod pipeline;
pub mod playlist;
pub mod prefix;
pub mod reconcile;
pub mod scan;

pub use error::SyncError;
pub use executor::{apply, LogSink, PhaseReport, ProgressSink, SyncEvent, SyncPlan, SyncSummary};
pub use normalize::{denormalize, normalize};
pub use reconcile::{reconcile, Reconciler, Reconciliation, StalenessRule};
pub use scan::{scan, ExtensionFilter};
pub use pipeline::SyncOptions;
pub use playlist::WriteResult;
