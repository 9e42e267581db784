//! Keyed query cache over remote list state.
//!
//! The cache is a derived, client-side view of what the remote last
//! reported. It is not authoritative — the remote is the source of truth —
//! but it is what the dashboard renders from, and it is where optimistic
//! edits land before the remote call settles.
//!
//! # Module layout
//!
//! - [`key`] — [`TaskFilter`] / [`ScheduleFilter`] criteria and [`CacheKey`].
//! - [`entry`] — [`Page`], [`CacheEntry`], and per-entry fetch epochs.
//! - [`store`] — [`QueryCache`] and [`CacheSnapshot`].
//!
//! # Invariant
//!
//! Between a speculative edit and the settling of its remote call, the
//! snapshot taken by [`QueryCache::snapshot_tasks`] (or the schedule
//! counterpart) must be able to restore every touched entry verbatim.
//! [`crate::mutate::Mutator`] owns that discipline.

pub mod entry;
pub mod key;
pub mod store;

pub use entry::{CacheEntry, FetchState, HasEntityId, Page};
pub use key::{CacheKey, ScheduleFilter, TaskFilter};
pub use store::{CacheSnapshot, QueryCache};
