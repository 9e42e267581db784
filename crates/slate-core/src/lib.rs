//! slate-core: the state layer behind the slate dashboard.
//!
//! - [`model`] — tasks, schedules, and their enums.
//! - [`cache`] — keyed query cache over remote list state.
//! - [`mutate`] — optimistic mutations with snapshot/rollback.
//! - [`undo`] — bounded LIFO history of reversible deletions.
//! - [`nav`] — column-wise keyboard navigation.
//! - [`notify`] — dismissible toast notifications.
//! - [`bridge`] — host hook for opening entities externally.
//! - [`config`] — `.slate/config.toml` loading.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern; `anyhow::Result` only at the
//!   config/file boundary.
//! - **Logging**: `tracing` macros (`debug!`, `warn!`, `trace!`).

pub mod bridge;
pub mod cache;
pub mod config;
pub mod model;
pub mod mutate;
pub mod nav;
pub mod notify;
pub mod undo;

pub use cache::{CacheSnapshot, Page, QueryCache, ScheduleFilter, TaskFilter};
pub use model::{Entity, EntityId, Phase, Schedule, Status, Task, TimeRange};
pub use mutate::{MutateError, Mutator, RemoteError, RemoteService};
pub use nav::{BoardLayout, Direction};
pub use notify::{Toast, ToastId, ToastKind, Toasts};
pub use undo::{UndoRecord, UndoStack, DEFAULT_UNDO_CAP};
