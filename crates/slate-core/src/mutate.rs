//! Optimistic mutations with rollback.
//!
//! Every mutation follows the same discipline:
//!
//! 1. find the cache partitions holding the target entity,
//! 2. cancel their in-flight refetches and snapshot them,
//! 3. apply the local edit synchronously,
//! 4. issue the remote call,
//! 5. on failure restore every snapshotted partition verbatim and hand the
//!    error back to the caller.
//!
//! An entity that is in no known partition yields [`MutateError::NotFound`]
//! without touching the cache — never a silent no-op.

use crate::cache::QueryCache;
use crate::model::{EntityId, Schedule, Status, Task};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a remote call failed. Nothing here is fatal; the caller rolls back
/// and surfaces a notification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("remote unavailable: {0}")]
    Unavailable(String),
    #[error("remote rejected the request: {0}")]
    Rejected(String),
}

/// Outcome of an optimistic mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutateError {
    /// The entity is in no cached partition; the cache was not touched.
    #[error("'{0}' not found in any cached list")]
    NotFound(EntityId),
    /// The remote call failed; the cache has been rolled back.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// The mutation-execution side of the remote service.
///
/// Calls are synchronous from the cache's point of view; the mutator has
/// already applied the edit locally by the time any of these run.
pub trait RemoteService {
    /// # Errors
    /// Returns [`RemoteError`] when the delete does not reach the server.
    fn delete_task(&self, id: &EntityId) -> Result<(), RemoteError>;

    /// # Errors
    /// Returns [`RemoteError`] when the status change does not reach the server.
    fn set_task_status(&self, id: &EntityId, status: Status) -> Result<(), RemoteError>;

    /// Undelete a previously removed task.
    ///
    /// # Errors
    /// Returns [`RemoteError`] when the restore does not reach the server.
    fn restore_task(&self, task: &Task) -> Result<(), RemoteError>;

    /// # Errors
    /// Returns [`RemoteError`] when the delete does not reach the server.
    fn delete_schedule(&self, id: &EntityId) -> Result<(), RemoteError>;

    /// # Errors
    /// Returns [`RemoteError`] when the restore does not reach the server.
    fn restore_schedule(&self, schedule: &Schedule) -> Result<(), RemoteError>;
}

/// Applies speculative edits to the cache and reconciles them with the
/// remote. Borrowed fresh for each mutation; holds no state of its own.
pub struct Mutator<'a, R: RemoteService> {
    cache: &'a mut QueryCache,
    remote: &'a R,
}

impl<'a, R: RemoteService> Mutator<'a, R> {
    pub fn new(cache: &'a mut QueryCache, remote: &'a R) -> Self {
        Self { cache, remote }
    }

    /// Optimistically delete a task. Returns the removed task on success so
    /// the caller can push an undo record.
    ///
    /// # Errors
    /// [`MutateError::NotFound`] if the id is in no cached partition;
    /// [`MutateError::Remote`] after a rollback when the remote call fails.
    pub fn delete_task(&mut self, id: &EntityId) -> Result<Task, MutateError> {
        let filters = self.cache.task_filters_containing(id);
        if filters.is_empty() {
            return Err(MutateError::NotFound(id.clone()));
        }

        let snapshot = self.cache.snapshot_tasks(&filters);
        let removed = self
            .cache
            .remove_task_everywhere(id)
            .ok_or_else(|| MutateError::NotFound(id.clone()))?;
        debug!(%id, partitions = filters.len(), "optimistic task delete applied");

        match self.remote.delete_task(id) {
            Ok(()) => Ok(removed),
            Err(err) => {
                warn!(%id, %err, "remote delete failed; rolling back");
                self.cache.restore(snapshot);
                Err(err.into())
            }
        }
    }

    /// Optimistically toggle a task's status. Returns the new status.
    ///
    /// # Errors
    /// [`MutateError::NotFound`] if the id is in no cached partition;
    /// [`MutateError::Remote`] after a rollback when the remote call fails.
    pub fn toggle_task(&mut self, id: &EntityId) -> Result<Status, MutateError> {
        let current = self
            .cache
            .find_task(id)
            .ok_or_else(|| MutateError::NotFound(id.clone()))?;
        let next = current.status.toggled();

        // Status partitions on both sides of the move can change, so the
        // snapshot covers the containing partitions plus any the task will
        // surface in after the rewrite.
        let mut filters = self.cache.task_filters_containing(id);
        let mut landing = current.clone();
        landing.status = next;
        for filter in self.cache.task_filters_matching(&landing) {
            if !filters.contains(&filter) {
                filters.push(filter);
            }
        }

        let snapshot = self.cache.snapshot_tasks(&filters);
        self.cache
            .set_task_status(id, next)
            .ok_or_else(|| MutateError::NotFound(id.clone()))?;
        debug!(%id, status = %next, "optimistic status toggle applied");

        match self.remote.set_task_status(id, next) {
            Ok(()) => Ok(next),
            Err(err) => {
                warn!(%id, %err, "remote toggle failed; rolling back");
                self.cache.restore(snapshot);
                Err(err.into())
            }
        }
    }

    /// Undo path: re-insert a deleted task and issue the remote undelete.
    ///
    /// # Errors
    /// [`MutateError::Remote`] after a rollback when the remote call fails.
    pub fn restore_task(&mut self, task: &Task) -> Result<(), MutateError> {
        let filters = self.cache.task_filters_matching(task);
        let snapshot = self.cache.snapshot_tasks(&filters);
        self.cache.insert_task_front(task);
        debug!(id = %task.id, "optimistic task restore applied");

        match self.remote.restore_task(task) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(id = %task.id, %err, "remote restore failed; rolling back");
                self.cache.restore(snapshot);
                Err(err.into())
            }
        }
    }

    /// Optimistically delete a schedule. Returns the removed schedule.
    ///
    /// # Errors
    /// [`MutateError::NotFound`] if the id is in no cached partition;
    /// [`MutateError::Remote`] after a rollback when the remote call fails.
    pub fn delete_schedule(&mut self, id: &EntityId) -> Result<Schedule, MutateError> {
        let filters = self.cache.schedule_filters_containing(id);
        if filters.is_empty() {
            return Err(MutateError::NotFound(id.clone()));
        }

        let snapshot = self.cache.snapshot_schedules(&filters);
        let removed = self
            .cache
            .remove_schedule_everywhere(id)
            .ok_or_else(|| MutateError::NotFound(id.clone()))?;
        debug!(%id, partitions = filters.len(), "optimistic schedule delete applied");

        match self.remote.delete_schedule(id) {
            Ok(()) => Ok(removed),
            Err(err) => {
                warn!(%id, %err, "remote delete failed; rolling back");
                self.cache.restore(snapshot);
                Err(err.into())
            }
        }
    }

    /// Undo path for schedules.
    ///
    /// # Errors
    /// [`MutateError::Remote`] after a rollback when the remote call fails.
    pub fn restore_schedule(
        &mut self,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Result<(), MutateError> {
        let filters = self.cache.schedule_filters_matching(schedule, now);
        let snapshot = self.cache.snapshot_schedules(&filters);
        self.cache.insert_schedule_front(schedule, now);
        debug!(id = %schedule.id, "optimistic schedule restore applied");

        match self.remote.restore_schedule(schedule) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(id = %schedule.id, %err, "remote restore failed; rolling back");
                self.cache.restore(snapshot);
                Err(err.into())
            }
        }
    }
}
