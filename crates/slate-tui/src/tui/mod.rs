//! Terminal user interface for slate.
//!
//! ## Views
//!
//! - [`board::BoardView`] — kanban columns with optimistic delete/toggle.
//! - [`agenda::AgendaView`] — schedule list split into future and past.
//!
//! Both views share one [`Shared`] state (cache, undo stack, toasts, config)
//! and perform their mutations through [`slate_core::mutate::Mutator`].

pub mod agenda;
pub mod board;
pub mod viewport;

use chrono::{DateTime, Utc};
use slate_core::config::DashConfig;
use slate_core::model::Entity;
use slate_core::mutate::{Mutator, RemoteService};
use slate_core::notify::ToastKind;
use slate_core::{QueryCache, Toasts, UndoStack};

/// What the event loop should do after a view handled a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Quit,
    SwitchView,
    Refresh,
}

/// State shared by every view.
pub struct Shared {
    pub cache: QueryCache,
    pub undo: UndoStack,
    pub toasts: Toasts,
    pub config: DashConfig,
}

impl Shared {
    #[must_use]
    pub fn new(config: DashConfig) -> Self {
        Self {
            cache: QueryCache::new(),
            undo: UndoStack::with_cap(config.undo_cap),
            toasts: Toasts::new(),
            config,
        }
    }
}

/// Restore the most recently deleted entity, rolling back on remote failure.
///
/// The record's toast is dismissed either way. On failure the record is
/// pushed back so the undo can be retried.
pub fn undo_last<R: RemoteService>(shared: &mut Shared, remote: &R, now: DateTime<Utc>) {
    let Some(record) = shared.undo.pop() else {
        shared.toasts.push(ToastKind::Info, "Nothing to undo", now);
        return;
    };
    if let Some(toast) = record.toast {
        shared.toasts.dismiss(toast);
    }

    let result = match &record.entity {
        Entity::Task(task) => Mutator::new(&mut shared.cache, remote).restore_task(task),
        Entity::Schedule(schedule) => {
            Mutator::new(&mut shared.cache, remote).restore_schedule(schedule, now)
        }
    };

    match result {
        Ok(()) => {
            shared.toasts.push(ToastKind::Info, record.label, now);
        }
        Err(err) => {
            shared.undo.record(record.entity, None);
            shared
                .toasts
                .push(ToastKind::Error, format!("Undo failed: {err}"), now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{undo_last, Shared};
    use slate_core::cache::Page;
    use slate_core::config::DashConfig;
    use slate_core::model::{Entity, EntityId, Status, Task};
    use slate_core::mutate::{RemoteError, RemoteService};
    use slate_core::TaskFilter;

    struct OkRemote;

    impl RemoteService for OkRemote {
        fn delete_task(&self, _: &EntityId) -> Result<(), RemoteError> {
            Ok(())
        }
        fn set_task_status(&self, _: &EntityId, _: Status) -> Result<(), RemoteError> {
            Ok(())
        }
        fn restore_task(&self, _: &Task) -> Result<(), RemoteError> {
            Ok(())
        }
        fn delete_schedule(&self, _: &EntityId) -> Result<(), RemoteError> {
            Ok(())
        }
        fn restore_schedule(
            &self,
            _: &slate_core::model::Schedule,
        ) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    struct DownRemote;

    impl RemoteService for DownRemote {
        fn delete_task(&self, _: &EntityId) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("down".into()))
        }
        fn set_task_status(&self, _: &EntityId, _: Status) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("down".into()))
        }
        fn restore_task(&self, _: &Task) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("down".into()))
        }
        fn delete_schedule(&self, _: &EntityId) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("down".into()))
        }
        fn restore_schedule(
            &self,
            _: &slate_core::model::Schedule,
        ) -> Result<(), RemoteError> {
            Err(RemoteError::Unavailable("down".into()))
        }
    }

    fn task(id: &str) -> Task {
        Task {
            id: EntityId::from(id),
            title: id.to_string(),
            assignees: vec![],
            due: None,
            status: Status::New,
            folder: None,
            ai: None,
        }
    }

    fn shared() -> Shared {
        let mut shared = Shared::new(DashConfig::default());
        shared
            .cache
            .insert_tasks(TaskFilter::default(), vec![Page::new(vec![])], 0);
        shared
    }

    #[test]
    fn undo_restores_and_announces() {
        let mut shared = shared();
        shared.undo.record(Entity::Task(task("a")), None);

        undo_last(&mut shared, &OkRemote, chrono::Utc::now());

        assert!(shared.cache.find_task(&EntityId::from("a")).is_some());
        assert!(shared.undo.is_empty());
        assert_eq!(shared.toasts.latest().unwrap().message, "Restored 'a'");
    }

    #[test]
    fn failed_undo_keeps_the_record_for_retry() {
        let mut shared = shared();
        shared.undo.record(Entity::Task(task("a")), None);

        undo_last(&mut shared, &DownRemote, chrono::Utc::now());

        assert!(shared.cache.find_task(&EntityId::from("a")).is_none());
        assert_eq!(shared.undo.len(), 1);
    }

    #[test]
    fn undo_on_empty_stack_is_informational() {
        let mut shared = shared();
        undo_last(&mut shared, &OkRemote, chrono::Utc::now());
        assert_eq!(shared.toasts.latest().unwrap().message, "Nothing to undo");
    }
}
