//! Property tests for the undo stack bound and the snapshot/rollback
//! invariant.

use proptest::prelude::*;
use slate_core::cache::Page;
use slate_core::model::{Entity, EntityId, Status, Task};
use slate_core::mutate::{Mutator, RemoteError, RemoteService};
use slate_core::{QueryCache, TaskFilter, UndoStack};

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::New),
        Just(Status::InProgress),
        Just(Status::Urgent),
        Just(Status::Completed),
    ]
}

/// Tasks with generated statuses and folders; ids are positional.
fn arb_tasks(max: usize) -> impl Strategy<Value = Vec<Task>> {
    prop::collection::vec((arb_status(), prop::option::of("[a-z]{1,8}")), 1..max).prop_map(
        |fields| {
            fields
                .into_iter()
                .enumerate()
                .map(|(i, (status, folder))| Task {
                    id: EntityId::new(format!("tsk-{i}")),
                    title: format!("Task {i}"),
                    assignees: vec![],
                    due: None,
                    status,
                    folder,
                    ai: None,
                })
                .collect()
        },
    )
}

/// Remote that always fails: every mutation must roll back.
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

fn cache_over(tasks: &[Task]) -> QueryCache {
    let mut cache = QueryCache::new();
    cache.insert_tasks(
        TaskFilter::default(),
        vec![Page::new(tasks.to_vec())],
        tasks.len() as u64,
    );
    for status in Status::ALL {
        let matching: Vec<_> = tasks.iter().filter(|t| t.status == status).cloned().collect();
        let total = matching.len() as u64;
        cache.insert_tasks(
            TaskFilter {
                status: Some(status),
                ..TaskFilter::default()
            },
            vec![Page::new(matching)],
            total,
        );
    }
    cache
}

fn entity(i: usize) -> Entity {
    Entity::Task(Task {
        id: EntityId::new(format!("tsk-{i}")),
        title: format!("Task {i}"),
        assignees: vec![],
        due: None,
        status: Status::New,
        folder: None,
        ai: None,
    })
}

proptest! {
    #[test]
    fn undo_stack_never_exceeds_its_bound(cap in 1usize..40, pushes in 0usize..120) {
        let mut stack = UndoStack::with_cap(cap);
        for i in 0..pushes {
            stack.record(entity(i), None);
            prop_assert!(stack.len() <= cap);
        }
        prop_assert_eq!(stack.len(), pushes.min(cap));
    }

    #[test]
    fn undo_pop_order_is_reverse_of_push_order(pushes in 1usize..60) {
        let mut stack = UndoStack::with_cap(200);
        for i in 0..pushes {
            stack.record(entity(i), None);
        }
        for i in (0..pushes).rev() {
            let record = stack.pop().expect("record");
            prop_assert_eq!(record.entity.id(), &EntityId::new(format!("tsk-{i}")));
        }
        prop_assert!(stack.is_empty());
    }

    #[test]
    fn failed_delete_always_restores_every_partition(tasks in arb_tasks(12), pick in 0usize..12) {
        let victim = tasks[pick % tasks.len()].id.clone();
        let mut cache = cache_over(&tasks);

        let all = TaskFilter::default();
        let before_all = cache.task_entry(&all).expect("entry").clone();
        let before_status: Vec<_> = Status::ALL
            .iter()
            .map(|&s| {
                let f = TaskFilter { status: Some(s), ..TaskFilter::default() };
                (f.clone(), cache.task_entry(&f).expect("entry").clone())
            })
            .collect();

        let result = Mutator::new(&mut cache, &DownRemote).delete_task(&victim);
        prop_assert!(result.is_err());

        prop_assert_eq!(cache.task_entry(&all).expect("entry"), &before_all);
        for (filter, expected) in &before_status {
            prop_assert_eq!(cache.task_entry(filter).expect("entry"), expected);
        }
    }

    #[test]
    fn failed_toggle_always_restores_every_partition(tasks in arb_tasks(12), pick in 0usize..12) {
        let victim = tasks[pick % tasks.len()].id.clone();
        let mut cache = cache_over(&tasks);

        let before: Vec<_> = std::iter::once(TaskFilter::default())
            .chain(Status::ALL.iter().map(|&s| TaskFilter { status: Some(s), ..TaskFilter::default() }))
            .map(|f| (f.clone(), cache.task_entry(&f).expect("entry").clone()))
            .collect();

        let result = Mutator::new(&mut cache, &DownRemote).toggle_task(&victim);
        prop_assert!(result.is_err());

        for (filter, expected) in &before {
            prop_assert_eq!(cache.task_entry(filter).expect("entry"), expected);
        }
    }
}
