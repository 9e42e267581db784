//! Bounded undo history for deletions.
//!
//! One record per deleted entity, most recent first. Restoring pops the
//! front record, re-inserts the entity optimistically, and issues the remote
//! undelete with the same rollback discipline as any other mutation (that
//! part lives in [`crate::mutate::Mutator`]; this module is only the
//! history).

use crate::model::Entity;
use crate::notify::ToastId;
use std::collections::VecDeque;

/// Records kept before the oldest is dropped.
pub const DEFAULT_UNDO_CAP: usize = 150;

/// Snapshot of a deleted entity plus its display metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoRecord {
    pub entity: Entity,
    /// Label shown when the restore happens ("Restored 'Write report'").
    pub label: String,
    /// Toast announcing the delete; dismissed when this record is popped.
    pub toast: Option<ToastId>,
}

/// Bounded LIFO history of reversible deletions.
#[derive(Debug)]
pub struct UndoStack {
    records: VecDeque<UndoRecord>,
    cap: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_cap(DEFAULT_UNDO_CAP)
    }
}

impl UndoStack {
    #[must_use]
    pub fn with_cap(cap: usize) -> Self {
        Self {
            records: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    /// Push to the front; past the bound the oldest record is dropped.
    pub fn record(&mut self, entity: Entity, toast: Option<ToastId>) {
        let label = format!("Restored '{}'", entity.title());
        self.records.push_front(UndoRecord {
            entity,
            label,
            toast,
        });
        while self.records.len() > self.cap {
            self.records.pop_back();
        }
    }

    /// Most recent record, LIFO.
    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.records.pop_front()
    }

    /// Gates whether the undo key binding is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{UndoStack, DEFAULT_UNDO_CAP};
    use crate::model::{Entity, EntityId, Status, Task};

    fn entity(id: &str) -> Entity {
        Entity::Task(Task {
            id: EntityId::from(id),
            title: format!("task {id}"),
            assignees: vec![],
            due: None,
            status: Status::New,
            folder: None,
            ai: None,
        })
    }

    #[test]
    fn pop_is_most_recent_first() {
        let mut stack = UndoStack::default();
        stack.record(entity("a"), None);
        stack.record(entity("b"), None);
        assert_eq!(stack.pop().unwrap().entity.id(), &EntityId::from("b"));
        assert_eq!(stack.pop().unwrap().entity.id(), &EntityId::from("a"));
        assert!(stack.pop().is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn overflow_drops_the_oldest_record() {
        let mut stack = UndoStack::with_cap(3);
        for id in ["a", "b", "c", "d"] {
            stack.record(entity(id), None);
        }
        assert_eq!(stack.len(), 3);
        // "a" was dropped; the remaining pops are d, c, b.
        assert_eq!(stack.pop().unwrap().entity.id(), &EntityId::from("d"));
        assert_eq!(stack.pop().unwrap().entity.id(), &EntityId::from("c"));
        assert_eq!(stack.pop().unwrap().entity.id(), &EntityId::from("b"));
    }

    #[test]
    fn record_label_names_the_entity() {
        let mut stack = UndoStack::default();
        stack.record(entity("x"), None);
        assert_eq!(stack.pop().unwrap().label, "Restored 'task x'");
    }

    #[test]
    fn default_cap_is_bounded() {
        let mut stack = UndoStack::default();
        for i in 0..(DEFAULT_UNDO_CAP + 10) {
            stack.record(entity(&i.to_string()), None);
        }
        assert_eq!(stack.len(), DEFAULT_UNDO_CAP);
    }
}
