//! Entity types served by the remote and held in the query cache.

pub mod id;
pub mod schedule;
pub mod task;

pub use id::EntityId;
pub use schedule::{Phase, Schedule, TimeRange};
pub use task::{AiAnnotation, ParseEnumError, Status, Task};

/// Either kind of cached entity, as carried by undo records.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Task(Task),
    Schedule(Schedule),
}

impl Entity {
    #[must_use]
    pub const fn id(&self) -> &EntityId {
        match self {
            Self::Task(t) => &t.id,
            Self::Schedule(s) => &s.id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Task(t) => &t.title,
            Self::Schedule(s) => &s.title,
        }
    }
}
