//! Mock remote service backing the dashboard binary.
//!
//! Holds the authoritative task/schedule lists in memory and injects
//! failures: a seeded flake rate for demos plus a `fail_next` switch used by
//! tests. Successful calls mutate the store, so refetches observe the same
//! state a real backend would report.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slate_core::cache::{Page, ScheduleFilter};
use slate_core::model::{AiAnnotation, EntityId, Schedule, Status, Task, TimeRange};
use slate_core::mutate::{RemoteError, RemoteService};
use slate_core::TaskFilter;
use std::cell::{Cell, RefCell};
use tracing::debug;

pub struct MockRemote {
    tasks: RefCell<Vec<Task>>,
    schedules: RefCell<Vec<Schedule>>,
    rng: RefCell<StdRng>,
    flake_rate: f64,
    fail_next: Cell<bool>,
}

impl MockRemote {
    #[must_use]
    pub fn new(seed: u64, flake_rate: f64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let tasks = seed_tasks(&mut rng);
        let schedules = seed_schedules(&mut rng, Utc::now());
        Self {
            tasks: RefCell::new(tasks),
            schedules: RefCell::new(schedules),
            rng: RefCell::new(rng),
            // gen_bool panics on NaN, so non-finite rates degrade to never-fail.
            flake_rate: if flake_rate.is_finite() {
                flake_rate.clamp(0.0, 1.0)
            } else {
                0.0
            },
            fail_next: Cell::new(false),
        }
    }

    /// Force the next call to fail with a rejection (test hook).
    pub fn fail_next(&self) {
        self.fail_next.set(true);
    }

    fn gate(&self, call: &str) -> Result<(), RemoteError> {
        if self.fail_next.take() {
            debug!(call, "mock remote: forced failure");
            return Err(RemoteError::Rejected("forced failure".into()));
        }
        if self.rng.borrow_mut().gen_bool(self.flake_rate) {
            debug!(call, "mock remote: flaked");
            return Err(RemoteError::Unavailable("mock backend flaked".into()));
        }
        Ok(())
    }

    /// Serve a task list query, chunked into pages.
    #[must_use]
    pub fn fetch_tasks(&self, filter: &TaskFilter, page_size: usize) -> (Vec<Page<Task>>, u64) {
        let matching: Vec<Task> = self
            .tasks
            .borrow()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let pages = matching
            .chunks(page_size.max(1))
            .map(|chunk| Page::new(chunk.to_vec()))
            .collect();
        (pages, total)
    }

    #[must_use]
    pub fn fetch_schedules(
        &self,
        filter: &ScheduleFilter,
        page_size: usize,
        now: DateTime<Utc>,
    ) -> (Vec<Page<Schedule>>, u64) {
        let matching: Vec<Schedule> = self
            .schedules
            .borrow()
            .iter()
            .filter(|s| filter.matches(s, now))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let pages = matching
            .chunks(page_size.max(1))
            .map(|chunk| Page::new(chunk.to_vec()))
            .collect();
        (pages, total)
    }
}

impl RemoteService for MockRemote {
    fn delete_task(&self, id: &EntityId) -> Result<(), RemoteError> {
        self.gate("delete_task")?;
        self.tasks.borrow_mut().retain(|t| &t.id != id);
        Ok(())
    }

    fn set_task_status(&self, id: &EntityId, status: Status) -> Result<(), RemoteError> {
        self.gate("set_task_status")?;
        for task in self.tasks.borrow_mut().iter_mut() {
            if &task.id == id {
                task.status = status;
            }
        }
        Ok(())
    }

    fn restore_task(&self, task: &Task) -> Result<(), RemoteError> {
        self.gate("restore_task")?;
        let mut tasks = self.tasks.borrow_mut();
        if !tasks.iter().any(|t| t.id == task.id) {
            tasks.insert(0, task.clone());
        }
        Ok(())
    }

    fn delete_schedule(&self, id: &EntityId) -> Result<(), RemoteError> {
        self.gate("delete_schedule")?;
        self.schedules.borrow_mut().retain(|s| &s.id != id);
        Ok(())
    }

    fn restore_schedule(&self, schedule: &Schedule) -> Result<(), RemoteError> {
        self.gate("restore_schedule")?;
        let mut schedules = self.schedules.borrow_mut();
        if !schedules.iter().any(|s| s.id == schedule.id) {
            schedules.insert(0, schedule.clone());
        }
        Ok(())
    }
}

const TITLES: [&str; 10] = [
    "Write weekly report",
    "Review merge request",
    "Update onboarding doc",
    "Fix flaky pipeline",
    "Plan sprint demo",
    "Clean up backlog",
    "Prepare quarterly review",
    "Answer support tickets",
    "Refresh dependency pins",
    "Draft release notes",
];

const FOLDERS: [&str; 3] = ["work", "home", "errands"];
const PEOPLE: [&str; 4] = ["ann", "bo", "cyn", "dev"];

fn seed_tasks(rng: &mut StdRng) -> Vec<Task> {
    (0..24)
        .map(|i| {
            let status = match rng.gen_range(0..10) {
                0..=3 => Status::New,
                4..=6 => Status::InProgress,
                7 => Status::Urgent,
                _ => Status::Completed,
            };
            Task {
                id: EntityId::new(format!("tsk-{i:03}")),
                title: TITLES[rng.gen_range(0..TITLES.len())].to_string(),
                assignees: vec![PEOPLE[rng.gen_range(0..PEOPLE.len())].to_string()],
                due: None,
                status,
                folder: if rng.gen_bool(0.7) {
                    Some(FOLDERS[rng.gen_range(0..FOLDERS.len())].to_string())
                } else {
                    None
                },
                ai: if rng.gen_bool(0.25) {
                    Some(AiAnnotation {
                        summary: "Looks routine".into(),
                        confidence: rng.gen_range(0.5..1.0),
                    })
                } else {
                    None
                },
            }
        })
        .collect()
}

fn seed_schedules(rng: &mut StdRng, now: DateTime<Utc>) -> Vec<Schedule> {
    (0..8)
        .map(|i| {
            // Half in the past week, half in the next.
            let offset_h = rng.gen_range(1..7 * 24);
            let start = if i % 2 == 0 {
                now - Duration::hours(offset_h)
            } else {
                now + Duration::hours(offset_h)
            };
            Schedule {
                id: EntityId::new(format!("sch-{i:03}")),
                title: format!("Meeting {i}"),
                time: TimeRange {
                    start,
                    end: start + Duration::hours(1),
                },
                attendees: vec![PEOPLE[rng.gen_range(0..PEOPLE.len())].to_string()],
                location: if rng.gen_bool(0.5) {
                    Some(format!("room {}", rng.gen_range(1..9)))
                } else {
                    None
                },
                ai: None,
            }
        })
        .collect()
}
