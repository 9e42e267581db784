use super::entry::{CacheEntry, Page};
use super::key::{CacheKey, ScheduleFilter, TaskFilter};
use crate::model::{EntityId, Schedule, Status, Task};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, trace};

/// In-memory keyed store of server-derived list state.
///
/// Partitions are addressed by the filter their query was issued with. The
/// same entity typically lives in several partitions at once (the unfiltered
/// list, its status column, its folder), so every edit walks all of them.
///
/// Mutation goes through [`crate::mutate::Mutator`]; the store itself only
/// offers the primitive edits plus snapshot/restore.
#[derive(Debug, Default)]
pub struct QueryCache {
    tasks: HashMap<TaskFilter, CacheEntry<Task>>,
    schedules: HashMap<ScheduleFilter, CacheEntry<Schedule>>,
}

/// Verbatim copy of a set of cache entries, taken before a speculative edit.
///
/// Restoring puts the copied entries back exactly as they were. Entries that
/// appeared after the snapshot was taken are left alone.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    tasks: Vec<(TaskFilter, CacheEntry<Task>)>,
    schedules: Vec<(ScheduleFilter, CacheEntry<Schedule>)>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- population ---------------------------------------------------------

    pub fn insert_tasks(&mut self, filter: TaskFilter, pages: Vec<Page<Task>>, total: u64) {
        trace!(key = %CacheKey::Tasks(filter.clone()), total, "insert task pages");
        self.tasks.insert(filter, CacheEntry::new(pages, total));
    }

    pub fn insert_schedules(
        &mut self,
        filter: ScheduleFilter,
        pages: Vec<Page<Schedule>>,
        total: u64,
    ) {
        trace!(key = %CacheKey::Schedules(filter.clone()), total, "insert schedule pages");
        self.schedules.insert(filter, CacheEntry::new(pages, total));
    }

    #[must_use]
    pub fn task_entry(&self, filter: &TaskFilter) -> Option<&CacheEntry<Task>> {
        self.tasks.get(filter)
    }

    #[must_use]
    pub fn schedule_entry(&self, filter: &ScheduleFilter) -> Option<&CacheEntry<Schedule>> {
        self.schedules.get(filter)
    }

    /// Cached tasks for one partition, page order. Empty if never fetched.
    pub fn tasks(&self, filter: &TaskFilter) -> impl Iterator<Item = &Task> {
        self.tasks.get(filter).into_iter().flat_map(CacheEntry::items)
    }

    pub fn schedules(&self, filter: &ScheduleFilter) -> impl Iterator<Item = &Schedule> {
        self.schedules
            .get(filter)
            .into_iter()
            .flat_map(CacheEntry::items)
    }

    /// Sorted distinct folder names across all cached tasks.
    #[must_use]
    pub fn folders(&self) -> Vec<String> {
        let mut folders: Vec<String> = self
            .tasks
            .values()
            .flat_map(CacheEntry::items)
            .filter_map(|t| t.folder.clone())
            .collect();
        folders.sort_unstable();
        folders.dedup();
        folders
    }

    // -- refetch bookkeeping ------------------------------------------------

    /// Mark a refetch of the partition as started; returns the epoch the
    /// result must be committed with. Creates the entry if absent.
    pub fn begin_task_fetch(&mut self, filter: &TaskFilter) -> u64 {
        self.tasks.entry(filter.clone()).or_default().begin_fetch()
    }

    /// Commit a refetch result. Returns false when the fetch was cancelled
    /// in the meantime (the result is dropped).
    pub fn commit_task_fetch(
        &mut self,
        filter: &TaskFilter,
        epoch: u64,
        pages: Vec<Page<Task>>,
        total: u64,
    ) -> bool {
        let committed = self
            .tasks
            .entry(filter.clone())
            .or_default()
            .commit_fetch(epoch, pages, total);
        if !committed {
            debug!(key = %CacheKey::Tasks(filter.clone()), "dropped stale refetch result");
        }
        committed
    }

    /// Schedule counterpart of [`Self::begin_task_fetch`].
    pub fn begin_schedule_fetch(&mut self, filter: &ScheduleFilter) -> u64 {
        self.schedules
            .entry(filter.clone())
            .or_default()
            .begin_fetch()
    }

    /// Schedule counterpart of [`Self::commit_task_fetch`].
    pub fn commit_schedule_fetch(
        &mut self,
        filter: &ScheduleFilter,
        epoch: u64,
        pages: Vec<Page<Schedule>>,
        total: u64,
    ) -> bool {
        let committed = self
            .schedules
            .entry(filter.clone())
            .or_default()
            .commit_fetch(epoch, pages, total);
        if !committed {
            debug!(key = %CacheKey::Schedules(filter.clone()), "dropped stale refetch result");
        }
        committed
    }

    fn cancel_task_refetches(&mut self, filters: &[TaskFilter]) {
        for filter in filters {
            if let Some(entry) = self.tasks.get_mut(filter) {
                entry.cancel_fetch();
            }
        }
    }

    fn cancel_schedule_refetches(&mut self, filters: &[ScheduleFilter]) {
        for filter in filters {
            if let Some(entry) = self.schedules.get_mut(filter) {
                entry.cancel_fetch();
            }
        }
    }

    // -- lookup -------------------------------------------------------------

    /// Partitions that currently hold the task.
    #[must_use]
    pub fn task_filters_containing(&self, id: &EntityId) -> Vec<TaskFilter> {
        self.tasks
            .iter()
            .filter(|(_, entry)| entry.contains(id))
            .map(|(filter, _)| filter.clone())
            .collect()
    }

    /// Partitions whose filter the task would match, whether or not they
    /// currently hold it. This is exactly the set `insert_task_front`
    /// would touch, so rollback snapshots cover it.
    #[must_use]
    pub fn task_filters_matching(&self, task: &Task) -> Vec<TaskFilter> {
        self.tasks
            .keys()
            .filter(|filter| filter.matches(task))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn schedule_filters_matching(
        &self,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Vec<ScheduleFilter> {
        self.schedules
            .keys()
            .filter(|filter| filter.matches(schedule, now))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn schedule_filters_containing(&self, id: &EntityId) -> Vec<ScheduleFilter> {
        self.schedules
            .iter()
            .filter(|(_, entry)| entry.contains(id))
            .map(|(filter, _)| filter.clone())
            .collect()
    }

    #[must_use]
    pub fn find_task(&self, id: &EntityId) -> Option<&Task> {
        self.tasks.values().find_map(|entry| {
            entry.items().find(|t| &t.id == id)
        })
    }

    #[must_use]
    pub fn find_schedule(&self, id: &EntityId) -> Option<&Schedule> {
        self.schedules.values().find_map(|entry| {
            entry.items().find(|s| &s.id == id)
        })
    }

    // -- snapshot / restore -------------------------------------------------

    /// Copy the named task partitions, cancelling their in-flight refetches
    /// first so a settled fetch cannot overwrite the speculative edit.
    pub fn snapshot_tasks(&mut self, filters: &[TaskFilter]) -> CacheSnapshot {
        self.cancel_task_refetches(filters);
        CacheSnapshot {
            tasks: filters
                .iter()
                .filter_map(|f| self.tasks.get(f).map(|e| (f.clone(), e.clone())))
                .collect(),
            schedules: Vec::new(),
        }
    }

    pub fn snapshot_schedules(&mut self, filters: &[ScheduleFilter]) -> CacheSnapshot {
        self.cancel_schedule_refetches(filters);
        CacheSnapshot {
            tasks: Vec::new(),
            schedules: filters
                .iter()
                .filter_map(|f| self.schedules.get(f).map(|e| (f.clone(), e.clone())))
                .collect(),
        }
    }

    /// Put snapshotted entries back verbatim.
    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        for (filter, entry) in snapshot.tasks {
            debug!(key = %CacheKey::Tasks(filter.clone()), "rollback task partition");
            self.tasks.insert(filter, entry);
        }
        for (filter, entry) in snapshot.schedules {
            debug!(key = %CacheKey::Schedules(filter.clone()), "rollback schedule partition");
            self.schedules.insert(filter, entry);
        }
    }

    // -- speculative edits --------------------------------------------------

    /// Drop the task from every partition holding it; each one's total goes
    /// down by exactly one. Returns the removed task.
    pub fn remove_task_everywhere(&mut self, id: &EntityId) -> Option<Task> {
        let mut removed = None;
        for entry in self.tasks.values_mut() {
            if let Some(task) = entry.remove(id) {
                removed.get_or_insert(task);
            }
        }
        removed
    }

    pub fn remove_schedule_everywhere(&mut self, id: &EntityId) -> Option<Schedule> {
        let mut removed = None;
        for entry in self.schedules.values_mut() {
            if let Some(schedule) = entry.remove(id) {
                removed.get_or_insert(schedule);
            }
        }
        removed
    }

    /// Re-insert a task at the top of every partition whose filter matches
    /// it. Returns the touched filters (for snapshotting before the call).
    pub fn insert_task_front(&mut self, task: &Task) -> Vec<TaskFilter> {
        let mut touched = Vec::new();
        for (filter, entry) in &mut self.tasks {
            if filter.matches(task) && !entry.contains(&task.id) {
                entry.push_front(task.clone());
                touched.push(filter.clone());
            }
        }
        touched
    }

    pub fn insert_schedule_front(
        &mut self,
        schedule: &Schedule,
        now: DateTime<Utc>,
    ) -> Vec<ScheduleFilter> {
        let mut touched = Vec::new();
        for (filter, entry) in &mut self.schedules {
            if filter.matches(schedule, now) && !entry.contains(&schedule.id) {
                entry.push_front(schedule.clone());
                touched.push(filter.clone());
            }
        }
        touched
    }

    /// Rewrite the task's status across all partitions.
    ///
    /// Partitions filtered to the old status drop the task (total -1),
    /// partitions filtered to the new status gain it at the top (total +1),
    /// everything else is edited in place. Returns the updated task.
    pub fn set_task_status(&mut self, id: &EntityId, status: Status) -> Option<Task> {
        let mut updated: Option<Task> = None;
        // Pass 1: in-place edits and drops from no-longer-matching partitions.
        for (filter, entry) in &mut self.tasks {
            let Some(current) = entry.items().find(|t| &t.id == id).cloned() else {
                continue;
            };
            let mut next = current;
            next.status = status;
            if filter.matches(&next) {
                for page in &mut entry.pages {
                    for task in &mut page.items {
                        if &task.id == id {
                            task.status = status;
                        }
                    }
                }
            } else {
                entry.remove(id);
            }
            updated.get_or_insert(next);
        }
        // Pass 2: surface the task in newly-matching partitions.
        if let Some(ref task) = updated {
            self.insert_task_front(task);
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityId, Status, Task};

    fn task(id: &str, status: Status, folder: Option<&str>) -> Task {
        Task {
            id: EntityId::from(id),
            title: id.to_string(),
            assignees: vec![],
            due: None,
            status,
            folder: folder.map(String::from),
            ai: None,
        }
    }

    fn seeded_cache() -> QueryCache {
        let mut cache = QueryCache::new();
        let all = vec![
            task("a", Status::New, Some("work")),
            task("b", Status::Urgent, Some("work")),
            task("c", Status::Completed, None),
        ];
        cache.insert_tasks(TaskFilter::default(), vec![Page::new(all.clone())], 3);
        cache.insert_tasks(
            TaskFilter {
                status: Some(Status::Urgent),
                ..TaskFilter::default()
            },
            vec![Page::new(vec![all[1].clone()])],
            1,
        );
        cache.insert_tasks(
            TaskFilter {
                folder: Some("work".into()),
                ..TaskFilter::default()
            },
            vec![Page::new(vec![all[0].clone(), all[1].clone()])],
            2,
        );
        cache
    }

    #[test]
    fn remove_everywhere_hits_all_partitions() {
        let mut cache = seeded_cache();
        let removed = cache.remove_task_everywhere(&EntityId::from("b")).unwrap();
        assert_eq!(removed.id, EntityId::from("b"));
        assert!(cache.task_filters_containing(&EntityId::from("b")).is_empty());

        let urgent = TaskFilter {
            status: Some(Status::Urgent),
            ..TaskFilter::default()
        };
        assert_eq!(cache.task_entry(&urgent).unwrap().total, 0);
        assert_eq!(cache.task_entry(&TaskFilter::default()).unwrap().total, 2);
    }

    #[test]
    fn snapshot_then_restore_is_verbatim() {
        let mut cache = seeded_cache();
        let filters = cache.task_filters_containing(&EntityId::from("b"));
        let before: Vec<_> = filters
            .iter()
            .map(|f| cache.task_entry(f).unwrap().clone())
            .collect();

        let snapshot = cache.snapshot_tasks(&filters);
        cache.remove_task_everywhere(&EntityId::from("b"));
        cache.restore(snapshot);

        for (filter, expected) in filters.iter().zip(&before) {
            assert_eq!(cache.task_entry(filter).unwrap(), expected);
        }
    }

    #[test]
    fn insert_front_respects_filters() {
        let mut cache = seeded_cache();
        let restored = task("d", Status::Urgent, None);
        let touched = cache.insert_task_front(&restored);

        // Unfiled urgent task: lands in the unfiltered and urgent partitions,
        // not in the work-folder one.
        assert_eq!(touched.len(), 2);
        let work = TaskFilter {
            folder: Some("work".into()),
            ..TaskFilter::default()
        };
        assert!(!cache.task_entry(&work).unwrap().contains(&EntityId::from("d")));
    }

    #[test]
    fn status_rewrite_moves_between_status_partitions() {
        let mut cache = seeded_cache();
        let updated = cache
            .set_task_status(&EntityId::from("b"), Status::Completed)
            .unwrap();
        assert_eq!(updated.status, Status::Completed);

        let urgent = TaskFilter {
            status: Some(Status::Urgent),
            ..TaskFilter::default()
        };
        let entry = cache.task_entry(&urgent).unwrap();
        assert!(!entry.contains(&EntityId::from("b")));
        assert_eq!(entry.total, 0);

        // In-place partitions keep the task with the new status.
        let all_entry = cache.task_entry(&TaskFilter::default()).unwrap();
        let in_all = all_entry.items().find(|t| t.id == EntityId::from("b")).unwrap();
        assert_eq!(in_all.status, Status::Completed);
    }

    #[test]
    fn set_status_on_unknown_id_is_none() {
        let mut cache = seeded_cache();
        assert!(cache.set_task_status(&EntityId::from("zz"), Status::New).is_none());
    }

    #[test]
    fn snapshot_cancels_in_flight_refetch() {
        let mut cache = seeded_cache();
        let filter = TaskFilter::default();
        let epoch = cache.begin_task_fetch(&filter);
        let _snapshot = cache.snapshot_tasks(std::slice::from_ref(&filter));

        // Refetch settled after the snapshot: its result must be dropped.
        let committed = cache.commit_task_fetch(&filter, epoch, vec![], 0);
        assert!(!committed);
        assert_eq!(cache.task_entry(&filter).unwrap().cached_len(), 3);
    }

    #[test]
    fn folders_are_sorted_and_deduped() {
        let mut cache = seeded_cache();
        cache.insert_tasks(
            TaskFilter {
                folder: Some("home".into()),
                ..TaskFilter::default()
            },
            vec![Page::new(vec![task("e", Status::New, Some("home"))])],
            1,
        );
        assert_eq!(cache.folders(), vec!["home".to_string(), "work".to_string()]);
    }
}
