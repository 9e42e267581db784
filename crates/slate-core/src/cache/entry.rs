use crate::model::EntityId;

/// One page of results as returned by a list query.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Refetch bookkeeping for one cache entry.
///
/// The epoch is the cancellation mechanism: starting a fetch records the
/// current epoch, cancelling bumps it, and a result may only be committed if
/// its epoch is still current. There is no task to abort — a stale result is
/// simply dropped on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchState {
    pub in_flight: bool,
    pub epoch: u64,
}

/// A keyed collection of paginated results plus the server-reported total.
///
/// `total` counts matching entities on the server, which can exceed the
/// number of locally cached items when not all pages have been fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub pages: Vec<Page<T>>,
    pub total: u64,
    fetch: FetchState,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            total: 0,
            fetch: FetchState::default(),
        }
    }
}

impl<T> CacheEntry<T> {
    #[must_use]
    pub fn new(pages: Vec<Page<T>>, total: u64) -> Self {
        Self {
            pages,
            total,
            fetch: FetchState::default(),
        }
    }

    /// All cached items in page order.
    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|p| p.items.iter())
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.pages.iter().map(|p| p.items.len()).sum()
    }

    /// Mark a refetch as started and return the epoch to commit with.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch.in_flight = true;
        self.fetch.epoch
    }

    /// Cancel any in-flight refetch by invalidating its epoch.
    pub fn cancel_fetch(&mut self) {
        if self.fetch.in_flight {
            self.fetch.in_flight = false;
        }
        self.fetch.epoch += 1;
    }

    /// Commit a refetch result. Returns false (and leaves the entry alone)
    /// when the fetch was cancelled after it started.
    pub fn commit_fetch(&mut self, epoch: u64, pages: Vec<Page<T>>, total: u64) -> bool {
        if epoch != self.fetch.epoch {
            return false;
        }
        self.fetch.in_flight = false;
        self.pages = pages;
        self.total = total;
        true
    }
}

impl<T: HasEntityId> CacheEntry<T> {
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.items().any(|item| item.entity_id() == id)
    }

    /// Remove the item by id, decrementing the reported total by one.
    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        for page in &mut self.pages {
            if let Some(pos) = page.items.iter().position(|item| item.entity_id() == id) {
                let removed = page.items.remove(pos);
                self.total = self.total.saturating_sub(1);
                return Some(removed);
            }
        }
        None
    }

    /// Re-insert an item at the top of the first page, incrementing the
    /// total. Used by the optimistic undo path.
    pub fn push_front(&mut self, item: T) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        self.pages[0].items.insert(0, item);
        self.total += 1;
    }
}

/// Cached entities expose their id so entries can be edited in place.
pub trait HasEntityId {
    fn entity_id(&self) -> &EntityId;
}

impl HasEntityId for crate::model::Task {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl HasEntityId for crate::model::Schedule {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}
