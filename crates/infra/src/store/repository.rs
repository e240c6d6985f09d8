use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use bazaar_core::{DomainResult, Entity, GeneratedId, Page, Resource};

/// CRUD storage for one resource type.
///
/// Listings are in creation order so pagination is stable.
pub trait Repository<E: Resource>: Send + Sync {
    fn create(&self, draft: E::Draft) -> DomainResult<E>;
    fn get(&self, id: &E::Id) -> Option<E>;
    fn list(&self, page: Page) -> Vec<E>;
    /// Like [`Repository::list`], but the window applies after filtering.
    fn list_where(&self, page: Page, filter: &dyn Fn(&E) -> bool) -> Vec<E>;
    /// `Ok(None)` when the id is unknown; validation errors leave the row unchanged.
    fn update(&self, id: &E::Id, patch: E::Patch) -> DomainResult<Option<E>>;
    fn delete(&self, id: &E::Id) -> bool;
}

impl<E, S> Repository<E> for Arc<S>
where
    E: Resource,
    S: Repository<E> + ?Sized,
{
    fn create(&self, draft: E::Draft) -> DomainResult<E> {
        (**self).create(draft)
    }

    fn get(&self, id: &E::Id) -> Option<E> {
        (**self).get(id)
    }

    fn list(&self, page: Page) -> Vec<E> {
        (**self).list(page)
    }

    fn list_where(&self, page: Page, filter: &dyn Fn(&E) -> bool) -> Vec<E> {
        (**self).list_where(page, filter)
    }

    fn update(&self, id: &E::Id, patch: E::Patch) -> DomainResult<Option<E>> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: &E::Id) -> bool {
        (**self).delete(id)
    }
}

struct Rows<E: Resource> {
    next_seq: u64,
    by_seq: BTreeMap<u64, E>,
    seq_of: HashMap<E::Id, u64>,
}

/// In-memory repository for tests/dev.
pub struct InMemoryRepository<E: Resource> {
    inner: RwLock<Rows<E>>,
}

impl<E: Resource> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Rows {
                next_seq: 0,
                by_seq: BTreeMap::new(),
                seq_of: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Resource> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Resource> Repository<E> for InMemoryRepository<E> {
    fn create(&self, draft: E::Draft) -> DomainResult<E> {
        let entity = E::create(E::Id::generate(), draft, Utc::now())?;

        let mut rows = self.inner.write();
        let seq = rows.next_seq;
        rows.next_seq += 1;
        rows.seq_of.insert(entity.id().clone(), seq);
        rows.by_seq.insert(seq, entity.clone());
        Ok(entity)
    }

    fn get(&self, id: &E::Id) -> Option<E> {
        let rows = self.inner.read();
        let seq = rows.seq_of.get(id)?;
        rows.by_seq.get(seq).cloned()
    }

    fn list(&self, page: Page) -> Vec<E> {
        page.slice(self.inner.read().by_seq.values().cloned())
    }

    fn list_where(&self, page: Page, filter: &dyn Fn(&E) -> bool) -> Vec<E> {
        page.slice(
            self.inner
                .read()
                .by_seq
                .values()
                .filter(|e| filter(e))
                .cloned(),
        )
    }

    fn update(&self, id: &E::Id, patch: E::Patch) -> DomainResult<Option<E>> {
        let mut rows = self.inner.write();
        let Some(seq) = rows.seq_of.get(id).copied() else {
            return Ok(None);
        };
        let Some(current) = rows.by_seq.get(&seq) else {
            return Ok(None);
        };

        let mut next = current.clone();
        next.apply(patch, Utc::now())?;
        rows.by_seq.insert(seq, next.clone());
        Ok(Some(next))
    }

    fn delete(&self, id: &E::Id) -> bool {
        let mut rows = self.inner.write();
        match rows.seq_of.remove(id) {
            Some(seq) => rows.by_seq.remove(&seq).is_some(),
            None => false,
        }
    }
}
