use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockWriteGuard};
use tutorhub_core::models::{Class, Enrollment, Parent, Student, Subscription};
use tutorhub_core::AppResult;
use uuid::Uuid;

/// A stored entity with an identifier and an update timestamp
pub(crate) trait Record: Clone + Send + Sync {
    fn id(&self) -> Uuid;
    fn touch(&mut self, now: DateTime<Utc>);
}

macro_rules! impl_record {
    ($($ty:ty),+) => {
        $(
            impl Record for $ty {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn touch(&mut self, now: DateTime<Utc>) {
                    self.updated_at = now;
                }
            }
        )+
    };
}

impl_record!(Parent, Student, Class, Subscription, Enrollment);

/// Insertion-ordered table of records
pub(crate) struct MemoryTable<T: Record> {
    rows: RwLock<Vec<T>>,
}

impl<T: Record> Default for MemoryTable<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T: Record> MemoryTable<T> {
    pub fn get(&self, id: Uuid) -> Option<T> {
        self.rows.read().iter().find(|r| r.id() == id).cloned()
    }

    pub fn all(&self) -> Vec<T> {
        self.rows.read().clone()
    }

    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.read().iter().filter(|r| pred(r)).cloned().collect()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.read().iter().find(|r| pred(r)).cloned()
    }

    pub fn count_where(&self, pred: impl Fn(&T) -> bool) -> i64 {
        self.rows.read().iter().filter(|r| pred(r)).count() as i64
    }

    pub fn count_all(&self) -> i64 {
        self.rows.read().len() as i64
    }

    pub fn insert(&self, entity: &T) -> T {
        self.rows.write().push(entity.clone());
        entity.clone()
    }

    /// Run `check` against every stored row and insert under the same lock
    pub fn insert_checked(
        &self,
        entity: &T,
        check: impl FnOnce(&[T]) -> AppResult<()>,
    ) -> AppResult<T> {
        let mut rows = self.rows.write();
        check(rows.as_slice())?;
        rows.push(entity.clone());
        Ok(entity.clone())
    }

    /// Replace the stored record with the same id, stamping `updated_at`
    pub fn update(&self, entity: &T) -> Option<T> {
        Self::replace(&mut self.rows.write(), entity)
    }

    pub fn update_checked(
        &self,
        entity: &T,
        check: impl FnOnce(&[T]) -> AppResult<()>,
    ) -> AppResult<Option<T>> {
        let mut rows = self.rows.write();
        check(rows.as_slice())?;
        Ok(Self::replace(&mut rows, entity))
    }

    /// Stamp `updated_at` without changing anything else
    pub fn touch(&self, id: Uuid) -> Option<T> {
        let mut rows = self.rows.write();
        let row = rows.iter_mut().find(|r| r.id() == id)?;
        row.touch(Utc::now());
        Some(row.clone())
    }

    fn replace(rows: &mut Vec<T>, entity: &T) -> Option<T> {
        let slot = rows.iter_mut().find(|r| r.id() == entity.id())?;
        let mut updated = entity.clone();
        updated.touch(Utc::now());
        *slot = updated.clone();
        Some(updated)
    }

    pub fn remove_where(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        let mut rows = self.rows.write();
        let pos = rows.iter().position(|r| pred(r))?;
        Some(rows.remove(pos))
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.remove_where(|r| r.id() == id).is_some()
    }

    /// Exclusive access for check-then-write sequences
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.rows.write()
    }
}
