use std::rc::Rc;

use clock_core::{Alarm, SavedTimer, WorldClock};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::ClockStorage;

/// A stored entity with a numeric id.
pub trait Record: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);
}

macro_rules! impl_record {
    ($($ty:ty),*) => {
        $(impl Record for $ty {
            fn id(&self) -> u64 {
                self.id
            }

            fn set_id(&mut self, id: u64) {
                self.id = id;
            }
        })*
    };
}

impl_record!(Alarm, WorldClock, SavedTimer);

/// Ordered list of records under one storage key. Every mutation writes
/// the whole list through to storage.
pub struct RecordBook<T> {
    key: &'static str,
    storage: Rc<ClockStorage>,
    items: Vec<T>,
}

impl<T: Record> RecordBook<T> {
    pub fn load(storage: Rc<ClockStorage>, key: &'static str) -> Self {
        let items = storage.load(key, Vec::new());
        Self {
            key,
            storage,
            items,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Append `item` under a fresh id and return the id.
    pub fn add(&mut self, mut item: T) -> u64 {
        let id = match self.items.iter().map(Record::id).max() {
            None => 1,
            Some(max) => max.checked_add(1).unwrap_or_else(|| self.lowest_free_id()),
        };
        item.set_id(id);
        self.items.push(item);
        self.persist();
        id
    }

    /// Apply `edit` to the record with `id`. The id itself cannot change.
    pub fn update(&mut self, id: u64, edit: impl FnOnce(&mut T)) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id() == id) else {
            return false;
        };
        edit(item);
        item.set_id(id);
        self.persist();
        true
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() == before {
            return false;
        }
        self.persist();
        true
    }

    fn lowest_free_id(&self) -> u64 {
        (1..=u64::MAX)
            .find(|id| self.get(*id).is_none())
            .unwrap_or(0)
    }

    fn persist(&self) {
        self.storage.save(self.key, &self.items);
    }
}
