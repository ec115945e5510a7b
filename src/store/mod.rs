pub mod ids;
pub mod seed;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::AppError;
use crate::models::dish::Dish;
use crate::models::order::Order;

/// Anything kept in a [`Collection`].
pub trait Record: Clone + Send + Sync {
    /// Singular name used in log lines and error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

impl Record for Dish {
    const KIND: &'static str = "dish";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Insertion-ordered records of one resource type.
#[derive(Debug, Clone)]
pub struct Records<T> {
    items: Vec<T>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> Records<T> {
    /// Builds a record set, refusing duplicate identifiers.
    pub fn from_vec(items: Vec<T>) -> Result<Self, AppError> {
        let mut records = Self { items: Vec::with_capacity(items.len()) };
        for item in items {
            if records.contains(item.id()) {
                return Err(AppError::Internal(format!(
                    "duplicate {} id {}",
                    T::KIND,
                    item.id()
                )));
            }
            records.items.push(item);
        }
        Ok(records)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// A fresh identifier not used by any record in this set.
    pub fn next_id(&self) -> String {
        loop {
            let candidate = ids::generate();
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub fn push(&mut self, item: T) -> &T {
        self.items.push(item);
        let last = self.items.len() - 1;
        &self.items[last]
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

/// A [`Records`] set shared across requests. Mutating requests hold the write
/// guard for their whole validation pipeline.
#[derive(Debug)]
pub struct Collection<T> {
    records: RwLock<Records<T>>,
}

impl<T: Record> Collection<T> {
    pub fn new(records: Records<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Records<T>> {
        self.records.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Records<T>> {
        self.records.write().await
    }

    pub async fn snapshot(&self) -> Vec<T> {
        self.records.read().await.as_slice().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}
