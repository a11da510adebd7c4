use std::{cmp::Ordering, collections::BinaryHeap};

use crate::tasks::{error::QueueError, record::TaskRecord};

/// Heap entry ordered so that `BinaryHeap` (a max-heap) yields the lowest
/// priority rank first, and among equal ranks the lowest id.
#[derive(Debug, Clone)]
struct Entry(TaskRecord);

impl Entry {
    fn key(&self) -> (u8, u32) {
        (self.0.priority.rank(), self.0.id)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Pending tasks of one queue, ordered by priority rank.
///
/// The scheduler also owns the queue's id counter: [`push`](Self::push)
/// stamps every accepted record with the next id. Ids are never reused, not
/// even after [`remove`](Self::remove) or [`clear`](Self::clear), and because
/// they grow in acceptance order they double as a FIFO tie-break between
/// records of equal priority.
#[derive(Debug)]
pub struct PriorityScheduler {
    heap: BinaryHeap<Entry>,
    next_id: Option<u32>,
}

impl Default for PriorityScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityScheduler {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: Some(0),
        }
    }

    #[cfg(test)]
    pub(crate) fn starting_at(next_id: u32) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: Some(next_id),
        }
    }

    /// Accepts a record, assigning its id, and returns that id.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Internal`] once the `u32` id space is used up.
    pub fn push(&mut self, mut record: TaskRecord) -> Result<u32, QueueError> {
        let Some(id) = self.next_id else {
            return Err(QueueError::Internal(
                "Task id space is exhausted for this queue".to_string(),
            ));
        };
        record.accept(id);
        self.heap.push(Entry(record));
        self.next_id = id.checked_add(1);
        Ok(id)
    }

    /// Removes and returns the most urgent record.
    pub fn pop(&mut self) -> Option<TaskRecord> {
        self.heap.pop().map(|entry| entry.0)
    }

    /// Removes the record with `id`, returning it if it was pending.
    pub fn remove(&mut self, id: u32) -> Option<TaskRecord> {
        let mut removed = None;
        self.heap.retain(|entry| {
            if removed.is_none() && entry.0.id == id {
                removed = Some(entry.0.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn get(&self, id: u32) -> Option<&TaskRecord> {
        self.heap.iter().map(|entry| &entry.0).find(|r| r.id == id)
    }

    /// Pending ids in the order they would be dequeued.
    pub fn ids(&self) -> Vec<u32> {
        let mut keys: Vec<(u8, u32)> = self.heap.iter().map(Entry::key).collect();
        keys.sort_unstable();
        keys.into_iter().map(|(_, id)| id).collect()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
