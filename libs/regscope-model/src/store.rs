//! Ordered datapoint store
//!
//! Order is significant (table row order and persisted order). Operations
//! that invalidate a selection return the recomputed cursor together with the
//! mutation so callers never observe an out-of-range index.

use crate::datapoint::Datapoint;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatapointStore {
    items: Vec<Datapoint>,
}

impl DatapointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Datapoint> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Datapoint> {
        self.items.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Datapoint> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Datapoint> {
        self.items.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Datapoint] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<Datapoint> {
        self.items
    }

    /// Append to the end, returns the new entry's index
    pub fn push(&mut self, dp: Datapoint) -> usize {
        self.items.push(dp);
        self.items.len() - 1
    }

    /// Replace the entry at `index` in place, returns false when out of range
    pub fn replace(&mut self, index: usize, dp: Datapoint) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = dp;
                true
            },
            None => false,
        }
    }

    /// Remove the entry at `index`
    ///
    /// Returns the cursor afterwards: clamped to the last index, or `None`
    /// when the store became empty. An out-of-range index removes nothing.
    pub fn remove(&mut self, index: usize) -> Option<usize> {
        if index < self.items.len() {
            self.items.remove(index);
        }
        match self.items.len() {
            0 => None,
            len => Some(index.min(len - 1)),
        }
    }

    /// Swap the entry with its predecessor, returns the cursor that follows it
    pub fn move_up(&mut self, index: usize) -> usize {
        if index == 0 || index >= self.items.len() {
            return index;
        }
        self.items.swap(index, index - 1);
        index - 1
    }

    /// Swap the entry with its successor, returns the cursor that follows it
    pub fn move_down(&mut self, index: usize) -> usize {
        if index + 1 >= self.items.len() {
            return index;
        }
        self.items.swap(index, index + 1);
        index + 1
    }

    /// Server id for a new entry: the last edited one if any, else the first
    /// entry's, else zero
    pub fn inherited_slave_id(&self, last_edited: Option<u8>) -> u8 {
        last_edited
            .or_else(|| self.items.first().map(|dp| dp.slave_id))
            .unwrap_or(0)
    }
}

impl From<Vec<Datapoint>> for DatapointStore {
    fn from(items: Vec<Datapoint>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a DatapointStore {
    type Item = &'a Datapoint;
    type IntoIter = std::slice::Iter<'a, Datapoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
