/// Insertion-ordered list with a lazy, stable re-sort.
///
/// Pushes only mark the list dirty; the owner re-sorts once per pass with
/// whatever key is current at that time. Ties keep insertion order.
#[derive(Debug, Clone)]
pub struct OrderedList<T> {
    items: Vec<T>,
    dirty: bool,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            dirty: false,
        }
    }
}

impl<T: PartialEq> OrderedList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the end. Does not check for duplicates.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.dirty = true;
    }

    /// Remove the first occurrence, keeping the order of the rest.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.items.iter().position(|x| x == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Force the next [`resort_by_key`](Self::resort_by_key) to do work,
    /// e.g. after an item's key changed.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Stable sort by `key` if anything changed since the last sort.
    /// Returns whether a sort happened.
    pub fn resort_by_key<K: Ord>(&mut self, key: impl FnMut(&T) -> K) -> bool {
        if !self.dirty {
            return false;
        }
        self.items.sort_by_key(key);
        self.dirty = false;
        true
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}
