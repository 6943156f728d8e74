//! Ordered, deduplicated finite universes with dense index assignment.
//!
//! Every finite set in a system (states, actions, propositions, parameters,
//! outputs, alphabet symbols) is an [`IndexedSet`]: elements keep their
//! insertion order and are assigned indices `0..n-1` by position. Lookup of
//! an element's index is O(1) through a reverse hash map kept in sync with
//! the ordered backing vector.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Default)]
pub struct IndexedSet<T> {
    items: Vec<T>,
    index: HashMap<T, usize>,
}

impl<T> IndexedSet<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builds a universe from an iterator, keeping the first occurrence of
    /// each element and dropping later duplicates.
    pub fn from_iter(iter: impl IntoIterator<Item = T>) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }

    /// Inserts an element, returning its index. Re-inserting an existing
    /// element returns the index it was originally assigned.
    pub fn insert(&mut self, item: T) -> usize {
        if let Some(&i) = self.index.get(&item) {
            return i;
        }
        let i = self.items.len();
        self.index.insert(item.clone(), i);
        self.items.push(item);
        i
    }

    /// Returns the index of an element, if present.
    pub fn index_of<Q>(&self, item: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(item).copied()
    }

    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(item)
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.items.get(i)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
